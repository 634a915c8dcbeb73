//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::BaseUrl;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Waitlist backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Backend origin. No default: a missing value is a configuration error.
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Normalize the configured base URL
    pub fn resolve_base_url(&self) -> Result<BaseUrl, ConfigError> {
        match self.base_url.as_deref() {
            Some(raw) => BaseUrl::parse(raw),
            None => Err(ConfigError::MissingBaseUrl),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Admin session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Directory holding the persisted session token
    #[serde(default = "default_session_dir")]
    pub dir: String,

    /// How often the admin dashboard refreshes the signup list
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_session_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("waitlist").to_string_lossy().to_string())
        .unwrap_or_else(|| "./.waitlist".to_string())
}

fn default_poll_interval() -> u64 {
    10
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dir: default_session_dir(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl SessionConfig {
    /// Session directory with a leading `~` expanded
    pub fn dir_path(&self) -> PathBuf {
        expand_home(&self.dir)
    }

    /// Poll interval, never shorter than one second
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment.
    ///
    /// The first default file that exists is used; a file that exists but
    /// cannot be read or parsed is an error rather than being skipped.
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("waitlist").join("config.toml")),
            Some(PathBuf::from("./waitlist.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&config_paths)
    }

    fn load_first(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        match paths.iter().find(|path| path.exists()) {
            Some(path) => {
                let config = Self::load_with_env(path)?;
                tracing::info!("Loaded config from {:?}", path);
                Ok(config)
            }
            None => {
                tracing::info!("Using default config with environment overrides");
                Ok(Self::from_env())
            }
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // API overrides
        if let Ok(url) = std::env::var("WAITLIST_API_URL") {
            self.api.base_url = Some(url);
        }
        if let Ok(timeout) = std::env::var("WAITLIST_REQUEST_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.api.request_timeout_secs = t;
            }
        }

        // Session overrides
        if let Ok(dir) = std::env::var("WAITLIST_SESSION_DIR") {
            self.session.dir = dir;
        }
        if let Ok(interval) = std::env::var("WAITLIST_POLL_INTERVAL_SECS") {
            if let Ok(i) = interval.parse() {
                self.session.poll_interval_secs = i;
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("WAITLIST_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("WAITLIST_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("No waitlist API base URL configured (set [api] base_url or WAITLIST_API_URL)")]
    MissingBaseUrl,

    #[error("Invalid waitlist API base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Waitlist Configuration
#
# Environment variables override these settings:
# - WAITLIST_API_URL
# - WAITLIST_REQUEST_TIMEOUT_SECS
# - WAITLIST_SESSION_DIR
# - WAITLIST_POLL_INTERVAL_SECS
# - WAITLIST_LOG_LEVEL
# - WAITLIST_LOG_FORMAT

[api]
# Waitlist backend origin (required). A trailing "/api" is stripped.
base_url = "http://localhost:8000"

# Request timeout in seconds
request_timeout_secs = 30

[session]
# Directory holding the admin session token
dir = "~/.local/share/waitlist"

# How often the admin dashboard refreshes signups (seconds)
poll_interval_secs = 10

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
