//! Base URL normalization

use crate::config::ConfigError;
use reqwest::Url;
use std::fmt;
use std::str::FromStr;

/// Path segment every endpoint starts with. A configured base URL that
/// already ends in it would otherwise produce `/api/api/...`.
pub const API_SEGMENT: &str = "api";

/// Canonical backend origin.
///
/// Never ends with `/` and never ends with the `api` path segment, so
/// endpoint paths can be appended verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Parse and normalize a configured base URL
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }

        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: trimmed.to_string(),
            reason,
        };

        let mut url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }

        let suffix = format!("/{}", API_SEGMENT);
        let mut path = url.path().trim_end_matches('/').to_string();
        while let Some(stripped) = path.strip_suffix(suffix.as_str()) {
            path = stripped.trim_end_matches('/').to_string();
        }

        url.set_path(&path);
        url.set_query(None);
        url.set_fragment(None);

        Ok(Self(url.as_str().trim_end_matches('/').to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Absolute URL for an endpoint path (must start with `/`)
    pub fn join(&self, path: &str) -> String {
        debug_assert!(path.starts_with('/'));
        format!("{}{}", self.0, path)
    }
}

impl FromStr for BaseUrl {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
