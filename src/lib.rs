//! # Waitlist
//!
//! Client side of a coming-soon landing page: the public waitlist signup form
//! and a password-gated admin dashboard, both driven over the waitlist REST
//! API.
//!
//! ## Modules
//!
//! - [`api`]: HTTP client and the [`WaitlistApi`] seam
//! - [`landing`]: Public signup form state machine
//! - [`admin`]: Admin session, live signup list, stats and deletion
//! - [`session`]: Persistence of the admin session token
//! - [`notice`]: User-facing success and error notices
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use waitlist::{AdminDashboard, ApiClient, BaseUrl, DashboardConfig, MemoryTokenStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let base_url: BaseUrl = "https://waitlist.example.com/api".parse()?;
//!     let api = Arc::new(ApiClient::new(base_url, waitlist::api::DEFAULT_TIMEOUT)?);
//!
//!     let dashboard = AdminDashboard::new(
//!         api,
//!         Arc::new(MemoryTokenStore::new()),
//!         DashboardConfig::default(),
//!     );
//!     dashboard.login("admin-password").await?;
//!
//!     let stats = dashboard.stats().await;
//!     println!("{} signups, {} today", stats.total, stats.today);
//!
//!     dashboard.logout().await;
//!     Ok(())
//! }
//! ```

pub mod admin;
pub mod api;
pub mod config;
pub mod landing;
pub mod logging;
pub mod notice;
pub mod session;

// Re-export top-level types for convenience
pub use admin::{AdminDashboard, DashboardConfig, DashboardSnapshot, SessionState, SignupStats};

pub use api::{
    ApiClient, ApiError, ApiResult, BaseUrl, DeleteConfirmation, LoginResponse, SessionToken,
    Signup, SignupReceipt, WaitlistApi,
};

pub use config::{Config, ConfigError};

pub use landing::{validate_email, LandingPage, LandingState};

pub use notice::{Notice, NoticeLevel, Notices};

pub use session::{FileTokenStore, MemoryTokenStore, StoreError, TokenStore};
