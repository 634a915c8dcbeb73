//! Waitlist API Module
//!
//! Single choke point for all backend calls. Callers never build URLs or
//! headers themselves.
//!
//! ## Endpoints
//!
//! | Method | Path | Auth |
//! |--------|------|------|
//! | POST | `/api/waitlist/signup` | none |
//! | GET | `/api/waitlist/count` | none |
//! | POST | `/api/auth/login` | none |
//! | GET | `/api/waitlist/list` | bearer |
//! | DELETE | `/api/waitlist/delete/{id}` | bearer |

mod client;
mod error;
mod types;
mod url;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{ApiClient, ClientBuildError, DEFAULT_TIMEOUT};
pub use error::{ApiError, ApiResult};
pub use types::{
    DeleteConfirmation, LoginResponse, SessionToken, Signup, SignupReceipt, WaitlistCount,
};
pub use url::{BaseUrl, API_SEGMENT};

use async_trait::async_trait;

/// Operations offered by the waitlist backend.
///
/// [`ApiClient`] is the HTTP implementation; the landing page and admin
/// dashboard only depend on this trait.
#[async_trait]
pub trait WaitlistApi: Send + Sync {
    /// Register an email on the waitlist
    async fn signup(&self, email: &str) -> ApiResult<SignupReceipt>;

    /// Number of signups so far
    async fn count(&self) -> ApiResult<u64>;

    /// Exchange the admin password for a session token
    async fn login(&self, password: &str) -> ApiResult<LoginResponse>;

    /// All signups, in backend order
    async fn list_signups(&self, token: &SessionToken) -> ApiResult<Vec<Signup>>;

    /// Delete a signup by id
    async fn delete_signup(&self, id: i64, token: &SessionToken) -> ApiResult<DeleteConfirmation>;
}
