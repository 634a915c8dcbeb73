//! Public Landing Page
//!
//! Owns the waitlist signup form:
//!
//! ```text
//! Idle --submit--> Loading --ok--> Submitted --close--> Idle
//!                     |
//!                     +--error--> Idle (error surfaced)
//! ```
//!
//! Malformed emails are rejected locally and never reach the network.

mod email;

pub use email::{validate_email, MAX_EMAIL_LEN};

use std::sync::Arc;

use crate::api::{ApiError, ApiResult, SignupReceipt, WaitlistApi};
use crate::notice::{Notice, Notices};

const FORM_NOT_IDLE: &str = "Form already submitted";

const DEFAULT_SUCCESS: &str = "Successfully joined the waitlist! Check your email for confirmation.";

/// Form state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingState {
    Idle,
    Loading,
    Submitted,
}

/// Holds the form in `Loading` while a request is pending and puts it back to
/// `Idle` when dropped, including when the pending future is cancelled.
struct LoadingGuard<'a> {
    state: &'a mut LandingState,
}

impl<'a> LoadingGuard<'a> {
    fn enter(state: &'a mut LandingState) -> Self {
        *state = LandingState::Loading;
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.state = LandingState::Idle;
    }
}

/// Landing page signup form
pub struct LandingPage {
    api: Arc<dyn WaitlistApi>,
    state: LandingState,
    email: String,
    error: Option<String>,
    receipt: Option<SignupReceipt>,
    count: Option<u64>,
    notices: Notices,
}

impl LandingPage {
    pub fn new(api: Arc<dyn WaitlistApi>) -> Self {
        Self {
            api,
            state: LandingState::Idle,
            email: String::new(),
            error: None,
            receipt: None,
            count: None,
            notices: Notices::default(),
        }
    }

    pub fn state(&self) -> LandingState {
        self.state
    }

    /// Email as last entered (empty after closing the confirmation)
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Error shown under the form, if the last submit failed
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Backend payload of the successful signup while `Submitted`
    pub fn receipt(&self) -> Option<&SignupReceipt> {
        self.receipt.as_ref()
    }

    /// Public signup count, once loaded
    pub fn count(&self) -> Option<u64> {
        self.count
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    /// Submit the form.
    ///
    /// Issues exactly one signup request for a well-formed email and reaches
    /// `Submitted` only when the backend accepts it. A submit outside `Idle`
    /// is rejected without a request. Dropping the returned future before it
    /// resolves leaves the form `Idle`.
    pub async fn submit(&mut self, email: &str) -> ApiResult<()> {
        if self.state != LandingState::Idle {
            tracing::debug!(state = ?self.state, "Rejecting submit outside idle state");
            return Err(ApiError::Validation(FORM_NOT_IDLE.to_string()));
        }

        let email = email.trim();
        self.email = email.to_string();
        self.error = None;

        if let Err(e) = validate_email(email) {
            let message = e.user_message();
            self.error = Some(message.clone());
            self.notices.push(Notice::error(message));
            return Err(e);
        }

        let api = self.api.clone();
        let result = {
            let _loading = LoadingGuard::enter(&mut self.state);
            api.signup(email).await
        };

        match result {
            Ok(receipt) => {
                tracing::info!(signup_id = receipt.id, "Joined waitlist");
                let message = receipt
                    .message
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SUCCESS.to_string());
                self.notices.push(Notice::success(message));
                if let Some(count) = self.count.as_mut() {
                    *count += 1;
                }
                self.receipt = Some(receipt);
                self.state = LandingState::Submitted;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Waitlist signup failed");
                let message = e.user_message();
                self.error = Some(message.clone());
                self.notices.push(Notice::error(message));
                self.state = LandingState::Idle;
                Err(e)
            }
        }
    }

    /// Close the confirmation and return to an empty form.
    ///
    /// Returns `false` when not in `Submitted`.
    pub fn close(&mut self) -> bool {
        if self.state != LandingState::Submitted {
            return false;
        }

        self.state = LandingState::Idle;
        self.email.clear();
        self.receipt = None;
        self.error = None;
        true
    }

    /// Load the public signup count
    pub async fn refresh_count(&mut self) -> ApiResult<u64> {
        match self.api.count().await {
            Ok(count) => {
                self.count = Some(count);
                Ok(count)
            }
            Err(e) => {
                self.notices
                    .push(Notice::error(format!("Failed to load waitlist count: {}", e.user_message())));
                Err(e)
            }
        }
    }
}
