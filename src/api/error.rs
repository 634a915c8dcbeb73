//! API Error Types
//!
//! Classifies every failure of a backend call: client-side validation,
//! HTTP status families and transport problems.

use reqwest::StatusCode;
use thiserror::Error;

/// Which kind of endpoint produced a non-2xx response.
///
/// A 401 means "wrong password" on the login endpoint but "session no longer
/// valid" on bearer-protected endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Endpoint {
    Public,
    Login,
    Bearer,
}

/// Errors returned by waitlist API calls
#[derive(Error, Debug)]
pub enum ApiError {
    /// Input rejected before contacting the backend
    #[error("Validation error: {0}")]
    Validation(String),

    /// Wrong admin password
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Missing, expired or invalid session token
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-2xx response (duplicate email, server-side validation, 5xx)
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Backend could not be reached
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Other transport failure
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// Success response with a body we could not read
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classify a transport-level failure
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Unavailable(err.to_string())
        } else {
            ApiError::Request(err)
        }
    }

    /// Classify a non-2xx response
    pub(crate) fn from_status(status: StatusCode, message: String, endpoint: Endpoint) -> Self {
        match (status, endpoint) {
            (StatusCode::UNAUTHORIZED, Endpoint::Login) => ApiError::Authentication(message),
            (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, Endpoint::Bearer) => {
                ApiError::Unauthorized(message)
            }
            (StatusCode::NOT_FOUND, _) => ApiError::NotFound(message),
            _ => ApiError::Rejected {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Whether this error must end the admin session
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// Short text suitable for a user-facing notice.
    ///
    /// Backend-provided details are shown as-is; transport errors get a
    /// generic description.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(msg)
            | ApiError::Authentication(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Rejected { message: msg, .. } => msg.clone(),
            ApiError::Unavailable(_) => "Cannot reach the waitlist service".to_string(),
            ApiError::Timeout => "The waitlist service did not respond in time".to_string(),
            ApiError::Request(e) => e.to_string(),
            ApiError::Decode(_) => "Unexpected response from the waitlist service".to_string(),
        }
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
