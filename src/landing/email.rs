//! Client-side email shape check
//!
//! Only rejects input that is unequivocally malformed. Duplicates and any
//! account-level rules are decided by the backend.

use regex::Regex;
use std::sync::OnceLock;

use crate::api::ApiError;

/// Longest address accepted, in characters (RFC 5321 path limit)
pub const MAX_EMAIL_LEN: usize = 254;

fn email_pattern() -> Result<&'static Regex, ApiError> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$"))
        .as_ref()
        .map_err(|e| ApiError::Validation(format!("Email pattern error: {}", e)))
}

/// Validate the shape of an already-trimmed email address
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.is_empty() {
        return Err(ApiError::Validation("Email is required".to_string()));
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(ApiError::Validation(format!(
            "Email must be at most {} characters",
            MAX_EMAIL_LEN
        )));
    }
    if !email_pattern()?.is_match(email) {
        return Err(ApiError::Validation(
            "Please enter a valid email address".to_string(),
        ));
    }
    Ok(())
}
