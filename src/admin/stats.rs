//! Dashboard statistics

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::api::Signup;

/// Summary counts shown above the signup list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SignupStats {
    pub total: usize,
    /// Signups created on the current UTC calendar day
    pub today: usize,
    /// Signups created within the last seven days
    pub this_week: usize,
}

impl SignupStats {
    pub fn compute(signups: &[Signup], now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let week_ago = now - Duration::days(7);

        Self {
            total: signups.len(),
            today: signups
                .iter()
                .filter(|s| s.created_at.date_naive() == today)
                .count(),
            this_week: signups.iter().filter(|s| s.created_at >= week_ago).count(),
        }
    }
}
