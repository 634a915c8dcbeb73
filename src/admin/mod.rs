//! Admin Dashboard Module
//!
//! Password-gated view over all signups with live polling, stats and
//! deletion.

mod dashboard;
mod poller;
mod stats;

pub use dashboard::{
    AdminDashboard, DashboardConfig, DashboardSnapshot, SessionState, DEFAULT_POLL_INTERVAL,
};
pub use stats::SignupStats;
