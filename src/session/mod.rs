//! Admin Session Persistence
//!
//! The session token survives restarts until an explicit logout or until the
//! backend rejects it.

mod store;

pub use crate::api::SessionToken;
pub use store::{FileTokenStore, MemoryTokenStore, StoreError, TokenStore, TOKEN_KEY};
