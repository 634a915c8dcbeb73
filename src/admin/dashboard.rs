//! Admin Dashboard
//!
//! Session gating, periodic refresh and deletion of waitlist signups.
//!
//! ```text
//! Unauthenticated --login / mount with stored token--> Authenticated
//! Authenticated --logout / 401 on any call--> Unauthenticated
//! ```
//!
//! Every session gets a new generation number. A response is applied only if
//! the generation it was issued under is still current; anything else belongs
//! to an ended session and is dropped.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::RwLock;

use super::poller::{self, PollControl, PollHandle};
use super::stats::SignupStats;
use crate::api::{ApiError, ApiResult, DeleteConfirmation, SessionToken, Signup, WaitlistApi};
use crate::notice::{Notice, Notices};
use crate::session::{StoreError, TokenStore};

/// Default signup list refresh interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

const SESSION_EXPIRED: &str = "Session expired. Please login again.";
const NOT_AUTHENTICATED: &str = "Not authenticated";
const TOKEN_NOT_REMOVED: &str = "Could not remove the stored session token";

/// Admin session state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticated,
}

/// Dashboard behavior settings
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub poll_interval: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Point-in-time copy of what the dashboard shows
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub session: SessionState,
    pub signups: Vec<Signup>,
    pub stats: SignupStats,
    pub loading: bool,
    pub last_refresh: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct AdminState {
    session: SessionState,
    token: Option<SessionToken>,
    generation: u64,
    signups: Vec<Signup>,
    loading: bool,
    last_refresh: Option<DateTime<Utc>>,
    /// Ids confirmed deleted during this session, in order
    deleted: Vec<i64>,
    notices: Notices,
}

/// Outcome of one list refresh
enum Refresh {
    Applied,
    /// The session changed while the request was in flight
    Discarded,
    Failed(ApiError),
}

struct Inner {
    api: Arc<dyn WaitlistApi>,
    store: Arc<dyn TokenStore>,
    config: DashboardConfig,
    state: RwLock<AdminState>,
    /// Lock order: `state` before `poller`
    poller: Mutex<Option<PollHandle>>,
}

/// Admin dashboard over the waitlist backend.
///
/// Cheap to clone; clones share the same session. The polling task only
/// holds a weak reference, so dropping the last clone stops it.
#[derive(Clone)]
pub struct AdminDashboard {
    inner: Arc<Inner>,
}

impl AdminDashboard {
    pub fn new(
        api: Arc<dyn WaitlistApi>,
        store: Arc<dyn TokenStore>,
        config: DashboardConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                store,
                config,
                state: RwLock::new(AdminState::default()),
                poller: Mutex::new(None),
            }),
        }
    }

    /// Enter the dashboard view.
    ///
    /// Restores a persisted session if there is one, refreshes the list and
    /// starts polling. Without a stored token the dashboard stays
    /// unauthenticated (login form).
    pub async fn mount(&self) -> SessionState {
        let stored = match self.inner.store.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored session token");
                None
            }
        };

        let Some(token) = stored else {
            tracing::debug!("No stored admin session");
            return SessionState::Unauthenticated;
        };

        tracing::info!("Restoring stored admin session");
        let generation = self.inner.establish(token).await;
        self.inner.refresh_generation(generation).await;
        self.start_polling(generation).await;

        self.session().await
    }

    /// Leave the dashboard view. Polling stops; the session is kept.
    pub fn unmount(&self) {
        self.inner.stop_polling();
    }

    /// Log in with the admin password.
    ///
    /// On success the token is persisted, the list is fetched and polling
    /// starts.
    pub async fn login(&self, password: &str) -> ApiResult<()> {
        self.inner.state.write().await.loading = true;

        let response = match self.inner.api.login(password).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Admin login failed");
                let mut state = self.inner.state.write().await;
                state.loading = false;
                state.notices.push(Notice::error(e.user_message()));
                return Err(e);
            }
        };

        if let Err(e) = self.inner.store.save(&response.access_token) {
            tracing::warn!(error = %e, "Failed to persist session token");
            self.inner
                .state
                .write()
                .await
                .notices
                .push(Notice::error("Session will not be remembered after exit"));
        }

        let generation = self.inner.establish(response.access_token).await;
        tracing::info!(generation, "Admin logged in");
        self.inner
            .state
            .write()
            .await
            .notices
            .push(Notice::success("Login successful!"));

        self.inner.refresh_generation(generation).await;
        self.start_polling(generation).await;
        Ok(())
    }

    /// End the session: token removed, list cleared, polling stopped.
    ///
    /// Fails when the stored token could not be removed; the in-memory
    /// session is ended either way.
    pub async fn logout(&self) -> Result<(), StoreError> {
        let mut state = self.inner.state.write().await;

        if state.session == SessionState::Authenticated {
            self.inner.end_session(&mut state)?;
        } else {
            self.inner.clear_token(&mut state)?;
        }

        state
            .notices
            .push(Notice::success("Logged out successfully"));
        tracing::info!("Admin logged out");
        Ok(())
    }

    /// Refresh the signup list now.
    ///
    /// Returns `false` when the session ended while the request was in
    /// flight and the response was dropped.
    pub async fn refresh(&self) -> ApiResult<bool> {
        let generation = {
            let state = self.inner.state.read().await;
            if state.session != SessionState::Authenticated {
                return Err(ApiError::Unauthorized(NOT_AUTHENTICATED.to_string()));
            }
            state.generation
        };

        match self.inner.refresh_generation(generation).await {
            Refresh::Applied => Ok(true),
            Refresh::Discarded => Ok(false),
            Refresh::Failed(e) => Err(e),
        }
    }

    /// Delete a signup.
    ///
    /// The entry leaves the local list only after the backend confirms; on
    /// failure the list is unchanged. Confirmation is the caller's job.
    pub async fn delete(&self, id: i64) -> ApiResult<DeleteConfirmation> {
        let (generation, token) = {
            let mut state = self.inner.state.write().await;
            match (state.session, state.token.clone()) {
                (SessionState::Authenticated, Some(token)) => (state.generation, token),
                _ => {
                    state.notices.push(Notice::error(NOT_AUTHENTICATED));
                    return Err(ApiError::Unauthorized(NOT_AUTHENTICATED.to_string()));
                }
            }
        };

        let result = self.inner.api.delete_signup(id, &token).await;

        let mut state = self.inner.state.write().await;
        if state.generation != generation {
            tracing::debug!(id, "Session ended while deleting signup");
            return result;
        }

        match result {
            Ok(confirmation) => {
                tracing::info!(id, "Deleted signup");
                state.signups.retain(|s| s.id != id);
                state.deleted.push(id);
                state
                    .notices
                    .push(Notice::success("Signup deleted successfully"));
                Ok(confirmation)
            }
            Err(e) if e.is_unauthorized() => {
                tracing::warn!(error = %e, "Session rejected while deleting signup");
                self.inner.expire_session(&mut state);
                Err(e)
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "Failed to delete signup");
                state.notices.push(Notice::error(e.user_message()));
                Err(e)
            }
        }
    }

    pub async fn session(&self) -> SessionState {
        self.inner.state.read().await.session
    }

    /// Current signups, in backend order
    pub async fn signups(&self) -> Vec<Signup> {
        self.inner.state.read().await.signups.clone()
    }

    pub async fn stats(&self) -> SignupStats {
        SignupStats::compute(&self.inner.state.read().await.signups, Utc::now())
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.state.read().await.loading
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        let state = self.inner.state.read().await;
        DashboardSnapshot {
            session: state.session,
            signups: state.signups.clone(),
            stats: SignupStats::compute(&state.signups, Utc::now()),
            loading: state.loading,
            last_refresh: state.last_refresh,
        }
    }

    /// Take pending notices
    pub async fn drain_notices(&self) -> Vec<Notice> {
        self.inner.state.write().await.notices.drain()
    }

    /// Whether a polling task is currently scheduled
    pub fn is_polling(&self) -> bool {
        self.inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(PollHandle::is_active)
    }

    async fn start_polling(&self, generation: u64) {
        // Held while installing the handle so the session cannot end in between
        let state = self.inner.state.read().await;
        if state.generation != generation || state.session != SessionState::Authenticated {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        let handle = poller::spawn(self.inner.config.poll_interval, move || {
            let weak = weak.clone();
            async move {
                let Some(inner) = weak.upgrade() else {
                    return PollControl::Stop;
                };
                match inner.refresh_generation(generation).await {
                    Refresh::Applied => PollControl::Continue,
                    Refresh::Failed(e) if e.is_unauthorized() => PollControl::Stop,
                    Refresh::Failed(_) => PollControl::Continue,
                    Refresh::Discarded => PollControl::Stop,
                }
            }
        });

        *self
            .inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);
        tracing::debug!(
            generation,
            interval_secs = self.inner.config.poll_interval.as_secs_f64(),
            "Started signup polling"
        );
    }
}

impl Inner {
    /// Start a new session with `token` and return its generation
    async fn establish(&self, token: SessionToken) -> u64 {
        let mut state = self.state.write().await;
        self.stop_polling();

        state.generation += 1;
        state.session = SessionState::Authenticated;
        state.token = Some(token);
        state.signups.clear();
        state.loading = false;
        state.last_refresh = None;
        state.deleted.clear();
        state.generation
    }

    async fn refresh_generation(&self, generation: u64) -> Refresh {
        let (token, deleted_before) = {
            let mut state = self.state.write().await;
            if state.generation != generation {
                return Refresh::Discarded;
            }
            let Some(token) = state.token.clone() else {
                return Refresh::Discarded;
            };
            state.loading = true;
            (token, state.deleted.len())
        };

        let result = self.api.list_signups(&token).await;

        let mut state = self.state.write().await;
        if state.generation != generation {
            tracing::debug!(generation, "Dropping signup list from an ended session");
            return Refresh::Discarded;
        }
        state.loading = false;

        match result {
            Ok(mut signups) => {
                // Deletes confirmed while the request was in flight
                let deleted_since = &state.deleted[deleted_before..];
                if !deleted_since.is_empty() {
                    signups.retain(|s| !deleted_since.contains(&s.id));
                }
                tracing::debug!(count = signups.len(), "Refreshed signups");
                state.signups = signups;
                state.last_refresh = Some(Utc::now());
                Refresh::Applied
            }
            Err(e) if e.is_unauthorized() => {
                tracing::warn!(error = %e, "Session rejected while refreshing signups");
                self.expire_session(&mut state);
                Refresh::Failed(e)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh signups");
                state.notices.push(Notice::error(format!(
                    "Failed to fetch signups: {}",
                    e.user_message()
                )));
                Refresh::Failed(e)
            }
        }
    }

    /// Caller holds the state write lock
    fn end_session(&self, state: &mut AdminState) -> Result<(), StoreError> {
        state.generation += 1;
        state.session = SessionState::Unauthenticated;
        state.token = None;
        state.signups.clear();
        state.deleted.clear();
        state.loading = false;
        state.last_refresh = None;

        self.stop_polling();
        self.clear_token(state)
    }

    /// End the session after the backend rejected its token
    fn expire_session(&self, state: &mut AdminState) {
        // A failed removal has already raised its own notice
        let _ = self.end_session(state);
        state.notices.push(Notice::error(SESSION_EXPIRED));
    }

    fn clear_token(&self, state: &mut AdminState) -> Result<(), StoreError> {
        self.store.clear().map_err(|e| {
            tracing::error!(error = %e, "Failed to remove stored session token");
            state.notices.push(Notice::error(TOKEN_NOT_REMOVED));
            e
        })
    }

    fn stop_polling(&self) {
        let handle = self
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if handle.is_some() {
            tracing::debug!("Stopped signup polling");
        }
    }
}
