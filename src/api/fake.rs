//! In-memory backend used by unit tests

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use super::{
    ApiError, ApiResult, DeleteConfirmation, LoginResponse, SessionToken, Signup, SignupReceipt,
    WaitlistApi,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Signup(String),
    Count,
    Login,
    List,
    Delete(i64),
}

#[derive(Default)]
struct FakeState {
    signups: Vec<Signup>,
    next_id: i64,
    tokens: HashSet<String>,
    issued: u64,
    calls: Vec<Call>,
    list_delay: Option<Duration>,
    delete_delay: Option<Duration>,
    hang_signups: bool,
    offline: bool,
}

pub(crate) struct FakeApi {
    password: String,
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub(crate) fn new(password: &str) -> Self {
        Self {
            password: password.to_string(),
            state: Mutex::new(FakeState {
                next_id: 1,
                ..FakeState::default()
            }),
        }
    }

    /// Seed signups with ids 1..=n, newest first
    pub(crate) fn with_signups(self, emails: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let now = Utc::now();
            for (i, email) in emails.iter().enumerate() {
                let id = state.next_id;
                state.next_id += 1;
                state.signups.push(Signup {
                    id,
                    email: email.to_string(),
                    created_at: now - ChronoDuration::hours(i as i64),
                });
            }
        }
        self
    }

    pub(crate) fn accept_token(&self, token: &str) {
        self.state.lock().unwrap().tokens.insert(token.to_string());
    }

    pub(crate) fn revoke_tokens(&self) {
        self.state.lock().unwrap().tokens.clear();
    }

    pub(crate) fn set_list_delay(&self, delay: Duration) {
        self.state.lock().unwrap().list_delay = Some(delay);
    }

    pub(crate) fn set_delete_delay(&self, delay: Duration) {
        self.state.lock().unwrap().delete_delay = Some(delay);
    }

    /// Signup requests never complete while set
    pub(crate) fn set_hang_signups(&self, hang: bool) {
        self.state.lock().unwrap().hang_signups = hang;
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn count_calls(&self, call: &Call) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| *c == call)
            .count()
    }

    pub(crate) fn emails(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .signups
            .iter()
            .map(|s| s.email.clone())
            .collect()
    }

    fn record(&self, call: Call) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.offline {
            return Err(ApiError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }

    fn authorize(&self, token: &SessionToken) -> ApiResult<()> {
        if self.state.lock().unwrap().tokens.contains(token.as_str()) {
            Ok(())
        } else {
            Err(ApiError::Unauthorized("Token has expired".to_string()))
        }
    }
}

#[async_trait]
impl WaitlistApi for FakeApi {
    async fn signup(&self, email: &str) -> ApiResult<SignupReceipt> {
        self.record(Call::Signup(email.to_string()))?;
        let hang = self.state.lock().unwrap().hang_signups;
        if hang {
            std::future::pending::<()>().await;
        }

        let mut state = self.state.lock().unwrap();

        if state.signups.iter().any(|s| s.email == email) {
            return Err(ApiError::Rejected {
                status: 400,
                message: "Email already registered for waitlist".to_string(),
            });
        }

        let signup = Signup {
            id: state.next_id,
            email: email.to_string(),
            created_at: Utc::now(),
        };
        state.next_id += 1;
        state.signups.insert(0, signup.clone());

        Ok(SignupReceipt {
            id: signup.id,
            email: signup.email,
            created_at: signup.created_at,
            message: Some("Successfully joined waitlist!".to_string()),
        })
    }

    async fn count(&self) -> ApiResult<u64> {
        self.record(Call::Count)?;
        Ok(self.state.lock().unwrap().signups.len() as u64)
    }

    async fn login(&self, password: &str) -> ApiResult<LoginResponse> {
        self.record(Call::Login)?;
        if password != self.password {
            return Err(ApiError::Authentication("Invalid password".to_string()));
        }

        let mut state = self.state.lock().unwrap();
        state.issued += 1;
        let token = format!("token-{}", state.issued);
        state.tokens.insert(token.clone());

        Ok(LoginResponse {
            access_token: SessionToken::new(token),
            token_type: "bearer".to_string(),
        })
    }

    async fn list_signups(&self, token: &SessionToken) -> ApiResult<Vec<Signup>> {
        self.record(Call::List)?;
        // The list is read when the request arrives, not when it returns
        let (delay, signups) = {
            let state = self.state.lock().unwrap();
            (state.list_delay, state.signups.clone())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.authorize(token)?;
        Ok(signups)
    }

    async fn delete_signup(&self, id: i64, token: &SessionToken) -> ApiResult<DeleteConfirmation> {
        self.record(Call::Delete(id))?;
        let delay = self.state.lock().unwrap().delete_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.authorize(token)?;

        let mut state = self.state.lock().unwrap();
        let index = state
            .signups
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| ApiError::NotFound("Signup not found".to_string()))?;
        let removed = state.signups.remove(index);

        Ok(DeleteConfirmation {
            message: format!("Signup {} deleted successfully", removed.email),
        })
    }
}
