//! In-process stub of the waitlist backend

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ADMIN_PASSWORD: &str = "admin123";
pub const TOKEN: &str = "stub-session-token";

type Reply = (StatusCode, Json<Value>);

#[derive(Default)]
struct Backend {
    signups: Vec<(i64, String, String)>,
    next_id: i64,
    token_valid: bool,
    requests: Vec<String>,
    count_delay: Option<Duration>,
}

type Shared = Arc<Mutex<Backend>>;

pub struct StubServer {
    addr: SocketAddr,
    state: Shared,
}

impl StubServer {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(Backend {
            next_id: 1,
            ..Backend::default()
        }));

        let app = Router::new()
            .route("/api/waitlist/signup", post(signup))
            .route("/api/waitlist/count", get(count))
            .route("/api/auth/login", post(login))
            .route("/api/waitlist/list", get(list))
            .route("/api/waitlist/delete/:id", delete(remove))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Add signups directly, newest last
    pub fn seed(&self, emails: &[&str]) {
        let mut backend = self.state.lock().unwrap();
        for email in emails {
            insert(&mut backend, email);
        }
    }

    pub fn expire_tokens(&self) {
        self.state.lock().unwrap().token_valid = false;
    }

    pub fn set_count_delay(&self, delay: Duration) {
        self.state.lock().unwrap().count_delay = Some(delay);
    }

    /// Requests seen so far, as "METHOD /path"
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn emails(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .signups
            .iter()
            .map(|(_, email, _)| email.clone())
            .collect()
    }
}

fn insert(backend: &mut Backend, email: &str) -> (i64, String) {
    let id = backend.next_id;
    backend.next_id += 1;
    // Naive UTC timestamp, as the backend serializes them
    let created_at = chrono::Utc::now()
        .naive_utc()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string();
    backend
        .signups
        .push((id, email.to_string(), created_at.clone()));
    (id, created_at)
}

fn record(state: &Shared, method: &Method, uri: &Uri) {
    state
        .lock()
        .unwrap()
        .requests
        .push(format!("{} {}", method, uri.path()));
}

fn detail(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "detail": message })))
}

fn authorize(state: &Shared, headers: &HeaderMap) -> Result<(), Reply> {
    let Some(value) = headers.get("authorization").and_then(|v| v.to_str().ok()) else {
        return Err(detail(StatusCode::FORBIDDEN, "Not authenticated"));
    };

    let valid = state.lock().unwrap().token_valid;
    if value == format!("Bearer {}", TOKEN) && valid {
        Ok(())
    } else {
        Err(detail(StatusCode::UNAUTHORIZED, "Token has expired"))
    }
}

async fn signup(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    Json(body): Json<Value>,
) -> Reply {
    record(&state, &method, &uri);
    let email = body["email"].as_str().unwrap_or_default().to_string();

    if !email.contains('@') {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "detail": [{
                    "loc": ["body", "email"],
                    "msg": "value is not a valid email address",
                    "type": "value_error"
                }]
            })),
        );
    }

    let mut backend = state.lock().unwrap();
    if backend.signups.iter().any(|(_, e, _)| *e == email) {
        return detail(StatusCode::BAD_REQUEST, "Email already registered for waitlist");
    }

    let (id, created_at) = insert(&mut backend, &email);
    (
        StatusCode::OK,
        Json(json!({
            "id": id,
            "email": email,
            "created_at": created_at,
            "message": "Successfully joined waitlist! Check your email for confirmation."
        })),
    )
}

async fn count(State(state): State<Shared>, method: Method, uri: Uri) -> Reply {
    record(&state, &method, &uri);
    let delay = state.lock().unwrap().count_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let count = state.lock().unwrap().signups.len();
    (StatusCode::OK, Json(json!({ "count": count })))
}

async fn login(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    Json(body): Json<Value>,
) -> Reply {
    record(&state, &method, &uri);
    if body["password"].as_str() != Some(ADMIN_PASSWORD) {
        return detail(StatusCode::UNAUTHORIZED, "Invalid password");
    }

    state.lock().unwrap().token_valid = true;
    (
        StatusCode::OK,
        Json(json!({ "access_token": TOKEN, "token_type": "bearer" })),
    )
}

async fn list(State(state): State<Shared>, method: Method, uri: Uri, headers: HeaderMap) -> Reply {
    record(&state, &method, &uri);
    if let Err(reply) = authorize(&state, &headers) {
        return reply;
    }

    let backend = state.lock().unwrap();
    let signups: Vec<Value> = backend
        .signups
        .iter()
        .rev()
        .map(|(id, email, created_at)| {
            json!({ "id": id, "email": email, "created_at": created_at, "message": null })
        })
        .collect();
    (StatusCode::OK, Json(Value::Array(signups)))
}

async fn remove(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Reply {
    record(&state, &method, &uri);
    if let Err(reply) = authorize(&state, &headers) {
        return reply;
    }

    let mut backend = state.lock().unwrap();
    match backend.signups.iter().position(|(i, _, _)| *i == id) {
        Some(index) => {
            let (_, email, _) = backend.signups.remove(index);
            (
                StatusCode::OK,
                Json(json!({ "message": format!("Signup {} deleted successfully", email) })),
            )
        }
        None => detail(StatusCode::NOT_FOUND, "Signup not found"),
    }
}
