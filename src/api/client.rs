//! Waitlist REST API Client
//!
//! HTTP client for the external waitlist backend. The base URL is normalized
//! once, when the client is built; every call appends a fixed endpoint path.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::error::{ApiError, ApiResult, Endpoint};
use super::types::{
    error_detail, DeleteConfirmation, LoginResponse, SessionToken, Signup, SignupReceipt,
    WaitlistCount,
};
use super::url::BaseUrl;
use super::WaitlistApi;
use crate::config::{ApiConfig, ConfigError};

const SIGNUP_PATH: &str = "/api/waitlist/signup";
const COUNT_PATH: &str = "/api/waitlist/count";
const LOGIN_PATH: &str = "/api/auth/login";
const LIST_PATH: &str = "/api/waitlist/list";
const DELETE_PATH: &str = "/api/waitlist/delete";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Waitlist REST API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: BaseUrl,
}

impl ApiClient {
    /// Create a client for an already-normalized base URL
    pub fn new(base_url: BaseUrl, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("waitlist/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self { client, base_url })
    }

    /// Build a client from the `[api]` configuration section.
    ///
    /// Fails with [`ConfigError::MissingBaseUrl`] when no base URL is set.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ClientBuildError> {
        let base_url = config.resolve_base_url()?;
        let client = Self::new(base_url, config.request_timeout())?;
        Ok(client)
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    async fn post_json<B, T>(&self, path: &str, body: &B, endpoint: Endpoint) -> ApiResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        tracing::debug!(method = "POST", path, "Calling waitlist API");
        let response = self
            .client
            .post(self.base_url.join(path))
            .json(body)
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        read_json(response, endpoint).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SessionToken>,
    ) -> ApiResult<T> {
        tracing::debug!(method = "GET", path, "Calling waitlist API");
        let mut request = self.client.get(self.base_url.join(path));
        let endpoint = match token {
            Some(token) => {
                request = request.bearer_auth(token.as_str());
                Endpoint::Bearer
            }
            None => Endpoint::Public,
        };

        let response = request.send().await.map_err(ApiError::from_transport)?;
        read_json(response, endpoint).await
    }
}

#[async_trait]
impl WaitlistApi for ApiClient {
    async fn signup(&self, email: &str) -> ApiResult<SignupReceipt> {
        #[derive(Serialize)]
        struct SignupRequest<'a> {
            email: &'a str,
        }

        self.post_json(SIGNUP_PATH, &SignupRequest { email }, Endpoint::Public)
            .await
    }

    async fn count(&self) -> ApiResult<u64> {
        let result: WaitlistCount = self.get_json(COUNT_PATH, None).await?;
        Ok(result.count)
    }

    async fn login(&self, password: &str) -> ApiResult<LoginResponse> {
        #[derive(Serialize)]
        struct LoginRequest<'a> {
            password: &'a str,
        }

        self.post_json(LOGIN_PATH, &LoginRequest { password }, Endpoint::Login)
            .await
    }

    async fn list_signups(&self, token: &SessionToken) -> ApiResult<Vec<Signup>> {
        self.get_json(LIST_PATH, Some(token)).await
    }

    async fn delete_signup(&self, id: i64, token: &SessionToken) -> ApiResult<DeleteConfirmation> {
        let path = format!("{}/{}", DELETE_PATH, id);
        tracing::debug!(method = "DELETE", path = %path, "Calling waitlist API");

        let response = self
            .client
            .delete(self.base_url.join(&path))
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        read_json(response, Endpoint::Bearer).await
    }
}

/// Decode a 2xx body, or turn anything else into a classified error
async fn read_json<T: DeserializeOwned>(response: Response, endpoint: Endpoint) -> ApiResult<T> {
    let status = response.status();

    if status.is_success() {
        let body = response.text().await.map_err(ApiError::from_transport)?;
        return serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()));
    }

    let text = response.text().await.unwrap_or_default();
    let message = error_detail(&text)
        .or_else(|| {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });

    tracing::debug!(status = status.as_u16(), detail = %message, "Waitlist API returned an error");
    Err(ApiError::from_status(status, message, endpoint))
}

/// Errors building a client from configuration
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
