//! Authorized request client. Every call reads the freshest token from the
//! credential store (never a cached copy) and every outcome, transport or
//! application, collapses into one `ApiResponse` shape so callers branch on a
//! single pattern regardless of where a failure originated.

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::error::ClientError;
use crate::session::CredentialStore;

pub const NETWORK_ERROR_MSG: &str = "Network error. Please try again later.";

/// Uniform result shape for every API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: Value) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(message.into()) }
    }

    /// Decode the body into a concrete type; `None` on failure responses or
    /// when the body does not have the expected shape.
    pub fn decode<T: DeserializeOwned>(&self) -> Option<T> {
        self.data.as_ref().and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base: Option<Url>,
    http: reqwest::Client,
    store: CredentialStore,
}

impl ApiClient {
    /// An unparsable or absent base URL never fails construction; it fails
    /// each request instead, as a normal request failure.
    pub fn new(base: Option<&str>, store: CredentialStore) -> Self {
        let base = base.and_then(|s| match Url::parse(s) {
            Ok(u) => Some(u),
            Err(e) => {
                tracing::warn!(target: "api", "ignoring invalid API base URL: {e}");
                None
            }
        });
        Self { base, http: reqwest::Client::new(), store }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.api_base.as_deref(), CredentialStore::new(&cfg.profile_dir))
    }

    pub async fn get(&self, path: &str) -> ApiResponse {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> ApiResponse {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> ApiResponse {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> ApiResponse {
        self.request(Method::DELETE, path, None).await
    }

    async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> ApiResponse {
        match self.perform(method, path, body).await {
            Ok(resp) => resp,
            Err(ClientError::Api { message, .. }) => ApiResponse::fail(message),
            Err(ClientError::Transport { message }) => {
                tracing::warn!(target: "api", path = path, "transport failure: {message}");
                ApiResponse::fail(NETWORK_ERROR_MSG)
            }
            Err(e) => ApiResponse::fail(e.message().to_string()),
        }
    }

    async fn perform(&self, method: Method, path: &str, body: Option<&Value>) -> Result<ApiResponse, ClientError> {
        let Some(base) = &self.base else {
            return Err(ClientError::config("API base URL is not configured"));
        };
        let url = base.join(path).map_err(|e| ClientError::config(e.to_string()))?;

        let mut req = self.http.request(method, url);
        // Freshest on-disk token on every call so logout applies immediately.
        // No token is not a local failure; authorization is server-enforced.
        if let Some(token) = self.store.token() {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req.send().await.map_err(|e| ClientError::transport(e.to_string()))?;
        let status = resp.status();
        let parsed: Result<Value, _> = resp.json().await;

        if status.is_success() {
            match parsed {
                Ok(v) => Ok(ApiResponse::ok(v)),
                Err(e) => Err(ClientError::transport(e.to_string())),
            }
        } else {
            let message = parsed
                .ok()
                .as_ref()
                .and_then(|v| v.get("error"))
                .and_then(|e| e.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
            Err(ClientError::api(status.as_u16(), message))
        }
    }
}
