//! REST client for the datarhei Core API.
//!
//! Every request goes through [`CoreClient::send`], which attaches the stored
//! credentials and turns any 401 into a cleared session plus a
//! [`SessionListener::unauthorized`] notification.

mod auth;
mod channels;
mod filesystem;
mod metadata;
mod metrics;
mod process;
mod restream;
mod sessions;
mod system;
mod widget;

pub use auth::LoginResponse;
pub use filesystem::FileInfo;
pub use restream::RestreamResult;

use crate::models::{Authorization, ClientSettings, Credentials};
use crate::services::credential_store::{CredentialStore, MemoryCredentialStore, StoreError};
use crate::services::descriptor_builder::BuildError;
use crate::services::events::{NoopSessionListener, SessionListener};
use crate::services::platform_registry::PlatformRegistry;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// API client errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 from any endpoint; the session has already been cleared
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// The request never reached the server or timed out
    #[error("Connection failed: {0}")]
    Connectivity(String),
    #[error("HTTP {status} error: {message}")]
    Http { status: u16, message: String },
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Session storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Build(#[from] BuildError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Storage(e.to_string())
    }
}

impl ApiError {
    /// Text suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Invalid username or password".to_string(),
            ApiError::Forbidden(_) => "Access denied".to_string(),
            ApiError::Connectivity(_) => {
                "Unable to connect to server. Please check your connection.".to_string()
            }
            ApiError::Http { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Http { status, .. } => format!("Request failed (HTTP {status})"),
            ApiError::Decode(_) => "The server sent an unexpected response".to_string(),
            ApiError::Storage(_) => "Could not access the local session store".to_string(),
            ApiError::Build(e) => e.to_string(),
        }
    }
}

/// Explicit session context: where credentials live and who hears about a 401
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn CredentialStore>,
    listener: Arc<dyn SessionListener>,
}

impl Session {
    pub fn new(store: Arc<dyn CredentialStore>, listener: Arc<dyn SessionListener>) -> Self {
        Self { store, listener }
    }

    /// In-memory session with no unauthorized handling
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCredentialStore::new()), Arc::new(NoopSessionListener))
    }

    pub fn credentials(&self) -> ApiResult<Credentials> {
        Ok(self.store.load()?)
    }

    pub fn store_credentials(&self, credentials: &Credentials) -> ApiResult<()> {
        Ok(self.store.save(credentials)?)
    }

    pub fn clear(&self) -> ApiResult<()> {
        Ok(self.store.clear()?)
    }

    fn authorization(&self) -> Option<Authorization> {
        match self.store.load() {
            Ok(credentials) => credentials.authorization(),
            Err(e) => {
                log::warn!("Failed to read stored credentials: {e}");
                None
            }
        }
    }

    fn invalidate(&self, login_route: &str) {
        if let Err(e) = self.store.clear() {
            log::error!("Failed to clear credentials after 401: {e}");
        }
        self.listener.unauthorized(login_route);
    }
}

/// Client for the Core REST API.
#[derive(Clone)]
pub struct CoreClient {
    client: reqwest::Client,
    base_url: String,
    login_route: String,
    session: Session,
    registry: Arc<PlatformRegistry>,
}

impl CoreClient {
    /// Create a client; the settings' timeout applies to every request
    pub fn new(settings: &ClientSettings, session: Session) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Connectivity(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            login_route: settings.login_route.clone(),
            session,
            registry: Arc::new(PlatformRegistry::new()),
        })
    }

    /// Get the base URL for the API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(super) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    /// Send with the stored credentials
    pub(super) async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        self.send_as(request, None).await
    }

    /// Send with explicit credentials, or the stored ones when `auth` is `None`.
    ///
    /// The header is computed here, at send time, so a login or a 401 on a
    /// concurrent request is visible to the next call.
    pub(super) async fn send_as(
        &self,
        request: RequestBuilder,
        auth: Option<Authorization>,
    ) -> ApiResult<Response> {
        let request = match auth.or_else(|| self.session.authorization()) {
            Some(auth) => request.header(AUTHORIZATION, auth.header_value()),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Connectivity(e.to_string()))?;

        self.check_status(response).await
    }

    async fn check_status(&self, response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            log::warn!("Core rejected credentials for {}", response.url().path());
            self.session.invalidate(&self.login_route);
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        let message = server_message(&body);

        if status == StatusCode::FORBIDDEN {
            return Err(ApiError::Forbidden(message));
        }

        Err(ApiError::Http {
            status: status.as_u16(),
            message,
        })
    }

    pub(super) async fn get_value(&self, path: &str) -> ApiResult<Value> {
        let response = self.send(self.request(Method::GET, path)).await?;
        read_value(response).await
    }

    pub(super) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.send(self.request(Method::GET, path)).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub(super) async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ApiResult<Value> {
        let response = self.send(self.request(method, path).json(body)).await?;
        read_value(response).await
    }

    pub(super) async fn delete_value(&self, path: &str) -> ApiResult<Value> {
        let response = self.send(self.request(Method::DELETE, path)).await?;
        read_value(response).await
    }
}

/// Body as JSON; empty bodies are `null` and non-JSON bodies are kept as a string
async fn read_value(response: Response) -> ApiResult<Value> {
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))?;

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

/// Error text from a Core error body (`{"code":..,"message":..}`), else the raw body
fn server_message(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error", "details"] {
            match map.get(key) {
                Some(Value::String(message)) if !message.is_empty() => return message.clone(),
                Some(Value::Array(items)) if !items.is_empty() => {
                    return items
                        .iter()
                        .map(|item| item.as_str().map(str::to_string).unwrap_or_else(|| item.to_string()))
                        .collect::<Vec<_>>()
                        .join("; ");
                }
                _ => {}
            }
        }
    }
    body.trim().to_string()
}

/// Percent-encode one path segment (ids, metadata keys, filesystem names)
pub(super) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(ApiError::Unauthorized.user_message(), "Invalid username or password");
        assert_eq!(ApiError::Forbidden("nope".into()).user_message(), "Access denied");
        assert_eq!(
            ApiError::Connectivity("refused".into()).user_message(),
            "Unable to connect to server. Please check your connection."
        );
        assert_eq!(
            ApiError::Http { status: 409, message: "process already exists".into() }.user_message(),
            "process already exists"
        );
        assert_eq!(
            ApiError::Http { status: 500, message: String::new() }.user_message(),
            "Request failed (HTTP 500)"
        );
        assert_eq!(
            ApiError::from(BuildError::MissingName).user_message(),
            "Stream name is required"
        );
    }

    #[test]
    fn test_server_message_extraction() {
        assert_eq!(server_message(r#"{"code":400,"message":"invalid id"}"#), "invalid id");
        assert_eq!(server_message(r#"{"details":["a","b"]}"#), "a; b");
        assert_eq!(server_message(" plain text \n"), "plain text");
        assert_eq!(server_message(""), "");
    }

    #[test]
    fn test_url_joining() {
        let settings = ClientSettings {
            base_url: "http://core:8080/api/".to_string(),
            ..ClientSettings::default()
        };
        let client = CoreClient::new(&settings, Session::in_memory()).unwrap();
        assert_eq!(client.base_url(), "http://core:8080/api");
        assert_eq!(client.url("/v3/process"), "http://core:8080/api/v3/process");
        assert_eq!(segment("a b/c"), "a%20b%2Fc");
    }
}
