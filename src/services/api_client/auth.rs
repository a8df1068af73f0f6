use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::*;

/// JWT login request payload
#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// JWT login response
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl CoreClient {
    /// Verify username and password with Basic auth against `GET /v3`.
    /// On success both replace whatever was stored, including any token.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<Value> {
        let basic = Authorization::Basic {
            username: username.to_string(),
            password: password.to_string(),
        };

        let response = self.send_as(self.request(Method::GET, "/v3"), Some(basic)).await?;
        let about = read_value(response).await?;

        // A token from an earlier session would otherwise outrank these credentials
        self.session
            .store_credentials(&Credentials::basic(username, password))?;

        log::info!("Logged in to {} as {username}", self.base_url);
        Ok(about)
    }

    /// Exchange username and password for a JWT at `POST /v3/login`.
    /// A returned access token takes precedence over Basic credentials.
    pub async fn login_jwt(&self, username: &str, password: &str) -> ApiResult<LoginResponse> {
        let response = self
            .send(
                self.request(Method::POST, "/v3/login")
                    .json(&LoginRequest { username, password }),
            )
            .await?;

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        if let Some(token) = login.access_token.as_deref().filter(|t| !t.is_empty()) {
            let mut credentials = self.session.credentials()?;
            credentials.auth_token = Some(token.to_string());
            self.session.store_credentials(&credentials)?;
            log::info!("Obtained access token for {username}");
        } else {
            log::warn!("Login for {username} returned no access token");
        }

        Ok(login)
    }

    /// Forget all stored credentials
    pub fn logout(&self) -> ApiResult<()> {
        self.session.clear()?;
        log::info!("Logged out of {}", self.base_url);
        Ok(())
    }

    /// Whether the stored credentials are accepted by the Core
    pub async fn validate_token(&self) -> bool {
        match self.send(self.request(Method::GET, "/v3")).await {
            Ok(_) => true,
            Err(e) => {
                log::debug!("Credential check failed: {e}");
                false
            }
        }
    }
}
