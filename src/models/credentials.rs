// Credentials Model
// Authentication material kept between sessions

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

/// Authorization scheme derived from stored credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Bearer(String),
    Basic { username: String, password: String },
}

impl Authorization {
    /// Value for the `Authorization` header
    pub fn header_value(&self) -> String {
        match self {
            Authorization::Bearer(token) => format!("Bearer {token}"),
            Authorization::Basic { username, password } => {
                format!("Basic {}", BASE64.encode(format!("{username}:{password}")))
            }
        }
    }
}

/// The three persisted credential slots (`auth_token`, `auth_username`, `auth_password`)
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_password: Option<String>,
}

impl Credentials {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            auth_token: None,
            auth_username: Some(username.into()),
            auth_password: Some(password.into()),
        }
    }

    /// Bearer if a token is present, else Basic if both username and password are present
    pub fn authorization(&self) -> Option<Authorization> {
        if let Some(token) = non_empty(&self.auth_token) {
            return Some(Authorization::Bearer(token.to_string()));
        }

        match (non_empty(&self.auth_username), non_empty(&self.auth_password)) {
            (Some(username), Some(password)) => Some(Authorization::Basic {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.auth_token.is_none() && self.auth_username.is_none() && self.auth_password.is_none()
    }
}

// Secrets stay out of debug output and therefore out of the log
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("auth_token", &self.auth_token.as_ref().map(|_| "***"))
            .field("auth_username", &self.auth_username)
            .field("auth_password", &self.auth_password.as_ref().map(|_| "***"))
            .finish()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_header() {
        let creds = Credentials::basic("admin", "secret");
        assert_eq!(
            creds.authorization().unwrap().header_value(),
            "Basic YWRtaW46c2VjcmV0"
        );
    }

    #[test]
    fn test_token_takes_precedence() {
        let mut creds = Credentials::basic("admin", "secret");
        creds.auth_token = Some("abc".to_string());
        assert_eq!(creds.authorization(), Some(Authorization::Bearer("abc".to_string())));
    }

    #[test]
    fn test_username_without_password_is_anonymous() {
        let creds = Credentials {
            auth_username: Some("admin".to_string()),
            ..Default::default()
        };
        assert_eq!(creds.authorization(), None);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::basic("admin", "secret");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("admin"));
    }
}
