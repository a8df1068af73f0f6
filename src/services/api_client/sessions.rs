use reqwest::Method;
use serde_json::Value;

use super::*;

impl CoreClient {
    async fn get_sessions(&self, path: &str, collectors: &[String]) -> ApiResult<Value> {
        let mut request = self.request(Method::GET, path);
        if !collectors.is_empty() {
            request = request.query(&[("collectors", collectors.join(","))]);
        }
        let response = self.send(request).await?;
        read_value(response).await
    }

    /// Session history, optionally limited to some collectors (e.g. `hls`, `rtmp`)
    pub async fn sessions(&self, collectors: &[String]) -> ApiResult<Value> {
        self.get_sessions("/v3/session", collectors).await
    }

    pub async fn active_sessions(&self, collectors: &[String]) -> ApiResult<Value> {
        self.get_sessions("/v3/session/active", collectors).await
    }

    pub async fn session_summary(&self) -> ApiResult<Value> {
        self.get_value("/v3/session/summary").await
    }
}
