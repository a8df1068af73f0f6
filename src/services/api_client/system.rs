use reqwest::Method;
use serde_json::Value;

use super::*;

impl CoreClient {
    /// `GET /v3`: name, version and uptime of the Core
    pub async fn info(&self) -> ApiResult<Value> {
        self.get_value("/v3").await
    }

    pub async fn about(&self) -> ApiResult<Value> {
        self.get_value("/v3/about").await
    }

    pub async fn config(&self) -> ApiResult<Value> {
        self.get_value("/v3/config").await
    }

    pub async fn update_config(&self, config: &Value) -> ApiResult<Value> {
        self.send_json(Method::PUT, "/v3/config", config).await
    }

    pub async fn reload_config(&self) -> ApiResult<Value> {
        self.get_value("/v3/config/reload").await
    }

    /// Core's own application log
    pub async fn log(&self) -> ApiResult<Value> {
        self.get_value("/v3/log").await
    }

    /// FFmpeg capabilities (codecs, formats, devices) detected by the Core
    pub async fn skills(&self) -> ApiResult<Value> {
        self.get_value("/v3/skills").await
    }

    pub async fn playout_status(&self) -> ApiResult<Value> {
        self.get_value("/v3/playout").await
    }

    /// Probe a stream address with FFprobe on the Core host
    pub async fn probe(&self, url: &str, options: &[String]) -> ApiResult<Value> {
        self.send_json(
            Method::POST,
            "/v3/probe",
            &serde_json::json!({ "url": url, "options": options }),
        )
        .await
    }

    /// Capture devices on the Core host. Any failure other than 401 yields an
    /// empty list; a 401 still clears the session.
    pub async fn devices(&self) -> ApiResult<Vec<Value>> {
        match self.get_value("/v3/device").await {
            Ok(Value::Array(devices)) => Ok(devices),
            Ok(other) => {
                log::debug!("Unexpected device list shape: {other}");
                Ok(Vec::new())
            }
            Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized),
            Err(e) => {
                log::debug!("Device enumeration failed: {e}");
                Ok(Vec::new())
            }
        }
    }
}
