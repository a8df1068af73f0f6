use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::Method;
use serde_json::Value;

use super::*;

impl CoreClient {
    pub async fn metrics(&self) -> ApiResult<Value> {
        self.get_value("/v3/metrics").await
    }

    /// Metrics in the Prometheus text exposition format, returned untouched
    pub async fn prometheus_metrics(&self) -> ApiResult<String> {
        let request = self
            .request(Method::GET, "/metrics")
            .header(ACCEPT, HeaderValue::from_static("text/plain"));
        let response = self.send(request).await?;
        response
            .text()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}
