use reqwest::Method;
use serde_json::Value;

use super::*;

/// Global key/value store at `/v3/metadata`
impl CoreClient {
    pub async fn metadata_list(&self) -> ApiResult<Value> {
        self.get_value("/v3/metadata").await
    }

    pub async fn metadata_get(&self, key: &str) -> ApiResult<Value> {
        self.get_value(&format!("/v3/metadata/{}", segment(key))).await
    }

    pub async fn metadata_set(&self, key: &str, data: &Value) -> ApiResult<Value> {
        self.send_json(Method::PUT, &format!("/v3/metadata/{}", segment(key)), data)
            .await
    }

    pub async fn metadata_delete(&self, key: &str) -> ApiResult<Value> {
        self.delete_value(&format!("/v3/metadata/{}", segment(key))).await
    }
}
