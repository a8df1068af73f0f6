use reqwest::Method;
use serde_json::Value;

use super::*;

/// Publication website widgets, keyed by process id
impl CoreClient {
    pub async fn widgets(&self) -> ApiResult<Value> {
        self.get_value("/v3/widget").await
    }

    pub async fn widget(&self, process_id: &str) -> ApiResult<Value> {
        self.get_value(&format!("/v3/widget/{}", segment(process_id))).await
    }

    pub async fn create_widget(&self, process_id: &str, config: &Value) -> ApiResult<Value> {
        self.send_json(Method::POST, &format!("/v3/widget/{}", segment(process_id)), config)
            .await
    }

    pub async fn update_widget(&self, process_id: &str, config: &Value) -> ApiResult<Value> {
        self.send_json(Method::PUT, &format!("/v3/widget/{}", segment(process_id)), config)
            .await
    }

    pub async fn delete_widget(&self, process_id: &str) -> ApiResult<Value> {
        self.delete_value(&format!("/v3/widget/{}", segment(process_id))).await
    }
}
