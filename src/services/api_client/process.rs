use crate::models::{ProcessCommand, ProcessDescriptor, ProcessSummary};
use reqwest::Method;
use serde_json::Value;

use super::*;

impl CoreClient {
    pub async fn list_processes(&self) -> ApiResult<Vec<ProcessSummary>> {
        self.get_json("/v3/process").await
    }

    /// Process list exactly as the Core returned it
    pub async fn list_processes_raw(&self) -> ApiResult<Value> {
        self.get_value("/v3/process").await
    }

    pub async fn get_process(&self, id: &str) -> ApiResult<Value> {
        self.get_value(&format!("/v3/process/{}", segment(id))).await
    }

    pub async fn create_process(&self, descriptor: &ProcessDescriptor) -> ApiResult<Value> {
        self.send_json(Method::POST, "/v3/process", descriptor).await
    }

    pub async fn update_process(&self, id: &str, descriptor: &ProcessDescriptor) -> ApiResult<Value> {
        self.send_json(Method::PUT, &format!("/v3/process/{}", segment(id)), descriptor)
            .await
    }

    pub async fn delete_process(&self, id: &str) -> ApiResult<Value> {
        self.delete_value(&format!("/v3/process/{}", segment(id))).await
    }

    pub async fn command(&self, id: &str, command: ProcessCommand) -> ApiResult<Value> {
        log::info!("Sending {} to process {id}", command.as_str());
        self.send_json(
            Method::PUT,
            &format!("/v3/process/{}/command", segment(id)),
            &serde_json::json!({ "command": command }),
        )
        .await
    }

    pub async fn process_state(&self, id: &str) -> ApiResult<Value> {
        self.get_value(&format!("/v3/process/{}/state", segment(id))).await
    }

    pub async fn process_report(&self, id: &str) -> ApiResult<Value> {
        self.get_value(&format!("/v3/process/{}/report", segment(id))).await
    }

    /// Probe of the process's input as seen by the Core
    pub async fn process_probe(&self, id: &str) -> ApiResult<Value> {
        self.get_value(&format!("/v3/process/{}/probe", segment(id))).await
    }

    pub async fn process_config(&self, id: &str) -> ApiResult<Value> {
        self.get_value(&format!("/v3/process/{}/config", segment(id))).await
    }

    pub async fn process_metadata(&self, id: &str) -> ApiResult<Value> {
        self.get_value(&format!("/v3/process/{}/metadata", segment(id))).await
    }

    pub async fn update_process_metadata(&self, id: &str, metadata: &Value) -> ApiResult<Value> {
        self.send_json(
            Method::PUT,
            &format!("/v3/process/{}/metadata", segment(id)),
            metadata,
        )
        .await
    }

    pub async fn process_log(&self, id: &str) -> ApiResult<Value> {
        self.get_value(&format!("/v3/process/{}/log", segment(id))).await
    }
}
