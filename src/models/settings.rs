// Settings Model
// Client-wide configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_base_url() -> String {
    "http://127.0.0.1:8080/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_login_route() -> String {
    "/login".to_string()
}

fn default_ingest_host() -> String {
    "localhost".to_string()
}

fn default_srt_port() -> u16 {
    6000
}

fn default_log_retention_days() -> u32 {
    30
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_metrics_history_length() -> usize {
    60
}

/// Client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSettings {
    // Remote Core
    /// REST base including the `/api` prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Applied uniformly to every request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Where the session listener sends the user after a 401
    #[serde(default = "default_login_route")]
    pub login_route: String,

    // Ingest addresses shown for rtmp/srt inputs
    #[serde(default = "default_ingest_host")]
    pub ingest_host: String,
    #[serde(default = "default_srt_port")]
    pub srt_port: u16,

    // Log retention
    #[serde(default = "default_log_retention_days")]
    pub log_retention_days: u32,

    // Dashboard polling
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_metrics_history_length")]
    pub metrics_history_length: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            login_route: default_login_route(),
            ingest_host: default_ingest_host(),
            srt_port: default_srt_port(),
            log_retention_days: default_log_retention_days(),
            poll_interval_secs: default_poll_interval_secs(),
            metrics_history_length: default_metrics_history_length(),
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}
