use serde_json::Value;

use super::*;

/// Publishers currently connected to the Core's RTMP and SRT servers
impl CoreClient {
    pub async fn rtmp_channels(&self) -> ApiResult<Value> {
        self.get_value("/v3/rtmp").await
    }

    pub async fn rtmp_channel(&self, channel_id: &str) -> ApiResult<Value> {
        self.get_value(&format!("/v3/rtmp/{}", segment(channel_id))).await
    }

    pub async fn srt_channels(&self) -> ApiResult<Value> {
        self.get_value("/v3/srt").await
    }

    pub async fn srt_channel(&self, channel_id: &str) -> ApiResult<Value> {
        self.get_value(&format!("/v3/srt/{}", segment(channel_id))).await
    }
}
