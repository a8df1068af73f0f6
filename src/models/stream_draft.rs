// StreamDraft Model
// In-progress stream configuration collected by the setup wizard

use serde::{Deserialize, Serialize};
use crate::models::OutputTarget;

/// Codec sentinel meaning "forward the stream without transcoding"
pub const PASSTHROUGH_CODEC: &str = "copy";

fn default_codec() -> String {
    PASSTHROUGH_CODEC.to_string()
}

fn default_hls_segment_duration() -> u32 {
    2
}

fn default_auto_start() -> bool {
    true
}

fn default_reconnect() -> bool {
    true
}

fn default_reconnect_delay() -> u32 {
    10
}

/// Where the stream enters the Core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// Pull from an HTTP/HLS, RTSP or other network address
    #[default]
    Network,
    /// Publish into the Core's RTMP server
    Rtmp,
    /// Publish into the Core's SRT server
    Srt,
    /// Camera or capture card attached to the Core host
    Device,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Network => "network",
            InputType::Rtmp => "rtmp",
            InputType::Srt => "srt",
            InputType::Device => "device",
        }
    }
}

/// Creative Commons licences offered for published content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum License {
    #[default]
    #[serde(rename = "CC BY 4.0")]
    CcBy,
    #[serde(rename = "CC BY-SA 4.0")]
    CcBySa,
    #[serde(rename = "CC BY-NC 4.0")]
    CcByNc,
    #[serde(rename = "CC BY-NC-SA 4.0")]
    CcByNcSa,
    #[serde(rename = "CC BY-ND 4.0")]
    CcByNd,
    #[serde(rename = "CC BY-NC-ND 4.0")]
    CcByNcNd,
    #[serde(rename = "CC0 1.0")]
    Cc0,
}

impl License {
    pub const ALL: [License; 7] = [
        License::CcBy,
        License::CcBySa,
        License::CcByNc,
        License::CcByNcSa,
        License::CcByNd,
        License::CcByNcNd,
        License::Cc0,
    ];

    /// Identifier as stored in process metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            License::CcBy => "CC BY 4.0",
            License::CcBySa => "CC BY-SA 4.0",
            License::CcByNc => "CC BY-NC 4.0",
            License::CcByNcSa => "CC BY-NC-SA 4.0",
            License::CcByNd => "CC BY-ND 4.0",
            License::CcByNcNd => "CC BY-NC-ND 4.0",
            License::Cc0 => "CC0 1.0",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            License::CcBy => "Attribution",
            License::CcBySa => "Attribution-ShareAlike",
            License::CcByNc => "Attribution-NonCommercial",
            License::CcByNcSa => "Attribution-NonCommercial-ShareAlike",
            License::CcByNd => "Attribution-NoDerivatives",
            License::CcByNcNd => "Attribution-NonCommercial-NoDerivatives",
            License::Cc0 => "Public Domain",
        }
    }
}

/// Mutable, possibly invalid stream configuration.
///
/// Only the descriptor builder decides whether a draft is submittable; the
/// wizard edits it freely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamDraft {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub license: License,

    #[serde(default)]
    pub input_type: InputType,

    /// Required when `input_type` is `network`
    #[serde(default)]
    pub input_url: String,

    /// Device id from `/v3/device`, used for `device` inputs without a URL
    #[serde(default)]
    pub input_device: Option<String>,

    /// Destinations in the order they were added
    #[serde(default)]
    pub outputs: Vec<OutputTarget>,

    /// FFmpeg video codec, or "copy" for passthrough
    #[serde(default = "default_codec")]
    pub video_codec: String,

    /// FFmpeg audio codec, or "copy" for passthrough
    #[serde(default = "default_codec")]
    pub audio_codec: String,

    /// Video bitrate in kbps
    #[serde(default)]
    pub video_bitrate: Option<u32>,

    /// Audio bitrate in kbps
    #[serde(default)]
    pub audio_bitrate: Option<u32>,

    /// Output size as "WIDTHxHEIGHT"
    #[serde(default)]
    pub resolution: Option<String>,

    #[serde(default)]
    pub audio_channels: Option<u32>,

    #[serde(default)]
    pub framerate: Option<u32>,

    /// HLS segment length in seconds
    #[serde(default = "default_hls_segment_duration")]
    pub hls_segment_duration: u32,

    #[serde(default = "default_auto_start")]
    pub auto_start: bool,

    #[serde(default = "default_reconnect")]
    pub reconnect: bool,

    /// Seconds the Core waits before reconnecting
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay: u32,
}

impl Default for StreamDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            license: License::default(),
            input_type: InputType::default(),
            input_url: String::new(),
            input_device: None,
            outputs: Vec::new(),
            video_codec: default_codec(),
            audio_codec: default_codec(),
            video_bitrate: None,
            audio_bitrate: None,
            resolution: None,
            audio_channels: None,
            framerate: None,
            hls_segment_duration: default_hls_segment_duration(),
            auto_start: default_auto_start(),
            reconnect: default_reconnect(),
            reconnect_delay: default_reconnect_delay(),
        }
    }
}

impl StreamDraft {
    pub fn video_passthrough(&self) -> bool {
        self.video_codec.eq_ignore_ascii_case(PASSTHROUGH_CODEC)
    }

    pub fn audio_passthrough(&self) -> bool {
        self.audio_codec.eq_ignore_ascii_case(PASSTHROUGH_CODEC)
    }

    /// Key used for ingest stream names and HLS paths: lowercase, whitespace runs as "_"
    pub fn stream_key(&self) -> String {
        stream_key_for(&self.name)
    }
}

/// Lowercase a stream name and replace each whitespace run with "_"
pub fn stream_key_for(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                key.push('_');
            }
            in_whitespace = true;
        } else {
            key.push(c);
            in_whitespace = false;
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_wizard() {
        let draft = StreamDraft::default();
        assert_eq!(draft.license, License::CcBy);
        assert_eq!(draft.input_type, InputType::Network);
        assert!(draft.video_passthrough());
        assert!(draft.audio_passthrough());
        assert_eq!(draft.hls_segment_duration, 2);
        assert!(draft.auto_start);
        assert!(draft.reconnect);
        assert_eq!(draft.reconnect_delay, 10);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let draft: StreamDraft = serde_json::from_str(
            r#"{"name":"Evening Show","inputType":"rtmp","license":"CC0 1.0","audioBitrate":128}"#,
        )
        .unwrap();

        assert_eq!(draft.input_type, InputType::Rtmp);
        assert_eq!(draft.license, License::Cc0);
        assert_eq!(draft.audio_bitrate, Some(128));
        assert_eq!(draft.video_codec, "copy");
        assert_eq!(draft.reconnect_delay, 10);
    }

    #[test]
    fn test_stream_key() {
        assert_eq!(stream_key_for("My  Live Stream"), "my_live_stream");
        assert_eq!(stream_key_for(" Show "), "_show_");
    }
}
