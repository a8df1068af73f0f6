// OutputTarget Model
// Stream destination configuration

use serde::{Deserialize, Serialize};

/// Output protocol / muxer family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    /// HLS playlist written into a Core filesystem (web player)
    Hls,
    /// HLS written to disk storage, muxed the same way as `Hls`
    Disk,
    Rtmp,
    Srt,
    /// Any type this client does not know how to mux
    #[serde(other)]
    Unknown,
}

impl OutputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputType::Hls => "hls",
            OutputType::Disk => "disk",
            OutputType::Rtmp => "rtmp",
            OutputType::Srt => "srt",
            OutputType::Unknown => "unknown",
        }
    }

    /// Whether this type writes segments to a filesystem path rather than a URL
    pub fn is_file_based(&self) -> bool {
        matches!(self, OutputType::Hls | OutputType::Disk)
    }
}

/// Supported streaming platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Twitch,
    Facebook,
    #[default]
    Custom,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Youtube,
        Platform::Twitch,
        Platform::Facebook,
        Platform::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Twitch => "twitch",
            Platform::Facebook => "facebook",
            Platform::Custom => "custom",
        }
    }
}

/// A single destination the process writes to.
///
/// File-based types (`hls`, `disk`) use `path`; network types use `url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputTarget {
    #[serde(rename = "type")]
    pub output_type: OutputType,

    /// Platform for UI display and stream key redaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,

    /// Destination URL (rtmp, srt, custom servers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Filesystem path (hls, disk), e.g. "/memfs/my_stream"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl OutputTarget {
    /// HLS output writing into `path`
    pub fn hls(path: impl Into<String>) -> Self {
        Self {
            output_type: OutputType::Hls,
            platform: None,
            url: None,
            path: Some(path.into()),
        }
    }

    /// Network output (rtmp/srt) pushing to `url`
    pub fn network(output_type: OutputType, platform: Platform, url: impl Into<String>) -> Self {
        Self {
            output_type,
            platform: Some(platform),
            url: Some(url.into()),
            path: None,
        }
    }

    /// The meaningful address for this output's type, if set and non-empty
    pub fn address(&self) -> Option<&str> {
        let value = if self.output_type.is_file_based() {
            self.path.as_deref()
        } else {
            self.url.as_deref()
        };
        value.filter(|v| !v.trim().is_empty())
    }
}
