// ProcessDescriptor Model
// Process document submitted to the Core's /v3/process endpoint

use serde::{Deserialize, Serialize};

/// One input or output of a process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessIo {
    pub id: String,
    pub address: String,
    #[serde(default)]
    pub options: Vec<String>,
}

/// Descriptive metadata attached to a process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorMetadata {
    pub name: String,
    pub description: String,
    pub license: String,
    /// RFC 3339 creation time
    pub created_at: String,
}

/// Immutable transcode/restream job description.
///
/// Built once per submission; ownership passes to the Core on create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDescriptor {
    /// Slug derived from the stream name
    pub id: String,
    /// Original stream name
    pub reference: String,
    pub input: Vec<ProcessIo>,
    pub output: Vec<ProcessIo>,
    /// Global FFmpeg options
    pub options: Vec<String>,
    pub reconnect: bool,
    pub reconnect_delay_seconds: u32,
    pub autostart: bool,
    pub stale_timeout_seconds: u32,
    pub metadata: DescriptorMetadata,
}
