// Descriptor Builder
// Turns a StreamDraft into the FFmpeg argument list and the process document the Core accepts

use crate::models::{
    ClientSettings, DescriptorMetadata, InputType, OutputTarget, OutputType, ProcessDescriptor,
    ProcessIo, StreamDraft,
};
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Rolling window of segments kept in every HLS playlist
pub const HLS_LIST_SIZE: u32 = 6;
/// Seconds without progress before the Core considers a process stale
pub const STALE_TIMEOUT_SECONDS: u32 = 30;

const INPUT_OPTIONS: [&str; 2] = ["-err_detect", "ignore_err"];
const GLOBAL_OPTIONS: [&str; 2] = ["-loglevel", "level+info"];

static RESOLUTION_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

/// Why a draft cannot be submitted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("Stream name is required")]
    MissingName,
    #[error("Input URL is required for network inputs")]
    MissingInputUrl,
    #[error("A device must be selected for device inputs")]
    MissingInputDevice,
    #[error("Output {index} ({output_type}) has no destination")]
    MissingOutputAddress { index: usize, output_type: String },
    #[error("Output {index} has an unsupported type")]
    UnsupportedOutputType { index: usize },
    #[error("Invalid resolution '{0}', expected WIDTHxHEIGHT")]
    InvalidResolution(String),
    #[error("Invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Addresses the Core's own ingest servers are reachable under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderOptions {
    pub ingest_host: String,
    pub srt_port: u16,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        ClientSettings::default().into()
    }
}

impl From<&ClientSettings> for BuilderOptions {
    fn from(settings: &ClientSettings) -> Self {
        Self {
            ingest_host: settings.ingest_host.clone(),
            srt_port: settings.srt_port,
        }
    }
}

impl From<ClientSettings> for BuilderOptions {
    fn from(settings: ClientSettings) -> Self {
        (&settings).into()
    }
}

/// Process id for a stream name: lowercase, each run of characters outside
/// `[a-z0-9]` collapsed into a single "_"
pub fn process_id(name: &str) -> String {
    let mut id = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            id.push(c);
            in_run = false;
        } else if !in_run {
            id.push('_');
            in_run = true;
        }
    }
    id
}

/// Check everything the builder relies on; nothing is produced for an invalid draft
pub fn validate_draft(draft: &StreamDraft, opts: &BuilderOptions) -> Result<(), BuildError> {
    if draft.name.trim().is_empty() {
        return Err(BuildError::MissingName);
    }

    input_address(draft, opts)?;

    for (index, output) in draft.outputs.iter().enumerate() {
        if output.output_type == OutputType::Unknown {
            return Err(BuildError::UnsupportedOutputType { index });
        }
        if output.address().is_none() {
            return Err(BuildError::MissingOutputAddress {
                index,
                output_type: output.output_type.as_str().to_string(),
            });
        }
    }

    check_positive("videoBitrate", draft.video_bitrate)?;
    check_positive("audioBitrate", draft.audio_bitrate)?;
    check_positive("audioChannels", draft.audio_channels)?;
    check_positive("framerate", draft.framerate)?;
    check_positive("hlsSegmentDuration", Some(draft.hls_segment_duration))?;

    if let Some(resolution) = resolution(draft) {
        if !is_valid_resolution(resolution) {
            return Err(BuildError::InvalidResolution(resolution.to_string()));
        }
    }

    Ok(())
}

/// Assemble the FFmpeg argument list.
///
/// Order is fixed: error tolerance flags, input demuxer (rtmp only), input,
/// video, audio, then one block per output in the order they were added.
pub fn build_args(draft: &StreamDraft, opts: &BuilderOptions) -> Result<Vec<String>, BuildError> {
    validate_draft(draft, opts)?;
    warn_if_no_outputs(draft);

    let mut args = Vec::new();

    args.push("-err_detect".to_string()); args.push("ignore_err".to_string());
    args.push("-fflags".to_string()); args.push("+genpts+discardcorrupt".to_string());

    if draft.input_type == InputType::Rtmp {
        args.push("-f".to_string()); args.push("live_flv".to_string());
    }

    args.push("-i".to_string());
    args.push(input_address(draft, opts)?);

    // Video
    if draft.video_passthrough() {
        args.push("-c:v".to_string()); args.push("copy".to_string());
    } else {
        args.push("-c:v".to_string()); args.push(draft.video_codec.clone());
        if let Some(bitrate) = draft.video_bitrate {
            args.push("-b:v".to_string()); args.push(format!("{bitrate}k"));
        }
        if let Some(resolution) = resolution(draft) {
            args.push("-s".to_string()); args.push(resolution.to_string());
        }
        if let Some(framerate) = draft.framerate {
            args.push("-r".to_string()); args.push(framerate.to_string());
        }
    }

    // Audio
    if draft.audio_passthrough() {
        args.push("-c:a".to_string()); args.push("copy".to_string());
    } else {
        args.push("-c:a".to_string()); args.push(draft.audio_codec.clone());
        if let Some(bitrate) = draft.audio_bitrate {
            args.push("-b:a".to_string()); args.push(format!("{bitrate}k"));
        }
        if let Some(channels) = draft.audio_channels {
            args.push("-ac".to_string()); args.push(channels.to_string());
        }
    }

    for (index, output) in draft.outputs.iter().enumerate() {
        append_output_args(&mut args, index, output, draft.hls_segment_duration)?;
    }

    Ok(args)
}

/// Build the process document stamped with the current time
pub fn build_descriptor(
    draft: &StreamDraft,
    opts: &BuilderOptions,
) -> Result<ProcessDescriptor, BuildError> {
    build_descriptor_at(draft, opts, Utc::now())
}

/// Build the process document with an explicit creation time.
/// Identical drafts and timestamps always yield identical descriptors.
pub fn build_descriptor_at(
    draft: &StreamDraft,
    opts: &BuilderOptions,
    created_at: DateTime<Utc>,
) -> Result<ProcessDescriptor, BuildError> {
    validate_draft(draft, opts)?;
    warn_if_no_outputs(draft);

    let input = vec![ProcessIo {
        id: "input_0".to_string(),
        address: input_address(draft, opts)?,
        options: INPUT_OPTIONS.iter().map(|s| s.to_string()).collect(),
    }];

    let output = draft
        .outputs
        .iter()
        .enumerate()
        .map(|(index, target)| ProcessIo {
            id: format!("output_{index}"),
            address: target.address().unwrap_or_default().to_string(),
            options: Vec::new(),
        })
        .collect();

    Ok(ProcessDescriptor {
        id: process_id(&draft.name),
        reference: draft.name.clone(),
        input,
        output,
        options: GLOBAL_OPTIONS.iter().map(|s| s.to_string()).collect(),
        reconnect: draft.reconnect,
        reconnect_delay_seconds: draft.reconnect_delay,
        autostart: draft.auto_start,
        stale_timeout_seconds: STALE_TIMEOUT_SECONDS,
        metadata: DescriptorMetadata {
            name: draft.name.clone(),
            description: draft.description.clone(),
            license: draft.license.as_str().to_string(),
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        },
    })
}

/// Address FFmpeg reads from.
///
/// RTMP/SRT drafts without a URL publish into the Core's own ingest servers.
pub fn input_address(draft: &StreamDraft, opts: &BuilderOptions) -> Result<String, BuildError> {
    let url = draft.input_url.trim();

    match draft.input_type {
        InputType::Network => {
            if url.is_empty() {
                return Err(BuildError::MissingInputUrl);
            }
            Ok(url.to_string())
        }
        InputType::Rtmp if url.is_empty() => {
            Ok(format!("rtmp://{}/live/{}", opts.ingest_host, draft.stream_key()))
        }
        InputType::Srt if url.is_empty() => Ok(format!(
            "srt://{}:{}?streamid={}",
            opts.ingest_host,
            opts.srt_port,
            draft.stream_key()
        )),
        InputType::Rtmp | InputType::Srt => Ok(url.to_string()),
        InputType::Device => {
            if !url.is_empty() {
                return Ok(url.to_string());
            }
            draft
                .input_device
                .as_deref()
                .map(str::trim)
                .filter(|device| !device.is_empty())
                .map(str::to_string)
                .ok_or(BuildError::MissingInputDevice)
        }
    }
}

fn append_output_args(
    args: &mut Vec<String>,
    index: usize,
    output: &OutputTarget,
    segment_duration: u32,
) -> Result<(), BuildError> {
    let address = output.address().ok_or_else(|| BuildError::MissingOutputAddress {
        index,
        output_type: output.output_type.as_str().to_string(),
    })?;

    match output.output_type {
        OutputType::Rtmp => {
            args.push("-f".to_string()); args.push("flv".to_string());
            args.push(address.to_string());
        }
        OutputType::Srt => {
            args.push("-f".to_string()); args.push("mpegts".to_string());
            args.push(address.to_string());
        }
        OutputType::Hls | OutputType::Disk => {
            let base = address.trim_end_matches('/');
            args.push("-f".to_string()); args.push("hls".to_string());
            args.push("-hls_time".to_string()); args.push(segment_duration.to_string());
            args.push("-hls_list_size".to_string()); args.push(HLS_LIST_SIZE.to_string());
            args.push("-hls_flags".to_string()); args.push("delete_segments+append_list".to_string());
            args.push("-hls_segment_filename".to_string()); args.push(format!("{base}/%05d.ts"));
            args.push(format!("{base}/index.m3u8"));
        }
        OutputType::Unknown => return Err(BuildError::UnsupportedOutputType { index }),
    }

    Ok(())
}

fn resolution(draft: &StreamDraft) -> Option<&str> {
    draft
        .resolution
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
}

fn is_valid_resolution(resolution: &str) -> bool {
    let pattern = RESOLUTION_PATTERN.get_or_init(|| Regex::new(r"^(\d+)x(\d+)$").ok());
    let Some(captures) = pattern.as_ref().and_then(|re| re.captures(resolution)) else {
        return false;
    };
    captures
        .iter()
        .skip(1)
        .flatten()
        .all(|dim| dim.as_str().parse::<u32>().map(|v| v > 0).unwrap_or(false))
}

fn check_positive(field: &'static str, value: Option<u32>) -> Result<(), BuildError> {
    match value {
        Some(0) => Err(BuildError::InvalidValue {
            field,
            reason: "must be a positive number".to_string(),
        }),
        _ => Ok(()),
    }
}

fn warn_if_no_outputs(draft: &StreamDraft) {
    if draft.outputs.is_empty() {
        log::warn!("Stream '{}' has no outputs configured", draft.name);
    }
}
