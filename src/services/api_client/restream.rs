use crate::models::{ProcessDescriptor, StreamDraft};
use crate::services::descriptor_builder::{build_args, build_descriptor, BuilderOptions};
use serde_json::Value;

use super::*;

/// Outcome of a wizard submission.
///
/// The descriptor's outputs carry no options: the Core receives addresses
/// only, and the per-output muxer and HLS flags from `build_args` are used
/// for logging and dry runs.
#[derive(Debug, Clone)]
pub struct RestreamResult {
    pub descriptor: ProcessDescriptor,
    pub response: Value,
}

impl CoreClient {
    /// Validate a draft, build its descriptor and submit it as a new process.
    /// Nothing is sent when validation fails.
    pub async fn create_restream(
        &self,
        draft: &StreamDraft,
        opts: &BuilderOptions,
    ) -> ApiResult<RestreamResult> {
        let args = build_args(draft, opts)?;
        let descriptor = build_descriptor(draft, opts)?;

        log::info!(
            "Creating process '{}' with ffmpeg {}",
            descriptor.id,
            self.registry.redact_args(&args).join(" ")
        );

        let response = self.create_process(&descriptor).await?;
        log::info!("Process '{}' created", descriptor.id);

        Ok(RestreamResult { descriptor, response })
    }
}
