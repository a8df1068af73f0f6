// Stream Commands
// Submitting stream drafts and listing the wizard catalogs

use super::{CommandError, CommandResult, Context, Output};
use crate::models::{Platform, StreamDraft};
use crate::services::{
    build_args, build_descriptor, licenses, ApiError, BuilderOptions, PlatformRegistry,
    CODEC_PRESETS, RESOLUTION_PRESETS,
};
use serde_json::json;
use std::path::Path;

/// Read a draft from a JSON file; missing fields take the wizard defaults
pub fn load_draft(path: &Path) -> Result<StreamDraft, CommandError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CommandError::Input(format!("Failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| CommandError::Input(format!("Invalid draft {}: {e}", path.display())))
}

/// Build and submit a draft. With `dry_run` nothing is sent; the redacted
/// arguments and the descriptor are shown instead.
pub async fn create_stream(ctx: &Context, draft_path: &Path, dry_run: bool) -> CommandResult {
    let draft = load_draft(draft_path)?;
    let opts = BuilderOptions::from(&ctx.settings);

    if dry_run {
        let args = build_args(&draft, &opts).map_err(ApiError::from)?;
        let descriptor = build_descriptor(&draft, &opts).map_err(ApiError::from)?;
        return Ok(Output::Json(json!({
            "args": ctx.client.registry().redact_args(&args),
            "descriptor": descriptor,
        })));
    }

    let result = ctx.client.create_restream(&draft, &opts).await?;
    Ok(Output::Json(json!({
        "id": result.descriptor.id,
        "response": result.response,
    })))
}

/// Platforms, codec and resolution presets, and licences
pub fn catalog(registry: &PlatformRegistry) -> CommandResult {
    let platforms: Vec<_> = Platform::ALL
        .iter()
        .filter_map(|platform| registry.get(platform))
        .map(|config| {
            json!({
                "name": config.name,
                "server": config.default_server,
                "requiresKey": config.requires_key,
                "protocols": config.protocols,
            })
        })
        .collect();

    let licences: Vec<_> = licenses()
        .map(|(name, description)| json!({ "name": name, "description": description }))
        .collect();

    Ok(Output::Json(json!({
        "platforms": platforms,
        "codecPresets": CODEC_PRESETS,
        "resolutions": RESOLUTION_PRESETS,
        "licenses": licences,
    })))
}
