// System Commands
// Core info, metrics, sessions, filesystems, channels, devices and logs

use super::{CommandError, CommandResult, Context, Output};
use crate::services::read_recent_logs;
use serde_json::{json, Value};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Rtmp,
    Srt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionView {
    All,
    Active,
    Summary,
}

pub async fn info(ctx: &Context) -> CommandResult {
    Ok(Output::Json(ctx.client.info().await?))
}

pub async fn metrics(ctx: &Context, prometheus: bool) -> CommandResult {
    if prometheus {
        return Ok(Output::Text(ctx.client.prometheus_metrics().await?));
    }
    Ok(Output::Json(ctx.client.metrics().await?))
}

pub async fn sessions(ctx: &Context, view: SessionView, collectors: &[String]) -> CommandResult {
    let value = match view {
        SessionView::All => ctx.client.sessions(collectors).await?,
        SessionView::Active => ctx.client.active_sessions(collectors).await?,
        SessionView::Summary => ctx.client.session_summary().await?,
    };
    Ok(Output::Json(value))
}

pub async fn channels(ctx: &Context, kind: ChannelKind, id: Option<&str>) -> CommandResult {
    let value = match (kind, id) {
        (ChannelKind::Rtmp, None) => ctx.client.rtmp_channels().await?,
        (ChannelKind::Rtmp, Some(id)) => ctx.client.rtmp_channel(id).await?,
        (ChannelKind::Srt, None) => ctx.client.srt_channels().await?,
        (ChannelKind::Srt, Some(id)) => ctx.client.srt_channel(id).await?,
    };
    Ok(Output::Json(value))
}

pub async fn devices(ctx: &Context) -> CommandResult {
    let devices = ctx.client.devices().await?;
    Ok(Output::Json(Value::Array(devices)))
}

pub async fn probe(ctx: &Context, url: &str, options: &[String]) -> CommandResult {
    Ok(Output::Json(ctx.client.probe(url, options).await?))
}

// Filesystems

pub async fn fs_list(ctx: &Context, name: Option<&str>, path: &str) -> CommandResult {
    let value = match name {
        Some(name) => ctx.client.list_files(name, path).await?,
        None => ctx.client.filesystems().await?,
    };
    Ok(Output::Json(value))
}

/// Download a file; writes to `out` when given, else prints it as text
pub async fn fs_get(ctx: &Context, name: &str, path: &str, out: Option<&Path>) -> CommandResult {
    let bytes = ctx.client.download_file(name, path).await?;

    match out {
        Some(out) => {
            std::fs::write(out, &bytes).map_err(|e| {
                CommandError::Input(format!("Failed to write {}: {e}", out.display()))
            })?;
            Ok(Output::Text(format!("Saved {} bytes to {}", bytes.len(), out.display())))
        }
        None => Ok(Output::Text(String::from_utf8_lossy(&bytes).into_owned())),
    }
}

pub async fn fs_put(ctx: &Context, name: &str, path: &str, file: &Path) -> CommandResult {
    let contents = std::fs::read(file)
        .map_err(|e| CommandError::Input(format!("Failed to read {}: {e}", file.display())))?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    Ok(Output::Json(
        ctx.client.upload_file(name, path, &file_name, contents).await?,
    ))
}

pub async fn fs_rm(ctx: &Context, name: &str, path: &str) -> CommandResult {
    ctx.client.delete_file(name, path).await?;
    Ok(Output::Text(format!("Deleted {name}:{path}")))
}

pub async fn fs_info(ctx: &Context, name: &str, path: &str) -> CommandResult {
    let info = ctx.client.file_info(name, path).await?;
    Ok(Output::Json(json!(info)))
}

// Widgets

pub async fn widget_list(ctx: &Context) -> CommandResult {
    Ok(Output::Json(ctx.client.widgets().await?))
}

pub async fn widget_get(ctx: &Context, process_id: &str) -> CommandResult {
    Ok(Output::Json(ctx.client.widget(process_id).await?))
}

pub async fn widget_delete(ctx: &Context, process_id: &str) -> CommandResult {
    ctx.client.delete_widget(process_id).await?;
    Ok(Output::Text(format!("Deleted widget for {process_id}")))
}

// Metadata

pub async fn metadata_list(ctx: &Context) -> CommandResult {
    Ok(Output::Json(ctx.client.metadata_list().await?))
}

pub async fn metadata_get(ctx: &Context, key: &str) -> CommandResult {
    Ok(Output::Json(ctx.client.metadata_get(key).await?))
}

/// Store `data` under `key`; `data` is parsed as JSON, falling back to a plain string
pub async fn metadata_set(ctx: &Context, key: &str, data: &str) -> CommandResult {
    let value = parse_value(data);
    Ok(Output::Json(ctx.client.metadata_set(key, &value).await?))
}

pub async fn metadata_delete(ctx: &Context, key: &str) -> CommandResult {
    ctx.client.metadata_delete(key).await?;
    Ok(Output::Text(format!("Deleted metadata {key}")))
}

/// Tail of this client's own log file
pub fn logs(log_dir: &Path, lines: usize) -> CommandResult {
    let lines = read_recent_logs(log_dir, lines).map_err(CommandError::Input)?;
    Ok(Output::Text(lines.join("\n")))
}

fn parse_value(data: &str) -> Value {
    serde_json::from_str(data).unwrap_or_else(|_| Value::String(data.to_string()))
}
