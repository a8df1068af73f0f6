// Process Commands
// Listing, inspection and lifecycle control of Core processes

use super::{CommandResult, Context, Output};
use crate::models::{ProcessCommand, ProcessSummary};
use crate::services::ProcessFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessAction {
    Get,
    State,
    Report,
    Probe,
    Config,
    Metadata,
    Log,
    Delete,
    Command(ProcessCommand),
}

pub async fn list_processes(ctx: &Context, filter: &ProcessFilter, json: bool) -> CommandResult {
    let processes = ctx.client.list_processes().await?;
    let filtered = filter.apply(&processes);

    if json {
        let value = serde_json::to_value(&filtered)
            .map_err(|e| super::CommandError::Input(format!("Failed to render processes: {e}")))?;
        return Ok(Output::Json(value));
    }

    Ok(Output::Text(process_table(&filtered)))
}

pub async fn process_action(ctx: &Context, action: ProcessAction, id: &str) -> CommandResult {
    let client = &ctx.client;
    let value = match action {
        ProcessAction::Get => client.get_process(id).await?,
        ProcessAction::State => client.process_state(id).await?,
        ProcessAction::Report => client.process_report(id).await?,
        ProcessAction::Probe => client.process_probe(id).await?,
        ProcessAction::Config => client.process_config(id).await?,
        ProcessAction::Metadata => client.process_metadata(id).await?,
        ProcessAction::Log => client.process_log(id).await?,
        ProcessAction::Delete => {
            client.delete_process(id).await?;
            log::info!("Deleted process {id}");
            return Ok(Output::Text(format!("Deleted {id}")));
        }
        ProcessAction::Command(command) => {
            client.command(id, command).await?;
            return Ok(Output::Text(format!("Sent {} to {id}", command.as_str())));
        }
    };

    Ok(Output::Json(value))
}

/// Fixed-width table: id, name, state, cpu and memory
pub fn process_table(processes: &[ProcessSummary]) -> String {
    let mut lines = vec![format!(
        "{:<24} {:<28} {:<10} {:>7} {:>10}",
        "ID", "NAME", "STATE", "CPU%", "MEMORY"
    )];

    for process in processes {
        lines.push(format!(
            "{:<24} {:<28} {:<10} {:>7.1} {:>10}",
            truncate(process.id.as_deref().unwrap_or("-"), 24),
            truncate(process.display_name().unwrap_or("-"), 28),
            process.exec_state().unwrap_or("stopped"),
            process.cpu(),
            format_bytes(process.memory_bytes()),
        ));
    }

    if processes.is_empty() {
        lines.push("(no processes)".to_string());
    }

    lines.join("\n")
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut truncated: String = value.chars().take(width.saturating_sub(1)).collect();
    truncated.push('~');
    truncated
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
