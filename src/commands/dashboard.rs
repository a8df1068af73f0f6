// Dashboard Command
// Live overview of the Core until interrupted

use super::process::format_bytes;
use super::{CommandResult, Context, Output};
use crate::services::{DashboardPoller, DashboardSnapshot, DashboardState};
use std::sync::Arc;
use tokio::time::interval;

/// Poll the Core and print a summary each interval. With `once`, refresh
/// every category a single time and return the summary.
pub async fn watch(ctx: &Context, once: bool) -> CommandResult {
    let state = Arc::new(DashboardState::new(ctx.settings.metrics_history_length));

    if once {
        for (category, e) in state.refresh_all(&ctx.client).await {
            log::warn!("Refreshing {category} failed: {e}");
        }
        return Ok(Output::Text(render_snapshot(&state.snapshot().await)));
    }

    let period = ctx.settings.poll_interval();
    let poller = DashboardPoller::new();
    poller.start(ctx.client.clone(), state.clone(), period).await;

    let mut ticker = interval(period);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !poller.is_running() {
                    break;
                }
                println!("{}\n", render_snapshot(&state.snapshot().await));
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("Dashboard interrupted");
                break;
            }
        }
    }

    poller.shutdown().await;
    Ok(Output::None)
}

pub fn render_snapshot(snapshot: &DashboardSnapshot) -> String {
    let mut lines = Vec::new();

    let version = snapshot
        .system_info
        .as_ref()
        .and_then(|info| info.get("version"))
        .and_then(|v| v.get("number").or(Some(v)))
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");
    lines.push(format!("Core {version}"));

    lines.push(format!(
        "Processes: {} total, {} running, {} failed",
        snapshot.counts.total, snapshot.counts.running, snapshot.counts.failed
    ));

    let (cpu, memory) = snapshot.processes.iter().fold((0.0, 0u64), |(cpu, mem), p| {
        (cpu + p.cpu(), mem + p.memory_bytes())
    });
    lines.push(format!("Load: {cpu:.1}% CPU, {} memory", format_bytes(memory)));

    lines.push(format!("Metrics samples: {}", snapshot.metrics_samples));

    if let Some(summary) = &snapshot.session_summary {
        lines.push(format!("Sessions: {summary}"));
    }

    lines.join("\n")
}
