// Dashboard Service
// Independent polling of system info, processes, metrics and sessions

use crate::models::{MetricsHistory, MetricsSample, ProcessSummary};
use crate::services::api_client::{ApiError, ApiResult, CoreClient};
use crate::services::process_filter::ProcessCounts;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Latest known data per category.
///
/// Each slot is replaced by whichever poll of that category finishes last;
/// a failed poll leaves the previous value in place.
pub struct DashboardState {
    system_info: RwLock<Option<Value>>,
    processes: RwLock<Option<Vec<ProcessSummary>>>,
    metrics: RwLock<MetricsHistory>,
    session_summary: RwLock<Option<Value>>,
}

/// Point-in-time copy of the dashboard for rendering
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub system_info: Option<Value>,
    pub processes: Vec<ProcessSummary>,
    pub counts: ProcessCounts,
    pub latest_metrics: Option<MetricsSample>,
    pub metrics_samples: usize,
    pub session_summary: Option<Value>,
}

impl DashboardState {
    pub fn new(history_length: usize) -> Self {
        Self {
            system_info: RwLock::new(None),
            processes: RwLock::new(None),
            metrics: RwLock::new(MetricsHistory::new(history_length)),
            session_summary: RwLock::new(None),
        }
    }

    pub async fn store_system_info(&self, info: Value) {
        *self.system_info.write().await = Some(info);
    }

    pub async fn store_processes(&self, processes: Vec<ProcessSummary>) {
        *self.processes.write().await = Some(processes);
    }

    pub async fn store_metrics(&self, timestamp: i64, metrics: Value) {
        self.metrics.write().await.push(timestamp, metrics);
    }

    pub async fn store_session_summary(&self, summary: Value) {
        *self.session_summary.write().await = Some(summary);
    }

    pub async fn refresh_system_info(&self, client: &CoreClient) -> ApiResult<()> {
        let info = client.info().await?;
        self.store_system_info(info).await;
        Ok(())
    }

    pub async fn refresh_processes(&self, client: &CoreClient) -> ApiResult<()> {
        let processes = client.list_processes().await?;
        self.store_processes(processes).await;
        Ok(())
    }

    pub async fn refresh_metrics(&self, client: &CoreClient) -> ApiResult<()> {
        let metrics = client.metrics().await?;
        self.store_metrics(chrono::Utc::now().timestamp_millis(), metrics).await;
        Ok(())
    }

    pub async fn refresh_session_summary(&self, client: &CoreClient) -> ApiResult<()> {
        let summary = client.session_summary().await?;
        self.store_session_summary(summary).await;
        Ok(())
    }

    /// Refresh every category concurrently; returns the failures by category
    pub async fn refresh_all(&self, client: &CoreClient) -> Vec<(&'static str, ApiError)> {
        let (info, processes, metrics, sessions) = tokio::join!(
            self.refresh_system_info(client),
            self.refresh_processes(client),
            self.refresh_metrics(client),
            self.refresh_session_summary(client),
        );

        [
            ("system", info),
            ("processes", processes),
            ("metrics", metrics),
            ("sessions", sessions),
        ]
        .into_iter()
        .filter_map(|(category, result)| result.err().map(|e| (category, e)))
        .collect()
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        let processes = self.processes.read().await.clone().unwrap_or_default();
        let metrics = self.metrics.read().await;

        DashboardSnapshot {
            system_info: self.system_info.read().await.clone(),
            counts: ProcessCounts::from_processes(&processes),
            processes,
            latest_metrics: metrics.latest().cloned(),
            metrics_samples: metrics.len(),
            session_summary: self.session_summary.read().await.clone(),
        }
    }

    pub async fn metrics_history(&self) -> Vec<MetricsSample> {
        self.metrics.read().await.samples().cloned().collect()
    }
}

/// Runs one polling task per dashboard category
pub struct DashboardPoller {
    running: Arc<AtomicBool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl DashboardPoller {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Check if polling is active
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Start the polling loops. A 401 on any of them stops all loops.
    pub async fn start(&self, client: CoreClient, state: Arc<DashboardState>, period: Duration) {
        if self.running.swap(true, Ordering::Relaxed) {
            log::debug!("DashboardPoller already running");
            return;
        }

        log::info!("Dashboard polling every {}s", period.as_secs_f32());

        let mut tasks = self.tasks.lock().await;
        tasks.clear();

        macro_rules! poll {
            ($poller:expr, $client:expr, $state:expr, $category:expr, $refresh:ident) => {{
                let client = $client.clone();
                let state = $state.clone();
                $poller.spawn_loop($category, period, move || {
                    let client = client.clone();
                    let state = state.clone();
                    async move { state.$refresh(&client).await }
                })
            }};
        }

        tasks.push(poll!(self, client, state, "system", refresh_system_info));
        tasks.push(poll!(self, client, state, "processes", refresh_processes));
        tasks.push(poll!(self, client, state, "metrics", refresh_metrics));
        tasks.push(poll!(self, client, state, "sessions", refresh_session_summary));
    }

    fn spawn_loop<F, Fut>(&self, category: &'static str, period: Duration, mut poll: F) -> JoinHandle<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ApiResult<()>> + Send + 'static,
    {
        let running = self.running.clone();

        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            while running.load(Ordering::Relaxed) {
                ticker.tick().await;
                if !running.load(Ordering::Relaxed) {
                    break;
                }

                match poll().await {
                    Ok(()) => {}
                    Err(ApiError::Unauthorized) => {
                        log::warn!("Session expired while polling {category}; stopping dashboard");
                        running.store(false, Ordering::Relaxed);
                    }
                    Err(e) => log::warn!("Polling {category} failed: {e}"),
                }
            }

            log::debug!("Dashboard {category} poller stopped");
        })
    }

    /// Stop the polling loops; in-flight requests finish and are discarded
    /// at the next tick
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Stop and wait for every loop to exit
    pub async fn shutdown(&self) {
        self.stop();
        let tasks = std::mem::take(&mut *self.tasks.lock().await);
        for task in tasks {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Default for DashboardPoller {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_slots_are_last_writer_wins() {
        let state = DashboardState::new(2);

        state.store_system_info(json!({"version": "16.0"})).await;
        state.store_system_info(json!({"version": "16.1"})).await;
        state.store_metrics(1, json!({"cpu": 1})).await;
        state.store_metrics(2, json!({"cpu": 2})).await;
        state.store_metrics(3, json!({"cpu": 3})).await;

        let snapshot = state.snapshot().await;
        assert_eq!(snapshot.system_info, Some(json!({"version": "16.1"})));
        assert_eq!(snapshot.metrics_samples, 2);
        assert_eq!(snapshot.latest_metrics.map(|s| s.timestamp), Some(3));
        assert!(snapshot.session_summary.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_counts_processes() {
        let state = DashboardState::new(10);
        let processes: Vec<ProcessSummary> = serde_json::from_value(json!([
            {"id": "a", "state": {"exec": "running"}},
            {"id": "b", "state": {"exec": "failed"}},
            {"id": "c"}
        ]))
        .unwrap();
        state.store_processes(processes).await;

        let snapshot = state.snapshot().await;
        assert_eq!(snapshot.counts, ProcessCounts { total: 3, running: 1, failed: 1 });
    }

    #[tokio::test]
    async fn test_poller_stop_is_idempotent() {
        let poller = DashboardPoller::new();
        assert!(!poller.is_running());
        poller.stop();
        poller.shutdown().await;
        assert!(!poller.is_running());
    }
}
