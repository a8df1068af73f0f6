// MetricsHistory Model
// Bounded rolling window of metrics snapshots for the dashboard

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;

/// One metrics snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSample {
    /// Unix time in milliseconds when the snapshot was stored
    pub timestamp: i64,
    pub metrics: Value,
}

/// Rolling history; appending beyond capacity drops the oldest sample
#[derive(Debug, Clone)]
pub struct MetricsHistory {
    samples: VecDeque<MetricsSample>,
    capacity: usize,
}

impl MetricsHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, timestamp: i64, metrics: Value) {
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(MetricsSample { timestamp, metrics });
    }

    pub fn latest(&self) -> Option<&MetricsSample> {
        self.samples.back()
    }

    pub fn samples(&self) -> impl Iterator<Item = &MetricsSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for MetricsHistory {
    fn default() -> Self {
        Self::new(60)
    }
}
