// Process Filter
// Client-side search, status filtering and sorting of the process list

use crate::models::ProcessSummary;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Running,
    /// `finished` or `stopped`; a process without state counts as stopped
    Stopped,
    /// `failed` or `error`
    Error,
}

impl StatusFilter {
    pub fn matches(&self, process: &ProcessSummary) -> bool {
        let state = process.exec_state().filter(|s| !s.is_empty()).unwrap_or("stopped");
        match self {
            StatusFilter::All => true,
            StatusFilter::Running => state == "running",
            StatusFilter::Stopped => state == "finished" || state == "stopped",
            StatusFilter::Error => state == "failed" || state == "error",
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "running" => Ok(StatusFilter::Running),
            "stopped" => Ok(StatusFilter::Stopped),
            "error" => Ok(StatusFilter::Error),
            other => Err(format!("unknown status filter '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Name,
    Status,
    Cpu,
    Memory,
    /// Keep the order the Core returned
    Created,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(SortBy::Name),
            "status" => Ok(SortBy::Status),
            "cpu" => Ok(SortBy::Cpu),
            "memory" => Ok(SortBy::Memory),
            "created" => Ok(SortBy::Created),
            other => Err(format!("unknown sort key '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessFilter {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub order: SortOrder,
}

impl ProcessFilter {
    /// Case-insensitive substring match on id, reference or display name
    pub fn matches_search(&self, process: &ProcessSummary) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        [
            process.id.as_deref(),
            process.reference.as_deref(),
            process.display_name(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Filter then sort; the sort is stable so ties keep their input order
    pub fn apply(&self, processes: &[ProcessSummary]) -> Vec<ProcessSummary> {
        let mut filtered: Vec<ProcessSummary> = processes
            .iter()
            .filter(|p| self.matches_search(p) && self.status.matches(p))
            .cloned()
            .collect();

        if self.sort_by == SortBy::Created {
            return filtered;
        }

        filtered.sort_by(|a, b| {
            let ordering = self.compare(a, b);
            match self.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        filtered
    }

    fn compare(&self, a: &ProcessSummary, b: &ProcessSummary) -> Ordering {
        match self.sort_by {
            SortBy::Name => compare_text(sort_name(a), sort_name(b)),
            SortBy::Status => {
                compare_text(a.exec_state().unwrap_or(""), b.exec_state().unwrap_or(""))
            }
            SortBy::Cpu => a.cpu().total_cmp(&b.cpu()),
            SortBy::Memory => a.memory_bytes().cmp(&b.memory_bytes()),
            SortBy::Created => Ordering::Equal,
        }
    }
}

/// Display name, falling back to the id, then ""
fn sort_name(process: &ProcessSummary) -> &str {
    process
        .display_name()
        .filter(|n| !n.is_empty())
        .or(process.id.as_deref())
        .unwrap_or("")
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Counts shown on the dashboard cards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessCounts {
    pub total: usize,
    pub running: usize,
    pub failed: usize,
}

impl ProcessCounts {
    pub fn from_processes(processes: &[ProcessSummary]) -> Self {
        Self {
            total: processes.len(),
            running: processes.iter().filter(|p| p.exec_state() == Some("running")).count(),
            failed: processes.iter().filter(|p| p.exec_state() == Some("failed")).count(),
        }
    }
}
