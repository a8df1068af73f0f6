// Process Model
// Views of processes as reported by the Core

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle command accepted by `PUT /v3/process/:id/command`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessCommand {
    Start,
    Stop,
    Restart,
    Reload,
}

impl ProcessCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessCommand::Start => "start",
            ProcessCommand::Stop => "stop",
            ProcessCommand::Restart => "restart",
            ProcessCommand::Reload => "reload",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessProgress {
    #[serde(default)]
    pub cpu: Option<f64>,
    #[serde(default)]
    pub memory_bytes: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessState {
    /// Execution state, e.g. "running", "finished", "failed"
    #[serde(default)]
    pub exec: Option<String>,
    #[serde(default)]
    pub progress: Option<ProcessProgress>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Lenient process summary; every field the client does not read is kept in `extra`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessSummary {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub metadata: Option<ProcessMetadata>,
    #[serde(default)]
    pub state: Option<ProcessState>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProcessSummary {
    pub fn display_name(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.name.as_deref())
    }

    pub fn exec_state(&self) -> Option<&str> {
        self.state.as_ref().and_then(|s| s.exec.as_deref())
    }

    pub fn cpu(&self) -> f64 {
        self.progress().and_then(|p| p.cpu).unwrap_or(0.0)
    }

    pub fn memory_bytes(&self) -> u64 {
        self.progress().and_then(|p| p.memory_bytes).unwrap_or(0)
    }

    fn progress(&self) -> Option<&ProcessProgress> {
        self.state.as_ref().and_then(|s| s.progress.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_keeps_unknown_fields() {
        let json = r#"{
            "id": "evening_show",
            "type": "ffmpeg",
            "state": {"exec": "running", "progress": {"cpu": 12.5, "memory_bytes": 2048, "fps": 25}},
            "metadata": {"name": "Evening Show", "license": "CC BY 4.0"}
        }"#;
        let summary: ProcessSummary = serde_json::from_str(json).unwrap();

        assert_eq!(summary.exec_state(), Some("running"));
        assert_eq!(summary.cpu(), 12.5);
        assert_eq!(summary.memory_bytes(), 2048);
        assert_eq!(summary.display_name(), Some("Evening Show"));
        assert_eq!(summary.extra.get("type"), Some(&Value::from("ffmpeg")));

        let round = serde_json::to_value(&summary).unwrap();
        assert_eq!(round["state"]["progress"]["fps"], 25);
    }

    #[test]
    fn test_missing_state_defaults() {
        let summary: ProcessSummary = serde_json::from_str(r#"{"id":"a"}"#).unwrap();
        assert_eq!(summary.exec_state(), None);
        assert_eq!(summary.cpu(), 0.0);
    }
}
