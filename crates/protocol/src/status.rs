use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Parses a backend status string. Matching ignores case; anything the
    /// backend invents beyond the four known values is treated as still running.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" | "queued" => Self::Pending,
            "running" | "in_progress" | "in-progress" => Self::Running,
            "completed" | "complete" | "succeeded" => Self::Completed,
            "failed" | "error" => Self::Failed,
            other => {
                log::debug!("unrecognised task status {other:?}; treating as running");
                Self::Running
            }
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Result of one status lookup. `raw` is the untouched response body.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct TaskStatusReport {
    pub status: TaskStatus,
    pub raw: serde_json::Value,
}

impl TaskStatusReport {
    #[must_use]
    pub const fn new(status: TaskStatus, raw: serde_json::Value) -> Self {
        Self { status, raw }
    }

    /// Builds a report from a status response body carrying a `status` field.
    pub fn from_body(raw: serde_json::Value) -> Option<Self> {
        let status = raw.get("status")?.as_str().map(TaskStatus::parse)?;
        Some(Self { status, raw })
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(TaskStatus::parse("Completed"), TaskStatus::Completed);
        assert_eq!(TaskStatus::parse("FAILED"), TaskStatus::Failed);
        assert_eq!(TaskStatus::parse(" pending "), TaskStatus::Pending);
    }

    #[test]
    fn unknown_status_is_not_terminal() {
        let status = TaskStatus::parse("Indexing");
        assert_eq!(status, TaskStatus::Running);
        assert!(!status.is_terminal());
    }

    #[test]
    fn report_from_body_keeps_raw_payload() {
        let body = json!({ "status": "Completed", "progress": 100 });
        let report = TaskStatusReport::from_body(body.clone()).expect("report");
        assert_eq!(report.status, TaskStatus::Completed);
        assert_eq!(report.raw, body);
        assert!(report.is_terminal());
    }

    #[test]
    fn report_from_body_requires_status_string() {
        assert!(TaskStatusReport::from_body(json!({ "progress": 3 })).is_none());
        assert!(TaskStatusReport::from_body(json!({ "status": 3 })).is_none());
    }

    #[test]
    fn status_deserializes_leniently() {
        let status: TaskStatus = serde_json::from_value(json!("running")).expect("status");
        assert_eq!(status, TaskStatus::Running);
    }
}
