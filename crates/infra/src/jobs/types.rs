//! Task and execution-log types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use bizsense_core::{DomainError, DomainResult, TaskId, TaskLogId};

/// Result map produced by a task handler.
pub type JsonMap = Map<String, Value>;

/// Business area a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Sales,
    Inventory,
    Delivery,
    Finance,
    Marketing,
    Customer,
    Operations,
    Analytics,
}

/// Cadence a task recurs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFrequency {
    Daily,
    Weekly,
    Monthly,
    /// Only runs on explicit request; never auto-scheduled.
    Manual,
}

/// Status of a task's most recent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

/// A named recurring analytical job.
///
/// The scheduler reads tasks and reports how they should change; storing the
/// updated task is the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiTask {
    pub id: TaskId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: TaskCategory,
    pub frequency: TaskFrequency,
    #[serde(default = "enabled_by_default")]
    pub is_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

fn enabled_by_default() -> bool {
    true
}

impl AiTask {
    /// Create an enabled, never-run task.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: TaskCategory,
        frequency: TaskFrequency,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("task name must not be empty"));
        }
        Ok(Self {
            id: TaskId::new(),
            name,
            description: description.into(),
            category,
            frequency,
            is_enabled: true,
            last_run: None,
            next_run: None,
            status: TaskStatus::Pending,
            config: None,
        })
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.is_enabled = false;
        self
    }
}

/// Terminal status recorded in a [`TaskLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskLogStatus {
    Completed,
    Failed,
}

impl From<TaskLogStatus> for TaskStatus {
    fn from(value: TaskLogStatus) -> Self {
        match value {
            TaskLogStatus::Completed => TaskStatus::Completed,
            TaskLogStatus::Failed => TaskStatus::Failed,
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// The registered handler ran and returned its result map.
    Completed { data: JsonMap },
    /// No handler is registered for the task name. Reported as success.
    NoExecutor { message: String },
}

impl TaskOutcome {
    pub fn no_executor(task_name: &str) -> Self {
        Self::NoExecutor {
            message: format!("No executor defined for task: {task_name}"),
        }
    }
}

/// Record of one execution attempt.
///
/// Built only through [`TaskLog::completed`] and [`TaskLog::failed`], so
/// exactly one of `result`/`error` is set and it matches `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskLog {
    pub id: TaskLogId,
    pub task_id: TaskId,
    /// Copied at execution time so later renames don't rewrite history.
    pub task_name: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub status: TaskLogStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskLog {
    pub fn completed(
        task: &AiTask,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        outcome: TaskOutcome,
    ) -> Self {
        Self {
            id: TaskLogId::new(),
            task_id: task.id,
            task_name: task.name.clone(),
            started_at,
            completed_at: completed_at.max(started_at),
            status: TaskLogStatus::Completed,
            result: Some(outcome),
            error: None,
        }
    }

    pub fn failed(
        task: &AiTask,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            id: TaskLogId::new(),
            task_id: task.id,
            task_name: task.name.clone(),
            started_at,
            completed_at: completed_at.max(started_at),
            status: TaskLogStatus::Failed,
            result: None,
            error: Some(error.into()),
        }
    }

    pub fn duration_ms(&self) -> u64 {
        (self.completed_at - self.started_at).num_milliseconds().max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn task() -> AiTask {
        AiTask::new(
            "Daily Sales Summary",
            "Aggregate yesterday's orders",
            TaskCategory::Sales,
            TaskFrequency::Daily,
        )
        .unwrap()
    }

    #[test]
    fn new_task_is_enabled_and_pending() {
        let t = task();
        assert!(t.is_enabled);
        assert_eq!(t.status, TaskStatus::Pending);
        assert!(t.last_run.is_none() && t.next_run.is_none());
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = AiTask::new("  ", "", TaskCategory::Sales, TaskFrequency::Daily).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn completed_log_has_result_only() {
        let t = task();
        let now = Utc::now();
        let log = TaskLog::completed(&t, now, now, TaskOutcome::no_executor(&t.name));

        assert_eq!(log.status, TaskLogStatus::Completed);
        assert!(log.error.is_none());
        assert_eq!(
            log.result,
            Some(TaskOutcome::NoExecutor {
                message: "No executor defined for task: Daily Sales Summary".to_string()
            })
        );
    }

    #[test]
    fn failed_log_has_error_only_and_never_ends_before_start() {
        let t = task();
        let start = Utc::now();
        let log = TaskLog::failed(&t, start, start - Duration::seconds(5), "boom");

        assert_eq!(log.status, TaskLogStatus::Failed);
        assert!(log.result.is_none());
        assert_eq!(log.error.as_deref(), Some("boom"));
        assert!(log.completed_at >= log.started_at);
        assert_eq!(log.duration_ms(), 0);
    }

    #[test]
    fn task_deserializes_from_camel_case_record() {
        let id = TaskId::new();
        let t: AiTask = serde_json::from_value(json!({
            "id": id.to_string(),
            "name": "Inventory Level Check",
            "category": "inventory",
            "frequency": "daily",
            "isEnabled": false,
            "status": "failed",
            "lastRun": "2024-06-01T06:00:00Z"
        }))
        .unwrap();

        assert_eq!(t.id, id);
        assert!(!t.is_enabled);
        assert_eq!(t.status, TaskStatus::Failed);
        assert!(t.last_run.is_some());
        assert!(t.next_run.is_none());
    }

    #[test]
    fn outcome_serializes_with_kind_tag() {
        let mut data = JsonMap::new();
        data.insert("orders".to_string(), json!(3));
        let value = serde_json::to_value(TaskOutcome::Completed { data }).unwrap();
        assert_eq!(value, json!({"kind": "completed", "data": {"orders": 3}}));
    }
}
