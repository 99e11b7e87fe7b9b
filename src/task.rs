use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Task status lifecycle: todo -> in-progress -> done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// The next status in the lifecycle, or `None` when the task is done.
    pub fn next(self) -> Option<TaskStatus> {
        match self {
            TaskStatus::Todo => Some(TaskStatus::InProgress),
            TaskStatus::InProgress => Some(TaskStatus::Done),
            TaskStatus::Done => None,
        }
    }

    /// Wire/display name, matching the server's serialization.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Normal,
    High,
}

/// A task as returned by the server. Only `id`, `description` and `status`
/// are guaranteed; everything else depends on how the task was created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Task {
    /// True when the due date parses as `YYYY-MM-DD` and is before today.
    pub fn is_overdue(&self) -> bool {
        let Some(due) = self.due_date.as_deref() else {
            return false;
        };
        match NaiveDate::parse_from_str(due, "%Y-%m-%d") {
            Ok(date) => date < Local::now().date_naive(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_advances_to_done_and_stops() {
        let mut status = TaskStatus::Todo;
        status = status.next().unwrap();
        assert_eq!(status, TaskStatus::InProgress);
        status = status.next().unwrap();
        assert_eq!(status, TaskStatus::Done);
        assert_eq!(status.next(), None);
    }

    #[test]
    fn status_wire_names() {
        let status: TaskStatus = serde_json::from_str("\"in-progress\"").unwrap();
        assert_eq!(status, TaskStatus::InProgress);
        for status in [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn deserializes_minimal_server_record() {
        let task: Task =
            serde_json::from_str(r#"{"id": 7, "description": "buy milk", "status": "todo"}"#)
                .unwrap();
        assert_eq!(task.id, 7);
        assert_eq!(task.description, "buy milk");
        assert_eq!(task.status, TaskStatus::Todo);
        assert!(task.title.is_none());
        assert!(task.tags.is_empty());
    }

    #[test]
    fn deserializes_full_record() {
        let task: Task = serde_json::from_str(
            r#"{"id": 1, "title": "Groceries", "description": "buy milk",
                "status": "in-progress", "due_date": "2024-01-02",
                "tags": ["home", "errand"], "priority": "high",
                "created_at": "2024-01-01"}"#,
        )
        .unwrap();
        assert_eq!(task.title.as_deref(), Some("Groceries"));
        assert_eq!(task.tags, vec!["home", "errand"]);
        assert_eq!(task.priority, Some(TaskPriority::High));
    }

    #[test]
    fn overdue_only_for_parseable_past_dates() {
        let mut task: Task =
            serde_json::from_str(r#"{"id": 1, "description": "x", "status": "todo"}"#).unwrap();
        assert!(!task.is_overdue());
        task.due_date = Some("2000-01-01".to_string());
        assert!(task.is_overdue());
        task.due_date = Some("not a date".to_string());
        assert!(!task.is_overdue());
    }
}
