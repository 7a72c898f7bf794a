//! Task data structure and related functionality.
//!
//! This module defines the `Task` record shared by both storage backends
//! and the opaque `TaskId` used to address it.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a task within a list.
///
/// Generated from the creation timestamp by the local backend and assigned
/// by the server in remote mode. Callers should treat it as opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(TaskId)
    }
}

/// A single to-do item.
///
/// The timestamps are only tracked by the local backend; records mirrored from
/// the remote endpoint leave them empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a pending task stamped with the given creation time.
    pub fn new(id: TaskId, text: &str, created_at: DateTime<Utc>) -> Self {
        Task {
            id,
            text: text.to_string(),
            completed: false,
            created_at: Some(created_at),
            completed_at: None,
        }
    }

    /// Flip completion, recording or clearing the completion time.
    pub fn toggle_at(&mut self, now: DateTime<Utc>) {
        self.completed = !self.completed;
        self.completed_at = if self.completed { Some(now) } else { None };
    }
}

/// Trim user-entered text, returning `None` when nothing is left.
pub fn normalise_text(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_text() {
        assert_eq!(normalise_text("  Buy milk \n"), Some("Buy milk"));
        assert_eq!(normalise_text(""), None);
        assert_eq!(normalise_text("   \t"), None);
    }

    #[test]
    fn test_toggle_sets_and_clears_completed_at() {
        let now = Utc::now();
        let mut task = Task::new(TaskId(1), "X", now);
        task.toggle_at(now);
        assert!(task.completed);
        assert_eq!(task.completed_at, Some(now));
        task.toggle_at(now);
        assert!(!task.completed);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn test_serialises_with_browser_field_names() {
        let task = Task::new(TaskId(1700000000000), "Call Alice", Utc::now());
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["id"], 1700000000000u64);
        assert_eq!(value["text"], "Call Alice");
        assert_eq!(value["completed"], false);
        assert!(value.get("createdAt").is_some());
        assert!(value["completedAt"].is_null());
    }

    #[test]
    fn test_parses_browser_record_without_timestamps() {
        let task: Task = serde_json::from_str(r#"{"id": 5, "text": "Old"}"#).unwrap();
        assert_eq!(task.id, TaskId(5));
        assert!(!task.completed);
        assert_eq!(task.created_at, None);
    }

    #[test]
    fn test_task_id_from_str() {
        assert_eq!(" 42 ".parse::<TaskId>().unwrap(), TaskId(42));
        assert!("abc".parse::<TaskId>().is_err());
    }
}
