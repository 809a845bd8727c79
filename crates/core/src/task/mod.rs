//! Task status transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow state of a task. Any state may jump straight to Completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Returns the snake_case wire name of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

/// Urgency of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

impl TaskPriority {
    /// Returns the lowercase wire name of the priority.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Outcome of applying a status change to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub status: TaskStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Applies a status change, maintaining the completion timestamp.
///
/// Entering Completed stamps `completed_at = now`. Leaving Completed
/// clears it. Re-asserting Completed keeps the original timestamp.
#[must_use]
pub fn apply_status(
    current: TaskStatus,
    completed_at: Option<DateTime<Utc>>,
    new_status: TaskStatus,
    now: DateTime<Utc>,
) -> StatusChange {
    let completed_at = match (current, new_status) {
        (TaskStatus::Completed, TaskStatus::Completed) => completed_at,
        (_, TaskStatus::Completed) => Some(now),
        _ => None,
    };
    StatusChange {
        status: new_status,
        completed_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_completing_sets_timestamp() {
        let change = apply_status(TaskStatus::Pending, None, TaskStatus::Completed, at(9));
        assert_eq!(change.status, TaskStatus::Completed);
        assert_eq!(change.completed_at, Some(at(9)));
    }

    #[test]
    fn test_reopening_clears_timestamp() {
        let change = apply_status(
            TaskStatus::Completed,
            Some(at(9)),
            TaskStatus::InProgress,
            at(10),
        );
        assert_eq!(change.status, TaskStatus::InProgress);
        assert_eq!(change.completed_at, None);
    }

    #[test]
    fn test_reasserting_completed_keeps_original_timestamp() {
        let change = apply_status(
            TaskStatus::Completed,
            Some(at(9)),
            TaskStatus::Completed,
            at(10),
        );
        assert_eq!(change.completed_at, Some(at(9)));
    }

    #[test]
    fn test_pending_to_in_progress_has_no_timestamp() {
        let change = apply_status(TaskStatus::Pending, None, TaskStatus::InProgress, at(9));
        assert_eq!(change.completed_at, None);
    }
}
