//! Task model and status lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task status enumeration.
///
/// Valid transitions:
/// - PENDING → COMPLETED (user completes before the artificial deadline)
/// - PENDING → MISSED (the miss timer fires)
///
/// COMPLETED and MISSED are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task is waiting on its deadline (initial state)
    Pending,
    /// Task was completed in time (terminal)
    Completed,
    /// The artificial deadline passed without completion (terminal)
    Missed,
}

impl TaskStatus {
    /// Check if a transition is valid.
    pub fn can_transition_to(&self, to: TaskStatus) -> bool {
        match self {
            TaskStatus::Pending => matches!(to, TaskStatus::Completed | TaskStatus::Missed),
            TaskStatus::Completed | TaskStatus::Missed => false,
        }
    }

    /// Whether this status accepts no further transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
            TaskStatus::Missed => "missed",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-defined task with an enforced earlier deadline.
///
/// `artificial_deadline` is derived at creation time and is never later
/// than `user_deadline`. `completed_at` is set only on the transition to
/// `Completed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, assigned by the store, never reused
    pub id: i64,
    /// Non-empty display name
    pub name: String,
    /// The deadline the user stated
    pub user_deadline: DateTime<Utc>,
    /// The earlier deadline actually enforced
    pub artificial_deadline: DateTime<Utc>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}
