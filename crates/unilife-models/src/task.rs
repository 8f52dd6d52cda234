//! Assignments and to-dos.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::class::DATE_FORMAT;
use crate::error::ModelError;
use crate::user::UserId;

/// Storage format of [`Task::due_time`].
pub const TASK_TIME_FORMAT: &str = "%H:%M";

/// How urgent a task is.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum TaskPriority {
    /// Can wait.
    Low,
    /// Default priority.
    #[default]
    Medium,
    /// Needs attention first.
    High,
}

/// Progress of a task.
///
/// Serialized with the labels the backend stores (`"To Do"`, …).
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum TaskStatus {
    /// Not started.
    #[default]
    #[serde(rename = "To Do")]
    #[strum(serialize = "To Do")]
    ToDo,
    /// Being worked on.
    #[serde(rename = "In Progress")]
    #[strum(serialize = "In Progress")]
    InProgress,
    /// Done.
    Finished,
}

impl TaskStatus {
    /// Statuses that still need work and therefore appear on the schedule.
    pub const OPEN: [TaskStatus; 2] = [TaskStatus::ToDo, TaskStatus::InProgress];

    /// Whether the task still needs work.
    pub fn is_open(self) -> bool {
        !matches!(self, TaskStatus::Finished)
    }
}

/// A single task.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Task {
    /// Backend row id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Short title.
    pub title: String,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Due date, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Due time, `HH:MM` (24h).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_time: Option<String>,
    /// Urgency.
    #[serde(default)]
    pub priority: TaskPriority,
    /// Progress.
    #[serde(default)]
    pub status: TaskStatus,
    /// Course this task belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    /// Owning user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl Task {
    /// Create a `To Do` task with medium priority.
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    /// When the task is due.
    ///
    /// Uses `due_time` when it parses, midnight otherwise. `None` when there
    /// is no due date or it is malformed.
    pub fn due_at(&self) -> Option<NaiveDateTime> {
        let date = NaiveDate::parse_from_str(self.due_date.as_deref()?.trim(), DATE_FORMAT).ok()?;
        let time = self
            .due_time
            .as_deref()
            .and_then(|t| NaiveTime::parse_from_str(t.trim(), TASK_TIME_FORMAT).ok())
            .unwrap_or(NaiveTime::MIN);
        Some(date.and_time(time))
    }

    /// A task needs at least a title.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.title.trim().is_empty() {
            return Err(ModelError::MissingFields {
                fields: vec!["title"],
            });
        }
        Ok(())
    }
}
