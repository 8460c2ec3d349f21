//! The [`Task`] record and its enumerations.
//!
//! Status and priority are closed sets. Their persisted literals
//! (`"Pending"`, `"Done"`, `"High"`, `"Medium"`, `"Low"`) come from
//! [`TaskStatus::as_str`] and [`TaskPriority::as_str`]; parsing goes through
//! `FromStr`, which rejects anything else.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Longest description accepted by [`validate_description`], in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 1024;

/// Integer task identifier assigned by the store. Never reused.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(i64);

impl TaskId {
    /// Wrap a raw row id.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw row id.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TaskId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// Completion status. Two states; toggling flips between them.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Initial state of every new task.
    #[default]
    Pending,
    /// Completed. Reversible.
    Done,
}

impl TaskStatus {
    /// Persisted literal.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Done => "Done",
        }
    }

    /// The state a toggle moves to.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Done,
            Self::Done => Self::Pending,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Done" => Ok(Self::Done),
            other => Err(ValidationError::UnknownVariant {
                kind: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// Task priority. Defaults to [`TaskPriority::High`].
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskPriority {
    /// Default priority.
    #[default]
    High,
    /// Middle priority.
    Medium,
    /// Lowest priority.
    Low,
}

impl TaskPriority {
    /// All priorities in display order.
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Persisted literal.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Lenient conversion for raw user input: blank or unrecognised
    /// literals fall back to the default priority.
    pub fn from_input(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    /// Next priority in display order, wrapping around.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::High => Self::Medium,
            Self::Medium => Self::Low,
            Self::Low => Self::High,
        }
    }

    /// Previous priority in display order, wrapping around.
    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            Self::High => Self::Low,
            Self::Medium => Self::High,
            Self::Low => Self::Medium,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = ValidationError;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnknownVariant {
                kind: "priority",
                value: s.to_string(),
            })
    }
}

/// Display-side filter over cached tasks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PriorityFilter {
    /// Show everything.
    #[default]
    All,
    /// Show only tasks of one priority.
    Only(TaskPriority),
}

impl PriorityFilter {
    /// Filter entries in the order the UI lists them.
    pub const ALL: [Self; 4] = [
        Self::All,
        Self::Only(TaskPriority::High),
        Self::Only(TaskPriority::Medium),
        Self::Only(TaskPriority::Low),
    ];

    /// Whether `task` passes this filter.
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Only(priority) => task.priority == priority,
        }
    }

    /// Label shown in the filter list.
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Only(priority) => priority.as_str(),
        }
    }
}

impl fmt::Display for PriorityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PriorityFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<TaskPriority>()
            .map(Self::Only)
            .map_err(|_| ValidationError::UnknownVariant {
                kind: "filter",
                value: s.to_string(),
            })
    }
}

/// A single to-do item.
///
/// Only `status` and `updated_at` change after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier.
    pub id: TaskId,
    /// Trimmed, non-blank description.
    pub description: String,
    /// Completion status.
    pub status: TaskStatus,
    /// Priority fixed at creation.
    pub priority: TaskPriority,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Creation time, or the time of the latest status change.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Whether the task is marked done.
    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}

/// Trim a raw description and check it is acceptable.
pub fn validate_description(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankDescription);
    }
    let chars = trimmed.chars().count();
    if chars > MAX_DESCRIPTION_CHARS {
        return Err(ValidationError::DescriptionTooLong {
            limit: MAX_DESCRIPTION_CHARS,
            actual: chars,
        });
    }
    Ok(trimmed.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
