//! Project and task entities, their input DTOs, and query parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ValidationReason};
use crate::types::{Date, DbId, Timestamp};

// ---------------------------------------------------------------------------
// Task status
// ---------------------------------------------------------------------------

pub const STATUS_TODO: &str = "todo";
pub const STATUS_DOING: &str = "doing";
pub const STATUS_DONE: &str = "done";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Todo,
    Doing,
    Done,
}

impl TaskStatus {
    /// Return the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => STATUS_TODO,
            Self::Doing => STATUS_DOING,
            Self::Done => STATUS_DONE,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Parses an exact (already normalised) status string.
impl FromStr for TaskStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_TODO => Ok(Self::Todo),
            STATUS_DOING => Ok(Self::Doing),
            STATUS_DONE => Ok(Self::Done),
            _ => Err(CoreError::validation(
                "status",
                ValidationReason::InvalidStatus,
            )),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub deadline: Option<Date>,
    pub closed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A project together with the number of tasks it owns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Project,
    pub task_count: i64,
}

// ---------------------------------------------------------------------------
// Raw inputs (as received from a caller, before validation)
// ---------------------------------------------------------------------------

/// DTO for creating a new project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// DTO for creating a new task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTask {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to `todo` if omitted.
    pub status: Option<String>,
    /// `YYYY-MM-DD`; blank means no deadline.
    pub deadline: Option<String>,
}

/// DTO for updating an existing task. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub deadline: Option<String>,
}

// ---------------------------------------------------------------------------
// Validated writes handed to storage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
}

/// Field changes for a project; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub project_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub deadline: Option<Date>,
}

/// Field changes for a task; `None` leaves the column untouched.
///
/// `closed_at` is set to `Some(None)` to clear it when a task leaves `done`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub deadline: Option<Option<Date>>,
    pub closed_at: Option<Option<Timestamp>>,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Offset/limit pagination over an id-ordered listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub skip: usize,
    /// `None` returns everything after `skip`.
    pub limit: Option<usize>,
}

impl Page {
    /// Build from caller-supplied values: negatives clamp to zero and a limit
    /// of zero (or none) means "all remaining".
    pub fn new(skip: Option<i64>, limit: Option<i64>) -> Self {
        let skip = skip.unwrap_or(0).max(0) as usize;
        let limit = limit.filter(|l| *l > 0).map(|l| l as usize);
        Self { skip, limit }
    }

    pub fn all() -> Self {
        Self::default()
    }

    /// Apply the page to an already-ordered iterator.
    pub fn apply<T>(&self, items: impl Iterator<Item = T>) -> Vec<T> {
        let iter = items.skip(self.skip);
        match self.limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        }
    }
}

/// Task search used by the overdue job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Only tasks with a deadline strictly before this date.
    pub overdue_before: Option<Date>,
    /// Exclude tasks in this status.
    pub status_not: Option<TaskStatus>,
}

impl TaskFilter {
    pub fn overdue(as_of: Date) -> Self {
        Self {
            overdue_before: Some(as_of),
            status_not: Some(TaskStatus::Done),
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        let deadline_ok = match self.overdue_before {
            Some(before) => task.deadline.is_some_and(|d| d < before),
            None => true,
        };
        let status_ok = self.status_not != Some(task.status);
        deadline_ok && status_ok
    }
}
