//! Row model for the `tasks` table.

use sqlx::FromRow;
use todolist_core::error::StorageError;
use todolist_core::models::{Task, TaskStatus};
use todolist_core::types::{Date, DbId, Timestamp};

/// A task row from the `tasks` table. `status` is stored as text and
/// constrained by `ck_tasks_status`.
#[derive(Debug, Clone, FromRow)]
pub struct TaskRow {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub deadline: Option<Date>,
    pub closed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<TaskRow> for Task {
    type Error = StorageError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<TaskStatus>().map_err(|_| {
            StorageError::Backend(format!(
                "task {} has unknown status '{}'",
                row.id, row.status
            ))
        })?;
        Ok(Task {
            id: row.id,
            project_id: row.project_id,
            name: row.name,
            description: row.description,
            status,
            deadline: row.deadline,
            closed_at: row.closed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn row(status: &str) -> TaskRow {
        let now = Utc::now();
        TaskRow {
            id: 4,
            project_id: 1,
            name: "Write copy".into(),
            description: None,
            status: status.into(),
            deadline: None,
            closed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn known_status_converts() {
        let task = Task::try_from(row("doing")).unwrap();
        assert_eq!(task.status, TaskStatus::Doing);
    }

    #[test]
    fn unknown_status_is_a_backend_error() {
        let err = Task::try_from(row("archived")).unwrap_err();
        assert!(err.to_string().contains("archived"));
    }
}
