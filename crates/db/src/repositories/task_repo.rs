//! Repository for the `tasks` table.

use sqlx::PgPool;
use todolist_core::models::{NewTask, Page, TaskChanges, TaskFilter, STATUS_DONE};
use todolist_core::types::{DbId, Timestamp};

use crate::models::task::TaskRow;
use crate::repositories::page_bounds;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, project_id, name, description, status, deadline, closed_at, created_at, updated_at";

/// Provides CRUD operations for tasks, plus the overdue scan and closure.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &NewTask,
        now: Timestamp,
    ) -> Result<TaskRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (project_id, name, description, status, deadline, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(input.project_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.status.as_str())
            .bind(input.deadline)
            .bind(now)
            .fetch_one(pool)
            .await
    }

    /// Find a task by ID, scoped to its owning project.
    pub async fn find_in_project(
        pool: &PgPool,
        project_id: DbId,
        task_id: DbId,
    ) -> Result<Option<TaskRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(task_id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// List tasks in creation order, across all projects when `project_id` is `None`.
    pub async fn list(
        pool: &PgPool,
        project_id: Option<DbId>,
        page: Page,
    ) -> Result<Vec<TaskRow>, sqlx::Error> {
        let (offset, limit) = page_bounds(page);
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE ($1::BIGINT IS NULL OR project_id = $1)
             ORDER BY id
             OFFSET $2 LIMIT $3"
        );
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(project_id)
            .bind(offset)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Update a task. Only fields present in `changes` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        task_id: DbId,
        changes: &TaskChanges,
        now: Timestamp,
    ) -> Result<Option<TaskRow>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                name = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                status = COALESCE($5, status),
                deadline = CASE WHEN $6 THEN $7 ELSE deadline END,
                closed_at = CASE WHEN $8 THEN $9 ELSE closed_at END,
                updated_at = $10
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(task_id)
            .bind(&changes.name)
            .bind(changes.description.is_some())
            .bind(changes.description.clone().flatten())
            .bind(changes.status.map(|s| s.as_str()))
            .bind(changes.deadline.is_some())
            .bind(changes.deadline.flatten())
            .bind(changes.closed_at.is_some())
            .bind(changes.closed_at.flatten())
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Delete a task if it belongs to `project_id`. Returns `true` if removed.
    pub async fn delete_in_project(
        pool: &PgPool,
        project_id: DbId,
        task_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND project_id = $2")
            .bind(task_id)
            .bind(project_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_in_project(pool: &PgPool, project_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Tasks matching `filter`, ordered by deadline (missing first) then id.
    pub async fn find(pool: &PgPool, filter: &TaskFilter) -> Result<Vec<TaskRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE ($1::DATE IS NULL OR (deadline IS NOT NULL AND deadline < $1))
               AND ($2::TEXT IS NULL OR status <> $2)
             ORDER BY deadline NULLS FIRST, id"
        );
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(filter.overdue_before)
            .bind(filter.status_not.map(|s| s.as_str()))
            .fetch_all(pool)
            .await
    }

    /// Mark a task done and stamp `closed_at`, unless it is already done.
    ///
    /// Returns `None` if the task is gone or was already done.
    pub async fn close(
        pool: &PgPool,
        task_id: DbId,
        closed_at: Timestamp,
    ) -> Result<Option<TaskRow>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET status = $2, closed_at = $3, updated_at = $3
             WHERE id = $1 AND status <> $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(task_id)
            .bind(STATUS_DONE)
            .bind(closed_at)
            .fetch_optional(pool)
            .await
    }
}
