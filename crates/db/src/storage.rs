//! PostgreSQL adapter for the core storage port.

use async_trait::async_trait;
use sqlx::PgPool;
use todolist_core::error::StorageError;
use todolist_core::models::{
    NewProject, NewTask, Page, Project, ProjectChanges, Task, TaskChanges, TaskFilter,
};
use todolist_core::storage::{Storage, StorageResult};
use todolist_core::types::{DbId, Timestamp};

use crate::models::task::TaskRow;
use crate::repositories::{ProjectRepo, TaskRepo};

/// PostgreSQL unique constraint violation.
const PG_UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL foreign key violation.
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// [`Storage`] backed by a PostgreSQL pool. Each call is one statement, or
/// one transaction for the cascading project delete.
#[derive(Debug, Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate a sqlx error into the storage taxonomy.
///
/// Violations of the named `uq_` and `fk_` constraints keep their constraint
/// name so the service can map them back to duplicates and missing parents;
/// everything else is opaque.
fn storage_error(err: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or("unknown").to_string();
        match db_err.code().as_deref() {
            Some(PG_UNIQUE_VIOLATION) if constraint.starts_with("uq_") => {
                return StorageError::UniqueViolation { constraint };
            }
            Some(PG_FOREIGN_KEY_VIOLATION) if constraint.starts_with("fk_") => {
                return StorageError::ForeignKeyViolation { constraint };
            }
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database error");
    StorageError::Backend(err.to_string())
}

fn tasks_from_rows(rows: Vec<TaskRow>) -> StorageResult<Vec<Task>> {
    rows.into_iter().map(Task::try_from).collect()
}

#[async_trait]
impl Storage for PgStorage {
    async fn insert_project(&self, input: &NewProject, now: Timestamp) -> StorageResult<Project> {
        ProjectRepo::create(&self.pool, input, now)
            .await
            .map(Project::from)
            .map_err(storage_error)
    }

    async fn get_project(&self, id: DbId) -> StorageResult<Option<Project>> {
        let row = ProjectRepo::find_by_id(&self.pool, id)
            .await
            .map_err(storage_error)?;
        Ok(row.map(Project::from))
    }

    async fn list_projects(&self, page: Page) -> StorageResult<Vec<Project>> {
        let rows = ProjectRepo::list(&self.pool, page)
            .await
            .map_err(storage_error)?;
        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn update_project(
        &self,
        id: DbId,
        changes: &ProjectChanges,
        now: Timestamp,
    ) -> StorageResult<Option<Project>> {
        let row = ProjectRepo::update(&self.pool, id, changes, now)
            .await
            .map_err(storage_error)?;
        Ok(row.map(Project::from))
    }

    async fn delete_project(&self, id: DbId) -> StorageResult<bool> {
        ProjectRepo::delete(&self.pool, id)
            .await
            .map_err(storage_error)
    }

    async fn count_projects(&self) -> StorageResult<usize> {
        let count = ProjectRepo::count(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(count as usize)
    }

    async fn insert_task(&self, input: &NewTask, now: Timestamp) -> StorageResult<Task> {
        let row = TaskRepo::create(&self.pool, input, now)
            .await
            .map_err(storage_error)?;
        Task::try_from(row)
    }

    async fn get_task(&self, project_id: DbId, task_id: DbId) -> StorageResult<Option<Task>> {
        TaskRepo::find_in_project(&self.pool, project_id, task_id)
            .await
            .map_err(storage_error)?
            .map(Task::try_from)
            .transpose()
    }

    async fn list_tasks(&self, project_id: Option<DbId>, page: Page) -> StorageResult<Vec<Task>> {
        let rows = TaskRepo::list(&self.pool, project_id, page)
            .await
            .map_err(storage_error)?;
        tasks_from_rows(rows)
    }

    async fn update_task(
        &self,
        task_id: DbId,
        changes: &TaskChanges,
        now: Timestamp,
    ) -> StorageResult<Option<Task>> {
        TaskRepo::update(&self.pool, task_id, changes, now)
            .await
            .map_err(storage_error)?
            .map(Task::try_from)
            .transpose()
    }

    async fn delete_task(&self, project_id: DbId, task_id: DbId) -> StorageResult<bool> {
        TaskRepo::delete_in_project(&self.pool, project_id, task_id)
            .await
            .map_err(storage_error)
    }

    async fn count_tasks(&self, project_id: DbId) -> StorageResult<usize> {
        let count = TaskRepo::count_in_project(&self.pool, project_id)
            .await
            .map_err(storage_error)?;
        Ok(count as usize)
    }

    async fn find_tasks(&self, filter: &TaskFilter) -> StorageResult<Vec<Task>> {
        let rows = TaskRepo::find(&self.pool, filter)
            .await
            .map_err(storage_error)?;
        tasks_from_rows(rows)
    }

    async fn close_task(
        &self,
        task_id: DbId,
        closed_at: Timestamp,
    ) -> StorageResult<Option<Task>> {
        TaskRepo::close(&self.pool, task_id, closed_at)
            .await
            .map_err(storage_error)?
            .map(Task::try_from)
            .transpose()
    }
}
