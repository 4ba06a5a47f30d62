//! The storage port.
//!
//! [`Storage`] is the only way the service and the overdue job touch
//! persisted state. Each method is one atomic unit of work in the backing
//! store. Adapters: [`MemoryStorage`] here, `PgStorage` in `todolist-db`.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::models::{
    NewProject, NewTask, Page, Project, ProjectChanges, Task, TaskChanges, TaskFilter,
};
use crate::types::{DbId, Timestamp};

pub mod memory;

pub use memory::MemoryStorage;

/// Name of the unique constraint on project names.
pub const UQ_PROJECT_NAME: &str = "uq_projects_name";

/// Name of the unique constraint on `(project_id, name)` for tasks.
pub const UQ_TASK_PROJECT_NAME: &str = "uq_tasks_project_name";

/// Name of the foreign key from tasks to their project.
pub const FK_TASK_PROJECT: &str = "fk_tasks_project";

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait Storage: Send + Sync {
    // -- Projects --

    /// Insert a project stamped with `now` for both timestamps.
    async fn insert_project(&self, input: &NewProject, now: Timestamp) -> StorageResult<Project>;

    async fn get_project(&self, id: DbId) -> StorageResult<Option<Project>>;

    /// Projects ordered by id ascending.
    async fn list_projects(&self, page: Page) -> StorageResult<Vec<Project>>;

    /// Apply `changes` and bump `updated_at`. `None` if the project is absent.
    async fn update_project(
        &self,
        id: DbId,
        changes: &ProjectChanges,
        now: Timestamp,
    ) -> StorageResult<Option<Project>>;

    /// Delete a project and every task it owns as one unit.
    /// Returns `false` if the project was absent.
    async fn delete_project(&self, id: DbId) -> StorageResult<bool>;

    async fn count_projects(&self) -> StorageResult<usize>;

    // -- Tasks --

    async fn insert_task(&self, input: &NewTask, now: Timestamp) -> StorageResult<Task>;

    /// Fetch a task only if it belongs to `project_id`.
    async fn get_task(&self, project_id: DbId, task_id: DbId) -> StorageResult<Option<Task>>;

    /// Tasks ordered by id ascending, optionally scoped to one project.
    async fn list_tasks(&self, project_id: Option<DbId>, page: Page) -> StorageResult<Vec<Task>>;

    async fn update_task(
        &self,
        task_id: DbId,
        changes: &TaskChanges,
        now: Timestamp,
    ) -> StorageResult<Option<Task>>;

    /// Delete a task only if it belongs to `project_id`.
    async fn delete_task(&self, project_id: DbId, task_id: DbId) -> StorageResult<bool>;

    async fn count_tasks(&self, project_id: DbId) -> StorageResult<usize>;

    /// Tasks matching `filter`, ordered by deadline then id.
    async fn find_tasks(&self, filter: &TaskFilter) -> StorageResult<Vec<Task>>;

    /// Mark a task done with `closed_at`, but only if it is not already done.
    /// Returns `None` if the task is gone or was already done.
    async fn close_task(&self, task_id: DbId, closed_at: Timestamp)
        -> StorageResult<Option<Task>>;
}
