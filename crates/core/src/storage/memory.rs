//! In-memory storage adapter.
//!
//! All state sits behind one `RwLock`, so every trait call observes and
//! produces a consistent snapshot. Ids are assigned from monotonically
//! increasing counters and never reused.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::models::{
    NewProject, NewTask, Page, Project, ProjectChanges, Task, TaskChanges, TaskFilter,
    TaskStatus,
};
use crate::storage::{
    Storage, StorageResult, FK_TASK_PROJECT, UQ_PROJECT_NAME, UQ_TASK_PROJECT_NAME,
};
use crate::types::{DbId, Timestamp};

#[derive(Debug, Default)]
struct Inner {
    projects: BTreeMap<DbId, Project>,
    tasks: BTreeMap<DbId, Task>,
    last_project_id: DbId,
    last_task_id: DbId,
}

impl Inner {
    fn project_name_taken(&self, name: &str, exclude: Option<DbId>) -> bool {
        self.projects
            .values()
            .any(|p| p.name == name && Some(p.id) != exclude)
    }

    fn task_name_taken(&self, project_id: DbId, name: &str, exclude: Option<DbId>) -> bool {
        self.tasks
            .values()
            .any(|t| t.project_id == project_id && t.name == name && Some(t.id) != exclude)
    }
}

fn unique_violation(constraint: &str) -> StorageError {
    StorageError::UniqueViolation {
        constraint: constraint.to_string(),
    }
}

/// Process-local storage, lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: RwLock<Inner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn insert_project(&self, input: &NewProject, now: Timestamp) -> StorageResult<Project> {
        let mut inner = self.inner.write().await;
        if inner.project_name_taken(&input.name, None) {
            return Err(unique_violation(UQ_PROJECT_NAME));
        }

        inner.last_project_id += 1;
        let project = Project {
            id: inner.last_project_id,
            name: input.name.clone(),
            description: input.description.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn get_project(&self, id: DbId) -> StorageResult<Option<Project>> {
        Ok(self.inner.read().await.projects.get(&id).cloned())
    }

    async fn list_projects(&self, page: Page) -> StorageResult<Vec<Project>> {
        let inner = self.inner.read().await;
        Ok(page.apply(inner.projects.values().cloned()))
    }

    async fn update_project(
        &self,
        id: DbId,
        changes: &ProjectChanges,
        now: Timestamp,
    ) -> StorageResult<Option<Project>> {
        let mut inner = self.inner.write().await;
        if let Some(name) = &changes.name {
            if inner.project_name_taken(name, Some(id)) {
                return Err(unique_violation(UQ_PROJECT_NAME));
            }
        }

        let Some(project) = inner.projects.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            project.name = name.clone();
        }
        if let Some(description) = &changes.description {
            project.description = description.clone();
        }
        project.updated_at = now;
        Ok(Some(project.clone()))
    }

    async fn delete_project(&self, id: DbId) -> StorageResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.projects.remove(&id).is_none() {
            return Ok(false);
        }
        inner.tasks.retain(|_, t| t.project_id != id);
        Ok(true)
    }

    async fn count_projects(&self) -> StorageResult<usize> {
        Ok(self.inner.read().await.projects.len())
    }

    async fn insert_task(&self, input: &NewTask, now: Timestamp) -> StorageResult<Task> {
        let mut inner = self.inner.write().await;
        if !inner.projects.contains_key(&input.project_id) {
            return Err(StorageError::ForeignKeyViolation {
                constraint: FK_TASK_PROJECT.to_string(),
            });
        }
        if inner.task_name_taken(input.project_id, &input.name, None) {
            return Err(unique_violation(UQ_TASK_PROJECT_NAME));
        }

        inner.last_task_id += 1;
        let task = Task {
            id: inner.last_task_id,
            project_id: input.project_id,
            name: input.name.clone(),
            description: input.description.clone(),
            status: input.status,
            deadline: input.deadline,
            closed_at: None,
            created_at: now,
            updated_at: now,
        };
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get_task(&self, project_id: DbId, task_id: DbId) -> StorageResult<Option<Task>> {
        let inner = self.inner.read().await;
        Ok(inner
            .tasks
            .get(&task_id)
            .filter(|t| t.project_id == project_id)
            .cloned())
    }

    async fn list_tasks(&self, project_id: Option<DbId>, page: Page) -> StorageResult<Vec<Task>> {
        let inner = self.inner.read().await;
        let scoped = inner
            .tasks
            .values()
            .filter(|t| project_id.map_or(true, |pid| t.project_id == pid))
            .cloned();
        Ok(page.apply(scoped))
    }

    async fn update_task(
        &self,
        task_id: DbId,
        changes: &TaskChanges,
        now: Timestamp,
    ) -> StorageResult<Option<Task>> {
        let mut inner = self.inner.write().await;
        let Some(project_id) = inner.tasks.get(&task_id).map(|t| t.project_id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            if inner.task_name_taken(project_id, name, Some(task_id)) {
                return Err(unique_violation(UQ_TASK_PROJECT_NAME));
            }
        }

        let Some(task) = inner.tasks.get_mut(&task_id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            task.name = name.clone();
        }
        if let Some(description) = &changes.description {
            task.description = description.clone();
        }
        if let Some(status) = changes.status {
            task.status = status;
        }
        if let Some(deadline) = changes.deadline {
            task.deadline = deadline;
        }
        if let Some(closed_at) = changes.closed_at {
            task.closed_at = closed_at;
        }
        task.updated_at = now;
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, project_id: DbId, task_id: DbId) -> StorageResult<bool> {
        let mut inner = self.inner.write().await;
        let owned = inner
            .tasks
            .get(&task_id)
            .is_some_and(|t| t.project_id == project_id);
        if owned {
            inner.tasks.remove(&task_id);
        }
        Ok(owned)
    }

    async fn count_tasks(&self, project_id: DbId) -> StorageResult<usize> {
        let inner = self.inner.read().await;
        Ok(inner
            .tasks
            .values()
            .filter(|t| t.project_id == project_id)
            .count())
    }

    async fn find_tasks(&self, filter: &TaskFilter) -> StorageResult<Vec<Task>> {
        let inner = self.inner.read().await;
        let mut found: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        found.sort_by_key(|t| (t.deadline, t.id));
        Ok(found)
    }

    async fn close_task(
        &self,
        task_id: DbId,
        closed_at: Timestamp,
    ) -> StorageResult<Option<Task>> {
        let mut inner = self.inner.write().await;
        let Some(task) = inner.tasks.get_mut(&task_id) else {
            return Ok(None);
        };
        if task.status.is_done() {
            return Ok(None);
        }
        task.status = TaskStatus::Done;
        task.closed_at = Some(closed_at);
        task.updated_at = closed_at;
        Ok(Some(task.clone()))
    }
}
