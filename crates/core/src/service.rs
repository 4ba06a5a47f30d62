//! Project and task operations with their business rules.
//!
//! [`TodoService`] is the only write path for projects and tasks. Each call
//! validates its input, checks limits and uniqueness against the state the
//! storage port reports at that moment, then issues a single storage write.
//! Uniqueness is decided here; the storage-level unique constraints are a
//! second line of defence whose violations are reported as the same
//! `Duplicate` error.

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::TodoConfig;
use crate::error::{CoreError, Entity, StorageError};
use crate::models::{
    CreateProject, CreateTask, NewProject, NewTask, Page, Project, ProjectChanges,
    ProjectSummary, Task, TaskChanges, TaskStatus, UpdateProject, UpdateTask,
};
use crate::storage::Storage;
use crate::types::{Date, DbId, Timestamp};
use crate::validation::{
    validate_deadline, validate_description, validate_name, validate_project_limit,
    validate_status, validate_task_limit, validate_unique_project_name,
    validate_unique_task_name, MAX_DESCRIPTION_WORDS, MAX_NAME_WORDS,
};

#[derive(Clone)]
pub struct TodoService {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    config: TodoConfig,
}

impl TodoService {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>, config: TodoConfig) -> Self {
        Self {
            storage,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &TodoConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    pub async fn create_project(&self, input: CreateProject) -> Result<Project, CoreError> {
        validate_name(&input.name, MAX_NAME_WORDS)?;
        let description = checked_description(input.description)?;

        let count = self.storage.count_projects().await?;
        validate_project_limit(count, self.config.max_projects)?;

        let existing = self.storage.list_projects(Page::all()).await?;
        validate_unique_project_name(&input.name, &existing, None)?;

        let new = NewProject {
            name: input.name,
            description,
        };
        let project = self
            .storage
            .insert_project(&new, self.clock.now())
            .await
            .map_err(|e| write_error(e, Entity::Project, &new.name))?;

        tracing::info!(project_id = project.id, name = %project.name, "Project created");
        Ok(project)
    }

    pub async fn get_project(&self, id: DbId) -> Result<Project, CoreError> {
        self.storage
            .get_project(id)
            .await?
            .ok_or(CoreError::project_not_found(id))
    }

    pub async fn update_project(
        &self,
        id: DbId,
        input: UpdateProject,
    ) -> Result<Project, CoreError> {
        self.get_project(id).await?;

        let mut changes = ProjectChanges::default();
        if let Some(name) = input.name {
            validate_name(&name, MAX_NAME_WORDS)?;
            let existing = self.storage.list_projects(Page::all()).await?;
            validate_unique_project_name(&name, &existing, Some(id))?;
            changes.name = Some(name);
        }
        if let Some(description) = input.description {
            changes.description = Some(checked_description(Some(description))?);
        }

        let conflict_name = changes.name.clone().unwrap_or_default();
        self.storage
            .update_project(id, &changes, self.clock.now())
            .await
            .map_err(|e| write_error(e, Entity::Project, &conflict_name))?
            .ok_or(CoreError::project_not_found(id))
    }

    /// Delete a project together with all of its tasks.
    pub async fn delete_project(&self, id: DbId) -> Result<(), CoreError> {
        if !self.storage.delete_project(id).await? {
            return Err(CoreError::project_not_found(id));
        }
        tracing::info!(project_id = id, "Project deleted with its tasks");
        Ok(())
    }

    /// Projects in creation (id) order.
    pub async fn list_projects(&self, page: Page) -> Result<Vec<Project>, CoreError> {
        Ok(self.storage.list_projects(page).await?)
    }

    /// Projects in creation order, each with its task count.
    pub async fn list_project_summaries(
        &self,
        page: Page,
    ) -> Result<Vec<ProjectSummary>, CoreError> {
        let projects = self.storage.list_projects(page).await?;
        let mut summaries = Vec::with_capacity(projects.len());
        for project in projects {
            let task_count = self.storage.count_tasks(project.id).await? as i64;
            summaries.push(ProjectSummary {
                project,
                task_count,
            });
        }
        Ok(summaries)
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    pub async fn create_task(
        &self,
        project_id: DbId,
        input: CreateTask,
    ) -> Result<Task, CoreError> {
        self.get_project(project_id).await?;

        validate_name(&input.name, MAX_NAME_WORDS)?;
        let description = checked_description(input.description)?;
        let status = match input.status {
            Some(status) => validate_status(&status)?,
            None => TaskStatus::default(),
        };
        let deadline = self.checked_deadline(input.deadline)?;

        let count = self.storage.count_tasks(project_id).await?;
        validate_task_limit(count, self.config.max_tasks_per_project)?;

        let siblings = self.storage.list_tasks(Some(project_id), Page::all()).await?;
        validate_unique_task_name(&input.name, &siblings, None)?;

        let new = NewTask {
            project_id,
            name: input.name,
            description,
            status,
            deadline,
        };
        let task = self
            .storage
            .insert_task(&new, self.clock.now())
            .await
            .map_err(|e| match e {
                StorageError::ForeignKeyViolation { .. } => CoreError::project_not_found(project_id),
                other => write_error(other, Entity::Task, &new.name),
            })?;

        tracing::info!(project_id, task_id = task.id, name = %task.name, "Task created");
        Ok(task)
    }

    pub async fn get_task(&self, project_id: DbId, task_id: DbId) -> Result<Task, CoreError> {
        self.storage
            .get_task(project_id, task_id)
            .await?
            .ok_or(CoreError::task_not_found(task_id))
    }

    /// Update the supplied fields of a task, re-validating each of them.
    pub async fn update_task(
        &self,
        project_id: DbId,
        task_id: DbId,
        input: UpdateTask,
    ) -> Result<Task, CoreError> {
        let current = self.get_task(project_id, task_id).await?;

        let mut changes = TaskChanges::default();
        if let Some(name) = input.name {
            validate_name(&name, MAX_NAME_WORDS)?;
            changes.name = Some(name);
        }
        if let Some(description) = input.description {
            changes.description = Some(checked_description(Some(description))?);
        }
        if let Some(status) = input.status {
            let status = validate_status(&status)?;
            changes.status = Some(status);
            changes.closed_at = closed_at_change(&current, status);
        }
        if let Some(deadline) = input.deadline {
            changes.deadline = Some(self.checked_deadline(Some(deadline))?);
        }

        if let Some(name) = &changes.name {
            let siblings = self.storage.list_tasks(Some(project_id), Page::all()).await?;
            validate_unique_task_name(name, &siblings, Some(task_id))?;
        }

        let conflict_name = changes.name.clone().unwrap_or_default();
        self.storage
            .update_task(task_id, &changes, self.clock.now())
            .await
            .map_err(|e| write_error(e, Entity::Task, &conflict_name))?
            .ok_or(CoreError::task_not_found(task_id))
    }

    /// Change only the status of a task.
    ///
    /// Moving into `done` here is a manual completion and leaves `closed_at`
    /// untouched; only the overdue job stamps it. Leaving `done` clears it.
    pub async fn update_task_status(
        &self,
        project_id: DbId,
        task_id: DbId,
        new_status: &str,
    ) -> Result<Task, CoreError> {
        let current = self.get_task(project_id, task_id).await?;
        let status = validate_status(new_status)?;

        let changes = TaskChanges {
            status: Some(status),
            closed_at: closed_at_change(&current, status),
            ..TaskChanges::default()
        };
        self.storage
            .update_task(task_id, &changes, self.clock.now())
            .await?
            .ok_or(CoreError::task_not_found(task_id))
    }

    pub async fn delete_task(&self, project_id: DbId, task_id: DbId) -> Result<(), CoreError> {
        if !self.storage.delete_task(project_id, task_id).await? {
            return Err(CoreError::task_not_found(task_id));
        }
        tracing::info!(project_id, task_id, "Task deleted");
        Ok(())
    }

    /// Tasks in creation (id) order; scoped to one project when `project_id`
    /// is given, in which case the project must exist.
    pub async fn list_tasks(
        &self,
        project_id: Option<DbId>,
        page: Page,
    ) -> Result<Vec<Task>, CoreError> {
        if let Some(id) = project_id {
            self.get_project(id).await?;
        }
        Ok(self.storage.list_tasks(project_id, page).await?)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Blank means "no deadline"; anything else must parse and not be past.
    fn checked_deadline(&self, raw: Option<String>) -> Result<Option<Date>, CoreError> {
        match raw {
            Some(text) if !text.trim().is_empty() => {
                validate_deadline(&text, self.clock.today()).map(Some)
            }
            _ => Ok(None),
        }
    }
}

/// Validate a description and store blank as absent.
fn checked_description(raw: Option<String>) -> Result<Option<String>, CoreError> {
    match raw {
        Some(text) => {
            validate_description(&text, MAX_DESCRIPTION_WORDS)?;
            Ok(Some(text).filter(|t| !t.trim().is_empty()))
        }
        None => Ok(None),
    }
}

/// `closed_at` is only meaningful while done: clear it when a task leaves `done`.
fn closed_at_change(current: &Task, next: TaskStatus) -> Option<Option<Timestamp>> {
    if !next.is_done() && current.closed_at.is_some() {
        Some(None)
    } else {
        None
    }
}

/// A storage-level unique violation is the same duplicate the service checks for.
fn write_error(err: StorageError, entity: Entity, name: &str) -> CoreError {
    match err {
        StorageError::UniqueViolation { .. } => CoreError::Duplicate {
            entity,
            name: name.to_string(),
        },
        other => other.into(),
    }
}
