//! Overdue auto-close maintenance job.
//!
//! Finds every task whose deadline lies strictly before a given date and that
//! is not yet done, then closes each one in its own storage call. A failure on
//! one task is recorded in the report and the run moves on; only a failure of
//! the initial query aborts the run.

use std::sync::Arc;

use serde::Serialize;

use crate::clock::Clock;
use crate::error::CoreError;
use crate::models::{Task, TaskFilter};
use crate::storage::Storage;
use crate::types::{Date, DbId, Timestamp};

/// Reason recorded when a task is no longer closable at write time.
pub const SKIP_REASON_GONE_OR_DONE: &str = "task was deleted or completed before it could be closed";

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// What happened to one overdue task during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CloseOutcome {
    /// Dry run: the task would be closed.
    WouldClose,
    Closed { closed_at: Timestamp },
    Skipped { reason: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloseEntry {
    pub task_id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub deadline: Option<Date>,
    #[serde(flatten)]
    pub outcome: CloseOutcome,
}

impl CloseEntry {
    fn for_task(task: &Task, outcome: CloseOutcome) -> Self {
        Self {
            task_id: task.id,
            project_id: task.project_id,
            name: task.name.clone(),
            deadline: task.deadline,
            outcome,
        }
    }
}

/// Result of one invocation of [`OverdueCloser::close_overdue_tasks`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloseReport {
    pub as_of: Date,
    pub dry_run: bool,
    pub entries: Vec<CloseEntry>,
}

impl CloseReport {
    pub fn closed_count(&self) -> usize {
        self.count(|o| matches!(o, CloseOutcome::Closed { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, CloseOutcome::Failed { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, CloseOutcome::Skipped { .. }))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn count(&self, pred: impl Fn(&CloseOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

pub struct OverdueCloser {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl OverdueCloser {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Today according to the injected clock.
    pub fn today(&self) -> Date {
        self.clock.today()
    }

    /// Not-done tasks with a deadline strictly before `as_of`, ordered by
    /// deadline then id. Read-only.
    pub async fn find_overdue_tasks(&self, as_of: Date) -> Result<Vec<Task>, CoreError> {
        Ok(self.storage.find_tasks(&TaskFilter::overdue(as_of)).await?)
    }

    /// Close every task overdue as of `as_of`, or with `dry_run` only report
    /// which ones would be closed.
    pub async fn close_overdue_tasks(
        &self,
        as_of: Date,
        dry_run: bool,
    ) -> Result<CloseReport, CoreError> {
        let overdue = self.find_overdue_tasks(as_of).await.map_err(|e| {
            tracing::error!(error = %e, %as_of, "Overdue query failed, run aborted");
            e
        })?;

        let mut entries = Vec::with_capacity(overdue.len());
        for task in &overdue {
            let outcome = if dry_run {
                tracing::debug!(task_id = task.id, project_id = task.project_id, "Would close overdue task");
                CloseOutcome::WouldClose
            } else {
                self.close_one(task).await
            };
            entries.push(CloseEntry::for_task(task, outcome));
        }

        let report = CloseReport {
            as_of,
            dry_run,
            entries,
        };
        tracing::info!(
            %as_of,
            dry_run,
            found = report.entries.len(),
            closed = report.closed_count(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            "Overdue run finished"
        );
        Ok(report)
    }

    async fn close_one(&self, task: &Task) -> CloseOutcome {
        let closed_at = self.clock.now();
        match self.storage.close_task(task.id, closed_at).await {
            Ok(Some(closed)) => {
                tracing::info!(
                    task_id = task.id,
                    project_id = task.project_id,
                    deadline = ?task.deadline,
                    "Closed overdue task"
                );
                CloseOutcome::Closed {
                    closed_at: closed.closed_at.unwrap_or(closed_at),
                }
            }
            Ok(None) => {
                tracing::debug!(task_id = task.id, "Overdue task no longer open, skipped");
                CloseOutcome::Skipped {
                    reason: SKIP_REASON_GONE_OR_DONE.to_string(),
                }
            }
            Err(e) => {
                tracing::warn!(task_id = task.id, error = %e, "Failed to close overdue task");
                CloseOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
