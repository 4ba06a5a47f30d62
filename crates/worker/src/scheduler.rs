//! Periodic overdue auto-close.
//!
//! Runs [`OverdueCloser::close_overdue_tasks`] for "today" on a fixed
//! interval using `tokio::time::interval`, until the cancellation token fires.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use todolist_core::error::CoreError;
use todolist_core::overdue::{CloseReport, OverdueCloser};

/// Run one non-dry pass as of the closer's current date.
pub async fn run_once(closer: &OverdueCloser) -> Result<CloseReport, CoreError> {
    closer.close_overdue_tasks(closer.today(), false).await
}

/// Run the overdue auto-close loop.
///
/// The first pass happens immediately. A failed pass is logged and the loop
/// keeps ticking. Runs until `cancel` is triggered.
pub async fn run(closer: Arc<OverdueCloser>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Overdue auto-close job started"
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Overdue auto-close job stopping");
                break;
            }
            _ = ticker.tick() => {
                match run_once(&closer).await {
                    Ok(report) if report.is_empty() => {
                        tracing::debug!(as_of = %report.as_of, "Overdue auto-close: nothing to close");
                    }
                    Ok(report) => {
                        tracing::info!(
                            as_of = %report.as_of,
                            closed = report.closed_count(),
                            failed = report.failed_count(),
                            "Overdue auto-close: pass complete"
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Overdue auto-close: pass failed");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use todolist_core::clock::{Clock, FixedClock};
    use todolist_core::models::{NewProject, NewTask, Page, TaskStatus};
    use todolist_core::storage::{MemoryStorage, Storage};

    use super::*;

    async fn seeded() -> (Arc<MemoryStorage>, Arc<OverdueCloser>) {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(FixedClock::at_date(
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
        ));
        let now = clock.now();
        let project = storage
            .insert_project(
                &NewProject {
                    name: "P".into(),
                    description: None,
                },
                now,
            )
            .await
            .unwrap();
        storage
            .insert_task(
                &NewTask {
                    project_id: project.id,
                    name: "late".into(),
                    description: None,
                    status: TaskStatus::Doing,
                    deadline: NaiveDate::from_ymd_opt(2025, 6, 1),
                },
                now,
            )
            .await
            .unwrap();
        let closer = Arc::new(OverdueCloser::new(storage.clone(), clock));
        (storage, closer)
    }

    #[tokio::test]
    async fn run_once_closes_as_of_today() {
        let (_, closer) = seeded().await;
        let report = run_once(&closer).await.unwrap();
        assert!(!report.dry_run);
        assert_eq!(report.as_of, NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
        assert_eq!(report.closed_count(), 1);
    }

    #[tokio::test]
    async fn loop_ticks_until_cancelled() {
        let (storage, closer) = seeded().await;
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(closer, Duration::from_millis(10), cancel.clone()));

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("loop should stop after cancellation")
            .unwrap();

        let tasks = storage.list_tasks(None, Page::all()).await.unwrap();
        assert_eq!(tasks[0].status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn cancelled_before_start_exits() {
        let (_, closer) = seeded().await;
        let cancel = CancellationToken::new();
        cancel.cancel();
        tokio::time::timeout(
            Duration::from_secs(1),
            run(closer, Duration::from_secs(3600), cancel),
        )
        .await
        .unwrap();
    }
}
