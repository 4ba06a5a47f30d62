//! Handlers for the overdue auto-close job.

use axum::extract::{Query, State};
use axum::Json;
use todolist_core::overdue::CloseReport;

use crate::error::AppResult;
use crate::query::OverdueParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/maintenance/overdue
///
/// Dry run: lists the tasks that would be closed, writes nothing.
pub async fn overdue_status(
    State(state): State<AppState>,
    Query(params): Query<OverdueParams>,
) -> AppResult<Json<DataResponse<CloseReport>>> {
    let as_of = params.as_of()?.unwrap_or_else(|| state.overdue.today());
    let report = state.overdue.close_overdue_tasks(as_of, true).await?;
    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/maintenance/overdue/close
///
/// Manual run. Honors `?dry_run=true`.
pub async fn close_overdue(
    State(state): State<AppState>,
    Query(params): Query<OverdueParams>,
) -> AppResult<Json<DataResponse<CloseReport>>> {
    let as_of = params.as_of()?.unwrap_or_else(|| state.overdue.today());
    let report = state
        .overdue
        .close_overdue_tasks(as_of, params.dry_run)
        .await?;
    tracing::info!(
        %as_of,
        dry_run = params.dry_run,
        closed = report.closed_count(),
        failed = report.failed_count(),
        "Manual overdue run requested"
    );
    Ok(Json(DataResponse { data: report }))
}
