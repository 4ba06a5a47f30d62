//! Handlers for tasks, nested under `/projects/{project_id}/tasks` plus the
//! cross-project `/tasks` listing.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use todolist_core::models::{CreateTask, Task, UpdateTask};
use todolist_core::types::DbId;

use crate::error::AppResult;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PATCH .../tasks/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskStatus {
    pub status: String,
}

/// POST /api/v1/projects/{project_id}/tasks
pub async fn create(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateTask>,
) -> AppResult<(StatusCode, Json<Task>)> {
    let task = state.service.create_task(project_id, input).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/v1/projects/{project_id}/tasks
pub async fn list_by_project(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Task>>>> {
    let tasks = state
        .service
        .list_tasks(Some(project_id), params.page())
        .await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// GET /api/v1/tasks
pub async fn list_all(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Task>>>> {
    let tasks = state.service.list_tasks(None, params.page()).await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// GET /api/v1/projects/{project_id}/tasks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<Task>> {
    Ok(Json(state.service.get_task(project_id, id).await?))
}

/// PUT /api/v1/projects/{project_id}/tasks/{id}
pub async fn update(
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateTask>,
) -> AppResult<Json<Task>> {
    Ok(Json(state.service.update_task(project_id, id, input).await?))
}

/// PATCH /api/v1/projects/{project_id}/tasks/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateTaskStatus>,
) -> AppResult<Json<Task>> {
    let task = state
        .service
        .update_task_status(project_id, id, &input.status)
        .await?;
    Ok(Json(task))
}

/// DELETE /api/v1/projects/{project_id}/tasks/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    state.service.delete_task(project_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
