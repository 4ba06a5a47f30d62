pub mod health;
pub mod maintenance;
pub mod project;
pub mod task;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects                                        list, create
/// /projects/{id}                                   get, update, delete
/// /projects/{project_id}/tasks                     list, create
/// /projects/{project_id}/tasks/{id}                get, update, delete
/// /projects/{project_id}/tasks/{id}/status         update status (PATCH)
///
/// /tasks                                           list across projects
///
/// /maintenance/overdue                             dry-run report
/// /maintenance/overdue/close                       run now (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", project::router())
        .route("/tasks", get(handlers::task::list_all))
        .nest("/maintenance", maintenance::router())
}
