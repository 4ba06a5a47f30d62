//! Route definitions for the `/projects` resource, with tasks nested under
//! `/projects/{project_id}/tasks`.

use axum::routing::get;
use axum::Router;

use crate::handlers::project;
use crate::routes::task;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                  -> list
/// POST   /                  -> create
/// GET    /{id}              -> get_by_id
/// PUT    /{id}              -> update
/// DELETE /{id}              -> delete
/// ...    /{project_id}/tasks -> see routes::task
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .nest("/{project_id}/tasks", task::router())
}
