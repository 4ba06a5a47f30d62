//! Route definitions for maintenance jobs.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::maintenance;
use crate::state::AppState;

/// Routes mounted at `/maintenance`.
///
/// ```text
/// GET    /overdue          -> overdue_status
/// POST   /overdue/close    -> close_overdue
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/overdue", get(maintenance::overdue_status))
        .route("/overdue/close", post(maintenance::close_overdue))
}
