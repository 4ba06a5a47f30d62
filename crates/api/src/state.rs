use std::sync::Arc;

use todolist_core::overdue::OverdueCloser;
use todolist_core::service::TodoService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Project and task operations.
    pub service: Arc<TodoService>,
    /// Overdue auto-close job, shared with the in-process scheduler.
    pub overdue: Arc<OverdueCloser>,
    pub config: Arc<ServerConfig>,
}
