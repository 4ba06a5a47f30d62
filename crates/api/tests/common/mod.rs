#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use tower::ServiceExt;

use todolist_api::config::{ServerConfig, StorageBackend};
use todolist_api::router::build_app_router;
use todolist_api::state::AppState;
use todolist_core::clock::FixedClock;
use todolist_core::config::TodoConfig;
use todolist_core::overdue::OverdueCloser;
use todolist_core::service::TodoService;
use todolist_core::storage::MemoryStorage;

/// The date every test app starts on.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

/// Build a test `ServerConfig` with safe defaults and in-memory storage.
pub fn test_config(todo: TodoConfig) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        storage_backend: StorageBackend::Memory,
        scheduler_enabled: false,
        todo,
    }
}

/// A router over fresh in-memory storage, plus handles to the pieces tests
/// need to reach behind the HTTP surface.
pub struct TestApp {
    pub router: Router,
    pub clock: Arc<FixedClock>,
    pub storage: Arc<MemoryStorage>,
}

impl TestApp {
    /// A clone of the router; clones share the same state.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

pub fn build_test_app() -> TestApp {
    build_test_app_with(TodoConfig::default())
}

/// Build the full application router with all middleware layers, exactly as
/// `main.rs` does, backed by in-memory storage and a clock pinned to [`today`].
pub fn build_test_app_with(todo: TodoConfig) -> TestApp {
    let config = test_config(todo);
    let storage = Arc::new(MemoryStorage::new());
    let clock = Arc::new(FixedClock::at_date(today()));

    let state = AppState {
        service: Arc::new(TodoService::new(
            storage.clone(),
            clock.clone(),
            config.todo.clone(),
        )),
        overdue: Arc::new(OverdueCloser::new(storage.clone(), clock.clone())),
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        clock,
        storage,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a project and return its id.
pub async fn create_project(app: Router, name: &str) -> i64 {
    let response = post_json(app, "/api/v1/projects", serde_json::json!({ "name": name })).await;
    assert_eq!(response.status(), 201, "creating project {name:?}");
    body_json(response).await["id"].as_i64().unwrap()
}

/// Create a task in `project_id` and return its id.
pub async fn create_task(app: Router, project_id: i64, body: serde_json::Value) -> i64 {
    let response = post_json(app, &format!("/api/v1/projects/{project_id}/tasks"), body).await;
    assert_eq!(response.status(), 201, "creating task");
    body_json(response).await["id"].as_i64().unwrap()
}
