//! HTTP-level integration tests for tasks.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_project, create_task, delete, get, patch_json, post_json, put_json,
};
use serde_json::json;
use todolist_core::config::TodoConfig;

fn tasks_uri(project_id: i64) -> String {
    format!("/api/v1/projects/{project_id}/tasks")
}

fn task_uri(project_id: i64, task_id: i64) -> String {
    format!("/api/v1/projects/{project_id}/tasks/{task_id}")
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_task_defaults_to_todo() {
    let app = common::build_test_app();
    let p = create_project(app.app(), "Launch").await;

    let response = post_json(
        app.app(),
        &tasks_uri(p),
        json!({ "name": "Write copy", "deadline": "2025-06-20" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["status"], "todo");
    assert_eq!(json["project_id"], p);
    assert_eq!(json["deadline"], "2025-06-20");
    assert!(json["closed_at"].is_null());
}

#[tokio::test]
async fn create_task_in_missing_project_returns_404() {
    let app = common::build_test_app();
    let response = post_json(app.app(), &tasks_uri(42), json!({ "name": "orphan" })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn task_names_are_unique_per_project() {
    let app = common::build_test_app();
    let a = create_project(app.app(), "A").await;
    let b = create_project(app.app(), "B").await;

    create_task(app.app(), a, json!({ "name": "Setup" })).await;
    create_task(app.app(), b, json!({ "name": "Setup" })).await;

    let response = post_json(app.app(), &tasks_uri(a), json!({ "name": "Setup" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn deadline_rules() {
    let app = common::build_test_app();
    let p = create_project(app.app(), "P").await;

    // today (2025-06-15) is accepted
    let response = post_json(
        app.app(),
        &tasks_uri(p),
        json!({ "name": "today", "deadline": "2025-06-15" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(
        app.app(),
        &tasks_uri(p),
        json!({ "name": "past", "deadline": "2025-06-14" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["reason"], "past_date");

    let response = post_json(
        app.app(),
        &tasks_uri(p),
        json!({ "name": "bad", "deadline": "20/06/2025" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["reason"], "bad_format");

    let response = post_json(
        app.app(),
        &tasks_uri(p),
        json!({ "name": "blank", "deadline": "" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(body_json(response).await["deadline"].is_null());
}

#[tokio::test]
async fn invalid_status_returns_400() {
    let app = common::build_test_app();
    let p = create_project(app.app(), "P").await;
    let response = post_json(
        app.app(),
        &tasks_uri(p),
        json!({ "name": "t", "status": "blocked" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["field"], "status");
    assert_eq!(json["reason"], "invalid_status");
}

#[tokio::test]
async fn task_limit_is_per_project() {
    let app = common::build_test_app_with(TodoConfig {
        max_tasks_per_project: 1,
        ..TodoConfig::default()
    });
    let a = create_project(app.app(), "A").await;
    let b = create_project(app.app(), "B").await;
    create_task(app.app(), a, json!({ "name": "only" })).await;

    let response = post_json(app.app(), &tasks_uri(a), json!({ "name": "second" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "LIMIT_REACHED");

    create_task(app.app(), b, json!({ "name": "only" })).await;
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

#[tokio::test]
async fn task_is_only_visible_under_its_project() {
    let app = common::build_test_app();
    let a = create_project(app.app(), "A").await;
    let b = create_project(app.app(), "B").await;
    let t = create_task(app.app(), a, json!({ "name": "t" })).await;

    assert_eq!(get(app.app(), &task_uri(a, t)).await.status(), StatusCode::OK);
    assert_eq!(get(app.app(), &task_uri(b, t)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(delete(app.app(), &task_uri(b, t)).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_tasks_in_project_and_across_projects() {
    let app = common::build_test_app();
    let a = create_project(app.app(), "A").await;
    let b = create_project(app.app(), "B").await;
    create_task(app.app(), a, json!({ "name": "a1" })).await;
    create_task(app.app(), b, json!({ "name": "b1" })).await;
    create_task(app.app(), a, json!({ "name": "a2" })).await;

    let json = body_json(get(app.app(), &tasks_uri(a)).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let json = body_json(get(app.app(), "/api/v1/tasks?limit=2").await).await;
    let names: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["a1", "b1"]);
}

// ---------------------------------------------------------------------------
// Update, status, delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_task_partial_fields() {
    let app = common::build_test_app();
    let p = create_project(app.app(), "P").await;
    let t = create_task(app.app(), p, json!({ "name": "t", "description": "first" })).await;

    let response = put_json(
        app.app(),
        &task_uri(p, t),
        json!({ "name": "renamed", "status": " Doing " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "renamed");
    assert_eq!(json["status"], "doing");
    assert_eq!(json["description"], "first");
}

#[tokio::test]
async fn manual_done_leaves_closed_at_null() {
    let app = common::build_test_app();
    let p = create_project(app.app(), "Launch").await;
    let t = create_task(
        app.app(),
        p,
        json!({ "name": "Write copy", "status": "todo", "deadline": "2025-07-01" }),
    )
    .await;

    let response = patch_json(
        app.app(),
        &format!("{}/status", task_uri(p, t)),
        json!({ "status": "done" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "done");
    assert!(json["closed_at"].is_null());
    assert_eq!(json["deadline"], "2025-07-01");
}

#[tokio::test]
async fn status_patch_rejects_unknown_status() {
    let app = common::build_test_app();
    let p = create_project(app.app(), "P").await;
    let t = create_task(app.app(), p, json!({ "name": "t" })).await;

    let response = patch_json(
        app.app(),
        &format!("{}/status", task_uri(p, t)),
        json!({ "status": "archived" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_task_returns_204() {
    let app = common::build_test_app();
    let p = create_project(app.app(), "P").await;
    let t = create_task(app.app(), p, json!({ "name": "t" })).await;

    assert_eq!(delete(app.app(), &task_uri(p, t)).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(get(app.app(), &task_uri(p, t)).await.status(), StatusCode::NOT_FOUND);
}
