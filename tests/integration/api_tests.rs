// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, mount_results};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use jobscout::domain::models::owner::PlanTier;
use serde_json::{json, Value};
use uuid::Uuid;

fn owner_header(owner_id: Uuid) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-owner-id"),
        HeaderValue::from_str(&owner_id.to_string()).unwrap(),
    )
}

#[tokio::test]
async fn health_check_works() {
    let app = create_test_app().await;
    let response = app.server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn requests_without_owner_header_are_rejected() {
    let app = create_test_app().await;

    let response = app.server.get("/v1/tasks").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .get("/v1/tasks")
        .add_header(
            HeaderName::from_static("x-owner-id"),
            HeaderValue::from_static("not-a-uuid"),
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn task_lifecycle_over_http() {
    let app = create_test_app().await;
    mount_results(&app.mock_server).await;
    let owner_id = Uuid::new_v4();
    let (name, value) = owner_header(owner_id);

    let response = app
        .server
        .post("/v1/tasks")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "keywords": "rust", "work_mode": "remote" }))
        .await;
    response.assert_status(StatusCode::ACCEPTED);
    let body: Value = response.json();
    assert_eq!(body["status"], "pending");
    let task_id: Uuid = body["task_id"].as_str().unwrap().parse().unwrap();

    let task = app.wait_for_task(task_id).await;
    assert_eq!(task.result.unwrap().jobs_added, 2);

    let response = app
        .server
        .get(&format!("/v1/tasks/{}", task_id))
        .add_header(name.clone(), value.clone())
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "completed");
    assert_eq!(body["result"]["jobs_found"], 2);

    let response = app.server.get("/v1/tasks").add_header(name, value).await;
    let body: Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 1);

    // 其他用户看不到该任务
    let (name, value) = owner_header(Uuid::new_v4());
    let response = app
        .server
        .get(&format!("/v1/tasks/{}", task_id))
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_task_request_returns_400() {
    let app = create_test_app().await;
    let (name, value) = owner_header(Uuid::new_v4());

    let response = app
        .server
        .post("/v1/tasks")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "keywords": "" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .post("/v1/tasks")
        .add_header(name, value)
        .json(&json!({ "keywords": "rust", "start": 30 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cron_job_management_over_http() {
    let app = create_test_app().await;
    let owner_id = app.create_owner(PlanTier::Free, 5).await;
    let (name, value) = owner_header(owner_id);

    let response = app
        .server
        .post("/v1/cron-jobs")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "time_slot": "10:00" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let job: Value = response.json();
    assert_eq!(job["time_slot"], "10:00");
    assert_eq!(job["is_active"], true);
    let job_id = job["id"].as_str().unwrap().to_string();

    // 免费套餐只有一个槽位
    let response = app
        .server
        .post("/v1/cron-jobs")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "time_slot": "11:00" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .post("/v1/cron-jobs")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "time_slot": "7:5" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .patch(&format!("/v1/cron-jobs/{}", job_id))
        .add_header(name.clone(), value.clone())
        .json(&json!({ "is_active": false }))
        .await;
    response.assert_status_ok();
    let job: Value = response.json();
    assert_eq!(job["is_active"], false);

    let response = app
        .server
        .get("/v1/cron-jobs")
        .add_header(name.clone(), value.clone())
        .await;
    let jobs: Value = response.json();
    assert_eq!(jobs.as_array().unwrap().len(), 1);

    let response = app
        .server
        .get("/v1/cron-executions?limit=500")
        .add_header(name.clone(), value.clone())
        .await;
    response.assert_status_ok();
    let executions: Value = response.json();
    assert!(executions.as_array().unwrap().is_empty());

    let response = app
        .server
        .delete(&format!("/v1/cron-jobs/{}", job_id))
        .add_header(name.clone(), value.clone())
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    let response = app
        .server
        .delete(&format!("/v1/cron-jobs/{}", job_id))
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cron_job_for_unknown_owner_returns_404() {
    let app = create_test_app().await;
    let (name, value) = owner_header(Uuid::new_v4());

    let response = app
        .server
        .post("/v1/cron-jobs")
        .add_header(name, value)
        .json(&json!({ "time_slot": "10:00" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn proxy_stats_and_reset() {
    let app = create_test_app().await;
    mount_results(&app.mock_server).await;
    let owner_id = Uuid::new_v4();
    let (name, value) = owner_header(owner_id);

    let task = app
        .task_service
        .enqueue_task(owner_id, jobscout::domain::models::task::SearchParams::new("rust"))
        .await
        .unwrap();
    app.wait_for_task(task.id).await;

    let response = app
        .server
        .get("/v1/proxy/stats")
        .add_header(name.clone(), value.clone())
        .await;
    response.assert_status_ok();
    let stats: Value = response.json();
    assert_eq!(stats["total_requests"], 1);
    assert_eq!(stats["direct_requests"], 1);
    assert_eq!(stats["proxy_configured"], false);
    assert!(stats["bytes_transferred"].as_u64().unwrap() > 0);

    let response = app
        .server
        .post("/v1/proxy/stats/reset")
        .add_header(name.clone(), value.clone())
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    let stats: Value = app
        .server
        .get("/v1/proxy/stats")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(stats["total_requests"], 0);
}
