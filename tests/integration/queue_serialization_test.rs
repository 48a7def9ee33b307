// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app_with_delay, mount_results};
use jobscout::domain::models::task::{SearchParams, TaskStatus};
use std::time::Duration;
use uuid::Uuid;

#[tokio::test]
async fn tasks_are_processed_one_at_a_time() {
    let delay = Duration::from_millis(200);
    let app = create_test_app_with_delay(delay).await;
    mount_results(&app.mock_server).await;
    let owner_id = Uuid::new_v4();

    let first = app
        .task_service
        .enqueue_task(owner_id, SearchParams::new("rust"))
        .await
        .unwrap();
    let second = app
        .task_service
        .enqueue_task(owner_id, SearchParams::new("golang"))
        .await
        .unwrap();

    let first = app.wait_for_task(first.id).await;
    let second = app.wait_for_task(second.id).await;

    assert_eq!(first.status, TaskStatus::Completed);
    assert_eq!(second.status, TaskStatus::Completed);

    let first_done = first.completed_at.unwrap();
    let second_started = second.started_at.unwrap();
    assert!(second_started >= first_done);
    assert!(
        (second_started - first_done).num_milliseconds() >= (delay.as_millis() as i64) - 20,
        "second task started too early"
    );

    // 同一用户的两次抓取命中相同的职位，第二次不会新增
    assert_eq!(first.result.unwrap().jobs_added, 2);
    assert_eq!(second.result.unwrap().jobs_added, 0);
}
