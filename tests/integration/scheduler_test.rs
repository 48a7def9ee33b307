// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, mount_results, TestApp};
use chrono::{Duration, Utc};
use jobscout::domain::models::cron::{CronJob, ExecutionStatus};
use jobscout::domain::models::owner::{CreditBalance, PlanTier};
use jobscout::domain::repositories::cron_repository::CronRepository;
use jobscout::domain::repositories::listing_repository::ListingRepository;
use jobscout::domain::repositories::owner_repository::OwnerRepository;
use jobscout::domain::repositories::task_repository::TaskRepository;
use jobscout::queue::scheduler::INSUFFICIENT_CREDITS_MESSAGE;

async fn make_due(app: &TestApp, job: &CronJob) {
    let mut job = app.crons.find_job(job.id).await.unwrap().unwrap();
    job.next_run = Some((Utc::now() - Duration::minutes(1)).into());
    app.crons.update_job(&job).await.unwrap();
}

#[tokio::test]
async fn due_cron_job_runs_through_queue_and_worker() {
    let app = create_test_app().await;
    mount_results(&app.mock_server).await;
    let owner_id = app.create_owner(PlanTier::Free, 2).await;

    let job = app.scheduler.add_cron_job(owner_id, "10:00").await.unwrap();
    make_due(&app, &job).await;

    let fired = app.scheduler.run_due_sweep(Utc::now()).await.unwrap();
    assert_eq!(fired, 1);

    let executions = app.scheduler.list_cron_executions(owner_id, None).await.unwrap();
    assert_eq!(executions.len(), 1);
    let execution = &executions[0];
    assert_eq!(execution.status, ExecutionStatus::Completed);
    assert_eq!(execution.jobs_found, 2);
    assert_eq!(execution.jobs_added, 2);
    assert_eq!(execution.proxy_used.as_deref(), Some("direct"));

    let owner = app.owners.find(owner_id).await.unwrap().unwrap();
    assert_eq!(owner.credits, CreditBalance::Limited(1));
    assert_eq!(app.listings.list_by_owner(owner_id).await.unwrap().len(), 2);

    let job = app.crons.find_job(job.id).await.unwrap().unwrap();
    assert_eq!(job.run_count, 1);
    assert!(job.next_run.unwrap().with_timezone(&Utc) > Utc::now());

    // 同一个时间槽不会再次执行
    assert_eq!(app.scheduler.run_due_sweep(Utc::now()).await.unwrap(), 0);
}

#[tokio::test]
async fn exhausted_credits_skip_the_scrape() {
    let app = create_test_app().await;
    mount_results(&app.mock_server).await;
    let owner_id = app.create_owner(PlanTier::Free, 0).await;

    let job = app.scheduler.add_cron_job(owner_id, "08:30").await.unwrap();
    make_due(&app, &job).await;

    let execution = app
        .scheduler
        .fire_job(job.id, Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(execution.status, ExecutionStatus::Failed);
    assert_eq!(
        execution.error_message.as_deref(),
        Some(INSUFFICIENT_CREDITS_MESSAGE)
    );

    let requests = app.mock_server.received_requests().await.unwrap();
    assert!(requests.is_empty());
    assert!(app.tasks.list_by_owner(owner_id).await.unwrap().is_empty());

    let job = app.crons.find_job(job.id).await.unwrap().unwrap();
    assert_eq!(job.error_count, 1);
    assert_eq!(job.run_count, 0);
}

#[tokio::test]
async fn unlimited_owner_is_never_gated() {
    let app = create_test_app().await;
    mount_results(&app.mock_server).await;
    let owner_id = app.create_owner(PlanTier::Unlimited, 0).await;

    let job = app.scheduler.add_cron_job(owner_id, "23:59").await.unwrap();
    make_due(&app, &job).await;

    let execution = app
        .scheduler
        .fire_job(job.id, Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(execution.status, ExecutionStatus::Completed);

    let owner = app.owners.find(owner_id).await.unwrap().unwrap();
    assert_eq!(owner.credits, CreditBalance::Unlimited);
}
