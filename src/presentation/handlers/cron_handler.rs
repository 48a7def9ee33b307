// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::cron_request::{
    CreateCronJobRequestDto, ExecutionQueryDto, SetCronJobActiveRequestDto,
};
use crate::domain::models::cron::{CronExecution, CronJob};
use crate::presentation::errors::AppError;
use crate::presentation::extractors::owner_id::OwnerId;
use crate::queue::scheduler::CronScheduler;
use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub async fn create_cron_job(
    Extension(scheduler): Extension<Arc<CronScheduler>>,
    OwnerId(owner_id): OwnerId,
    Json(payload): Json<CreateCronJobRequestDto>,
) -> Result<(StatusCode, Json<CronJob>), AppError> {
    payload.validate()?;
    let job = scheduler.add_cron_job(owner_id, &payload.time_slot).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// 删除定时任务，不存在或不属于当前用户时返回 404
pub async fn delete_cron_job(
    Extension(scheduler): Extension<Arc<CronScheduler>>,
    OwnerId(owner_id): OwnerId,
    Path(job_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if scheduler.remove_cron_job(owner_id, job_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Ok(StatusCode::NOT_FOUND)
    }
}

pub async fn set_cron_job_active(
    Extension(scheduler): Extension<Arc<CronScheduler>>,
    OwnerId(owner_id): OwnerId,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<SetCronJobActiveRequestDto>,
) -> Result<Json<CronJob>, AppError> {
    let job = scheduler
        .set_active(owner_id, job_id, payload.is_active)
        .await?;
    Ok(Json(job))
}

pub async fn list_cron_jobs(
    Extension(scheduler): Extension<Arc<CronScheduler>>,
    OwnerId(owner_id): OwnerId,
) -> Result<Json<Vec<CronJob>>, AppError> {
    Ok(Json(scheduler.list_cron_jobs(owner_id).await?))
}

pub async fn list_cron_executions(
    Extension(scheduler): Extension<Arc<CronScheduler>>,
    OwnerId(owner_id): OwnerId,
    Query(query): Query<ExecutionQueryDto>,
) -> Result<Json<Vec<CronExecution>>, AppError> {
    let executions = scheduler
        .list_cron_executions(owner_id, query.limit)
        .await?;
    Ok(Json(executions))
}
