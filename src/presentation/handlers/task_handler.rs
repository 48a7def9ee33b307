// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::task_request::{CreateTaskRequestDto, TaskCreatedResponseDto};
use crate::application::use_cases::task_service::TaskService;
use crate::domain::models::task::Task;
use crate::presentation::errors::AppError;
use crate::presentation::extractors::owner_id::OwnerId;
use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// 创建抓取任务
///
/// 任务进入队列后立即返回 202，调用方通过查询接口获取结果
pub async fn create_task(
    Extension(service): Extension<Arc<TaskService>>,
    OwnerId(owner_id): OwnerId,
    Json(payload): Json<CreateTaskRequestDto>,
) -> Result<(StatusCode, Json<TaskCreatedResponseDto>), AppError> {
    payload.validate()?;
    let task = service.enqueue_task(owner_id, payload.into()).await?;
    Ok((StatusCode::ACCEPTED, Json(TaskCreatedResponseDto::from(&task))))
}

/// 查询任务状态
pub async fn get_task(
    Extension(service): Extension<Arc<TaskService>>,
    OwnerId(owner_id): OwnerId,
    Path(task_id): Path<Uuid>,
) -> Result<Json<Task>, AppError> {
    let task = service.get_task_status(task_id, Some(owner_id)).await?;
    Ok(Json(task))
}

/// 列出当前用户的任务
pub async fn list_tasks(
    Extension(service): Extension<Arc<TaskService>>,
    OwnerId(owner_id): OwnerId,
) -> Result<Json<Vec<Task>>, AppError> {
    Ok(Json(service.list_owner_tasks(owner_id).await?))
}
