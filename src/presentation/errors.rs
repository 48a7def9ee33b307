// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::application::use_cases::task_service::TaskServiceError;
use crate::domain::models::task::DomainError;
use crate::domain::repositories::task_repository::RepositoryError;
use crate::queue::scheduler::SchedulerError;

/// 应用错误类型
///
/// 封装所有可能的应用层错误，按具体错误类型映射状态码
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        if let Some(err) = self.0.downcast_ref::<TaskServiceError>() {
            return match err {
                TaskServiceError::Domain(DomainError::ValidationError(_)) => {
                    StatusCode::BAD_REQUEST
                }
                TaskServiceError::Domain(_) => StatusCode::CONFLICT,
                TaskServiceError::NotFound => StatusCode::NOT_FOUND,
                TaskServiceError::Queue(_) => StatusCode::SERVICE_UNAVAILABLE,
                TaskServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
        }
        if let Some(err) = self.0.downcast_ref::<SchedulerError>() {
            return match err {
                SchedulerError::Validation(_) => StatusCode::BAD_REQUEST,
                SchedulerError::InsufficientCredits => StatusCode::FORBIDDEN,
                SchedulerError::NotFound | SchedulerError::OwnerNotFound => StatusCode::NOT_FOUND,
                SchedulerError::Repository(_) | SchedulerError::Trigger(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
        }
        if self.0.downcast_ref::<validator::ValidationErrors>().is_some() {
            return StatusCode::BAD_REQUEST;
        }
        match self.0.downcast_ref::<RepositoryError>() {
            Some(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            Some(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {:#}", self.0);
        }

        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
