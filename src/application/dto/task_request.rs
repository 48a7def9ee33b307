// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::{
    DatePosted, SearchParams, Task, TaskStatus, WorkMode, MAX_START_OFFSET,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 创建抓取任务请求DTO
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateTaskRequestDto {
    /// 搜索关键词
    #[validate(length(min = 1, max = 200, message = "keywords cannot be empty"))]
    pub keywords: String,
    /// 地点
    #[validate(length(max = 200))]
    pub location: Option<String>,
    /// 工作模式：on_site / remote / hybrid
    pub work_mode: Option<WorkMode>,
    /// 发布时间窗口
    #[serde(default)]
    pub date_posted: DatePosted,
    /// 分页偏移，必须是 25 的整数倍
    #[serde(default)]
    #[validate(range(max = MAX_START_OFFSET))]
    pub start: u32,
}

impl From<CreateTaskRequestDto> for SearchParams {
    fn from(dto: CreateTaskRequestDto) -> Self {
        SearchParams {
            keywords: dto.keywords,
            location: dto.location,
            work_mode: dto.work_mode,
            date_posted: dto.date_posted,
            start: dto.start,
        }
    }
}

/// 任务创建响应
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskCreatedResponseDto {
    pub task_id: Uuid,
    pub status: TaskStatus,
}

impl From<&Task> for TaskCreatedResponseDto {
    fn from(task: &Task) -> Self {
        Self {
            task_id: task.id,
            status: task.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        let dto: CreateTaskRequestDto =
            serde_json::from_str(r#"{"keywords":"rust","work_mode":"remote","date_posted":"past_week"}"#)
                .unwrap();
        assert!(dto.validate().is_ok());

        let params = SearchParams::from(dto);
        assert_eq!(params.date_posted, DatePosted::PastWeek);
        assert_eq!(params.start, 0);

        let dto: CreateTaskRequestDto = serde_json::from_str(r#"{"keywords":""}"#).unwrap();
        assert!(dto.validate().is_err());

        let dto: CreateTaskRequestDto =
            serde_json::from_str(r#"{"keywords":"rust","start":2000}"#).unwrap();
        assert!(dto.validate().is_err());
    }
}
