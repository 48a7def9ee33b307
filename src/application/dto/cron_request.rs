// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 创建定时任务请求
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateCronJobRequestDto {
    /// 每日执行时间，`HH:MM`（UTC）
    #[validate(length(equal = 5, message = "time_slot must be HH:MM"))]
    pub time_slot: String,
}

/// 启用/停用定时任务请求
#[derive(Debug, Deserialize, Serialize)]
pub struct SetCronJobActiveRequestDto {
    pub is_active: bool,
}

/// 执行记录查询参数
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ExecutionQueryDto {
    /// 返回条数，超出 1..=100 时截断
    pub limit: Option<u64>,
}
