// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// 搜索结果每页条数，分页偏移必须是它的整数倍
pub const PAGE_SIZE: u32 = 25;

/// 分页偏移上限，目标站点不会返回更深的分页
pub const MAX_START_OFFSET: u32 = 1000;

/// 任务实体
///
/// 表示一次临时抓取请求。任务由入队操作创建，只会被处理器修改，
/// 进入 Completed/Failed 后不可再变更。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// 任务唯一标识符
    pub id: Uuid,
    /// 所属用户ID
    pub owner_id: Uuid,
    /// 搜索参数
    pub params: SearchParams,
    /// 任务状态
    pub status: TaskStatus,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 开始处理时间
    pub started_at: Option<DateTime<FixedOffset>>,
    /// 完成时间（成功或失败）
    pub completed_at: Option<DateTime<FixedOffset>>,
    /// 失败原因
    pub error_message: Option<String>,
    /// 结果摘要
    pub result: Option<ScrapeSummary>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
}

/// 任务状态枚举
///
/// 状态转换是单向的：
/// Pending → Processing → Completed/Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// 已入队，等待处理
    #[default]
    Pending,
    /// 正在处理
    Processing,
    /// 已完成
    Completed,
    /// 已失败（终态，不会自动重试）
    Failed,
}

impl TaskStatus {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Processing => write!(f, "processing"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "processing" => Ok(TaskStatus::Processing),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            _ => Err(()),
        }
    }
}

/// 工作模式过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkMode {
    /// 现场办公
    OnSite,
    /// 远程
    Remote,
    /// 混合
    Hybrid,
}

impl WorkMode {
    /// 目标站点 `f_WT` 参数值
    pub fn as_query_value(&self) -> &'static str {
        match self {
            WorkMode::OnSite => "1",
            WorkMode::Remote => "2",
            WorkMode::Hybrid => "3",
        }
    }
}

/// 发布时间窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DatePosted {
    #[default]
    AnyTime,
    PastDay,
    PastWeek,
    PastMonth,
}

impl DatePosted {
    /// 目标站点 `f_TPR` 参数值，AnyTime 不带该参数
    pub fn as_query_value(&self) -> Option<&'static str> {
        match self {
            DatePosted::AnyTime => None,
            DatePosted::PastDay => Some("r86400"),
            DatePosted::PastWeek => Some("r604800"),
            DatePosted::PastMonth => Some("r2592000"),
        }
    }
}

/// 搜索参数
///
/// 同时用于临时任务和用户保存的定时搜索
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    /// 关键词
    pub keywords: String,
    /// 地点
    #[serde(default)]
    pub location: Option<String>,
    /// 工作模式
    #[serde(default)]
    pub work_mode: Option<WorkMode>,
    /// 发布时间窗口
    #[serde(default)]
    pub date_posted: DatePosted,
    /// 分页偏移
    #[serde(default)]
    pub start: u32,
}

impl SearchParams {
    /// 创建只包含关键词的搜索参数
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            location: None,
            work_mode: None,
            date_posted: DatePosted::AnyTime,
            start: 0,
        }
    }

    /// 校验搜索参数
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 参数合法
    /// * `Err(DomainError::ValidationError)` - 参数不合法
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.keywords.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "keywords cannot be empty".to_string(),
            ));
        }
        if self.start % PAGE_SIZE != 0 {
            return Err(DomainError::ValidationError(format!(
                "start must be a multiple of {}",
                PAGE_SIZE
            )));
        }
        if self.start > MAX_START_OFFSET {
            return Err(DomainError::ValidationError(format!(
                "start must not exceed {}",
                MAX_START_OFFSET
            )));
        }
        Ok(())
    }
}

/// 一次抓取的结果摘要
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeSummary {
    /// 解析并通过过滤的职位数
    pub jobs_found: u32,
    /// 新写入的职位数
    pub jobs_added: u32,
    /// 实际使用的传输通道
    pub transport: Option<String>,
}

/// 领域错误类型
#[derive(Error, Debug)]
pub enum DomainError {
    /// 无效的状态转换
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: TaskStatus, to: TaskStatus },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl Task {
    /// 创建一个新的待处理任务
    pub fn new(owner_id: Uuid, params: SearchParams) -> Self {
        let now: DateTime<FixedOffset> = Utc::now().into();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            params,
            status: TaskStatus::Pending,
            created_at: now,
            started_at: None,
            completed_at: None,
            error_message: None,
            result: None,
            updated_at: now,
        }
    }

    /// 开始处理
    ///
    /// Pending → Processing
    pub fn start(mut self) -> Result<Self, DomainError> {
        match self.status {
            TaskStatus::Pending => {
                let now = Utc::now().into();
                self.status = TaskStatus::Processing;
                self.started_at = Some(now);
                self.updated_at = now;
                Ok(self)
            }
            from => Err(DomainError::InvalidStateTransition {
                from,
                to: TaskStatus::Processing,
            }),
        }
    }

    /// 完成任务
    ///
    /// Processing → Completed
    pub fn complete(mut self, summary: ScrapeSummary) -> Result<Self, DomainError> {
        match self.status {
            TaskStatus::Processing => {
                let now = Utc::now().into();
                self.status = TaskStatus::Completed;
                self.completed_at = Some(now);
                self.updated_at = now;
                self.result = Some(summary);
                Ok(self)
            }
            from => Err(DomainError::InvalidStateTransition {
                from,
                to: TaskStatus::Completed,
            }),
        }
    }

    /// 标记任务失败
    ///
    /// Pending/Processing → Failed。Pending 任务只会在进程重启恢复时直接失败。
    pub fn fail(mut self, message: impl Into<String>) -> Result<Self, DomainError> {
        match self.status {
            TaskStatus::Pending | TaskStatus::Processing => {
                let now = Utc::now().into();
                self.status = TaskStatus::Failed;
                self.completed_at = Some(now);
                self.updated_at = now;
                self.error_message = Some(message.into());
                Ok(self)
            }
            from => Err(DomainError::InvalidStateTransition {
                from,
                to: TaskStatus::Failed,
            }),
        }
    }
}
