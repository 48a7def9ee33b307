// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use uuid::Uuid;

use super::task_repository::RepositoryError;
use crate::domain::models::cron::{CronExecution, CronJob, TimeSlot};

/// 定时任务仓库特质
///
/// 管理定时任务及其执行记录
#[async_trait]
pub trait CronRepository: Send + Sync {
    /// 创建定时任务，同一用户的时间槽重复时返回 `RepositoryError::Conflict`
    async fn create_job(&self, job: &CronJob) -> Result<CronJob, RepositoryError>;
    async fn find_job(&self, id: Uuid) -> Result<Option<CronJob>, RepositoryError>;
    async fn update_job(&self, job: &CronJob) -> Result<CronJob, RepositoryError>;
    /// 只写入一次执行后的簿记字段（计数、错误、last_run、next_run），
    /// 不覆盖激活状态等用户设置
    ///
    /// # 返回值
    ///
    /// * `Ok(true)` - 已写入
    /// * `Ok(false)` - 任务已被删除
    async fn record_run(&self, job: &CronJob) -> Result<bool, RepositoryError>;
    /// 删除定时任务，返回是否删除了记录
    async fn delete_job(&self, id: Uuid) -> Result<bool, RepositoryError>;
    async fn list_jobs_by_owner(&self, owner_id: Uuid) -> Result<Vec<CronJob>, RepositoryError>;
    /// 所有处于激活状态的定时任务
    async fn find_active_jobs(&self) -> Result<Vec<CronJob>, RepositoryError>;
    async fn count_jobs_by_owner(&self, owner_id: Uuid) -> Result<u64, RepositoryError>;
    async fn find_job_by_owner_and_slot(
        &self,
        owner_id: Uuid,
        slot: TimeSlot,
    ) -> Result<Option<CronJob>, RepositoryError>;

    async fn create_execution(
        &self,
        execution: &CronExecution,
    ) -> Result<CronExecution, RepositoryError>;
    async fn update_execution(
        &self,
        execution: &CronExecution,
    ) -> Result<CronExecution, RepositoryError>;
    /// 按触发时间倒序列出用户最近的执行记录
    async fn list_executions(
        &self,
        owner_id: Uuid,
        limit: u64,
    ) -> Result<Vec<CronExecution>, RepositoryError>;
}
