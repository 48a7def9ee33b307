// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::SchedulerSettings;
use crate::domain::models::cron::{CronExecution, CronJob, TimeSlot};
use crate::domain::models::owner::CreditBalance;
use crate::domain::models::task::{DomainError, ScrapeSummary};
use crate::domain::repositories::cron_repository::CronRepository;
use crate::domain::repositories::owner_repository::OwnerRepository;
use crate::domain::repositories::task_repository::RepositoryError;
use crate::queue::task_queue::ScrapeSubmitter;
use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use thiserror::Error;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// 触发时间与 next_run 的容差，超出则认为本时间槽已经执行过
const DOUBLE_FIRE_TOLERANCE_SECS: i64 = 60;

/// 执行记录查询的默认条数与上限
const DEFAULT_EXECUTION_LIMIT: u64 = 20;
const MAX_EXECUTION_LIMIT: u64 = 100;

pub const INSUFFICIENT_CREDITS_MESSAGE: &str = "Insufficient credits";

/// 调度器错误类型
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("{}", INSUFFICIENT_CREDITS_MESSAGE)]
    InsufficientCredits,
    #[error("Cron job not found")]
    NotFound,
    #[error("Owner not found")]
    OwnerNotFound,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Trigger error: {0}")]
    Trigger(String),
}

impl From<DomainError> for SchedulerError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::ValidationError(message) => SchedulerError::Validation(message),
            other => SchedulerError::Validation(other.to_string()),
        }
    }
}

impl From<JobSchedulerError> for SchedulerError {
    fn from(err: JobSchedulerError) -> Self {
        SchedulerError::Trigger(format!("{:?}", err))
    }
}

/// 执行中的定时任务标记，离开作用域时移除
struct InFlight<'a> {
    set: &'a Mutex<HashSet<Uuid>>,
    job_id: Uuid,
}

impl<'a> InFlight<'a> {
    fn acquire(set: &'a Mutex<HashSet<Uuid>>, job_id: Uuid) -> Option<Self> {
        if set.lock().insert(job_id) {
            Some(Self { set, job_id })
        } else {
            None
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.job_id);
    }
}

/// 定时任务调度器
///
/// 为每个激活的定时任务注册一个每日触发器，另外注册每日积分重置与
/// 周期性的到期扫描。触发后的抓取通过 ScrapeSubmitter 交给任务队列，
/// 与临时任务共用同一个串行工作器。
pub struct CronScheduler {
    cron_repository: Arc<dyn CronRepository>,
    owner_repository: Arc<dyn OwnerRepository>,
    submitter: Arc<dyn ScrapeSubmitter>,
    settings: SchedulerSettings,
    /// 触发器运行时，initialize 之前为 None
    runtime: tokio::sync::Mutex<Option<JobScheduler>>,
    /// 定时任务ID → 触发器ID
    triggers: tokio::sync::Mutex<HashMap<Uuid, Uuid>>,
    in_flight: Mutex<HashSet<Uuid>>,
}

impl CronScheduler {
    pub fn new(
        cron_repository: Arc<dyn CronRepository>,
        owner_repository: Arc<dyn OwnerRepository>,
        submitter: Arc<dyn ScrapeSubmitter>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            cron_repository,
            owner_repository,
            submitter,
            settings,
            runtime: tokio::sync::Mutex::new(None),
            triggers: tokio::sync::Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// 启动触发器运行时
    ///
    /// 注册所有激活任务的触发器、每日积分重置和到期扫描
    pub async fn initialize(self: &Arc<Self>) -> Result<(), SchedulerError> {
        let reset_slot: TimeSlot = self.settings.credit_reset_slot.parse()?;

        let runtime = JobScheduler::new().await?;
        *self.runtime.lock().await = Some(runtime.clone());

        let jobs = self.cron_repository.find_active_jobs().await?;
        for job in &jobs {
            self.arm(job).await?;
        }

        let weak = Arc::downgrade(self);
        runtime
            .add(Job::new_async(
                reset_slot.cron_expression().as_str(),
                move |_uuid, _lock| {
                    let scheduler = weak.clone();
                    Box::pin(async move {
                        if let Some(scheduler) = scheduler.upgrade() {
                            if let Err(e) = scheduler.reset_credits().await {
                                error!("Daily credit reset failed: {}", e);
                            }
                        }
                    })
                },
            )?)
            .await?;

        let weak = Arc::downgrade(self);
        runtime
            .add(Job::new_repeated_async(
                std::time::Duration::from_secs(self.settings.sweep_interval_secs.max(1)),
                move |_uuid, _lock| {
                    let scheduler = weak.clone();
                    Box::pin(async move {
                        if let Some(scheduler) = scheduler.upgrade() {
                            if let Err(e) = scheduler.run_due_sweep(Utc::now()).await {
                                error!("Due job sweep failed: {}", e);
                            }
                        }
                    })
                },
            )?)
            .await?;

        runtime.start().await?;
        info!(
            jobs = jobs.len(),
            credit_reset = %reset_slot,
            sweep_interval_secs = self.settings.sweep_interval_secs,
            "Cron scheduler started"
        );
        Ok(())
    }

    /// 停止触发器运行时并清空触发器映射
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        let runtime = self.runtime.lock().await.take();
        self.triggers.lock().await.clear();
        if let Some(mut runtime) = runtime {
            runtime.shutdown().await?;
            info!("Cron scheduler stopped");
        }
        Ok(())
    }

    /// 已注册触发器的定时任务数
    pub async fn armed_jobs(&self) -> usize {
        self.triggers.lock().await.len()
    }

    async fn arm(self: &Arc<Self>, job: &CronJob) -> Result<(), SchedulerError> {
        let runtime = self.runtime.lock().await;
        let Some(runtime) = runtime.as_ref() else {
            return Ok(());
        };

        let weak: Weak<Self> = Arc::downgrade(self);
        let job_id = job.id;
        let trigger = Job::new_async(
            job.time_slot.cron_expression().as_str(),
            move |_uuid, _lock| {
                let scheduler = weak.clone();
                Box::pin(async move {
                    if let Some(scheduler) = scheduler.upgrade() {
                        if let Err(e) = scheduler.fire_job(job_id, Utc::now()).await {
                            error!(cron_job_id = %job_id, "Cron job firing failed: {}", e);
                        }
                    }
                })
            },
        )?;

        let trigger_id = runtime.add(trigger).await?;
        let previous = self.triggers.lock().await.insert(job.id, trigger_id);
        if let Some(previous) = previous {
            runtime.remove(&previous).await?;
        }
        debug!(cron_job_id = %job.id, slot = %job.time_slot, "Trigger armed");
        Ok(())
    }

    async fn disarm(&self, job_id: Uuid) -> Result<(), SchedulerError> {
        let runtime = self.runtime.lock().await;
        let trigger = self.triggers.lock().await.remove(&job_id);
        if let (Some(runtime), Some(trigger)) = (runtime.as_ref(), trigger) {
            runtime.remove(&trigger).await?;
            debug!(cron_job_id = %job_id, "Trigger disarmed");
        }
        Ok(())
    }

    /// 执行一次定时任务
    ///
    /// # 返回值
    ///
    /// * `Ok(Some(CronExecution))` - 本次执行的终态记录
    /// * `Ok(None)` - 任务不存在、已停用、正在执行或本时间槽已执行过
    #[instrument(skip(self), fields(cron_job_id = %job_id))]
    pub async fn fire_job(
        &self,
        job_id: Uuid,
        fired_at: DateTime<Utc>,
    ) -> Result<Option<CronExecution>, SchedulerError> {
        let Some(_guard) = InFlight::acquire(&self.in_flight, job_id) else {
            debug!("Cron job already running, skipping");
            return Ok(None);
        };

        let Some(mut job) = self.cron_repository.find_job(job_id).await? else {
            warn!("Cron job disappeared before firing");
            return Ok(None);
        };
        if !job.is_active {
            return Ok(None);
        }
        if let Some(next_run) = job.next_run {
            if next_run.with_timezone(&Utc) > fired_at + Duration::seconds(DOUBLE_FIRE_TOLERANCE_SECS)
            {
                debug!(next_run = %next_run, "Slot already executed, skipping");
                return Ok(None);
            }
        }

        let mut execution = self
            .cron_repository
            .create_execution(&CronExecution::new(job.id, job.owner_id, fired_at))
            .await?;
        execution.mark_running();
        let mut execution = self.cron_repository.update_execution(&execution).await?;

        let result = self.run_scrape(&job).await;
        let now = Utc::now();
        match &result {
            Ok(summary) => {
                execution.complete(summary, now);
                job.record_success(fired_at, now);
                info!(
                    jobs_found = summary.jobs_found,
                    jobs_added = summary.jobs_added,
                    "Cron execution completed"
                );
            }
            Err(message) => {
                execution.fail(message.clone(), now);
                job.record_failure(message, fired_at, now);
                warn!("Cron execution failed: {}", message);
            }
        }
        counter!("cron_executions_total", "outcome" => execution.status.to_string()).increment(1);

        // 抓取期间用户可能停用或删除了任务，只回写执行相关字段
        let stored = self.store_final_execution(&execution).await;
        if !self.cron_repository.record_run(&job).await? {
            info!("Cron job removed while firing, execution kept");
        }
        Ok(Some(stored?))
    }

    /// 写入执行记录终态，失败时重试一次
    async fn store_final_execution(
        &self,
        execution: &CronExecution,
    ) -> Result<CronExecution, SchedulerError> {
        match self.cron_repository.update_execution(execution).await {
            Ok(stored) => Ok(stored),
            Err(e) => {
                warn!(execution_id = %execution.id, "Failed to store execution result, retrying: {}", e);
                self.cron_repository
                    .update_execution(execution)
                    .await
                    .map_err(|e| {
                        error!(
                            execution_id = %execution.id,
                            status = %execution.status,
                            "Execution left in running state: {}",
                            e
                        );
                        SchedulerError::from(e)
                    })
            }
        }
    }

    /// 积分检查、扣减并提交抓取
    async fn run_scrape(&self, job: &CronJob) -> Result<ScrapeSummary, String> {
        let owner = self
            .owner_repository
            .find(job.owner_id)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| SchedulerError::OwnerNotFound.to_string())?;

        if !owner.credits.has_remaining() {
            return Err(SchedulerError::InsufficientCredits.to_string());
        }

        // 条件扣减，并发触发时落败的一方按积分不足处理
        if let CreditBalance::Limited(_) = owner.credits {
            let consumed = self
                .owner_repository
                .decrement_credit_if_positive(job.owner_id)
                .await
                .map_err(|e| e.to_string())?;
            if !consumed {
                return Err(SchedulerError::InsufficientCredits.to_string());
            }
        }

        let params = owner
            .saved_search
            .ok_or_else(|| "No saved search configured".to_string())?;

        self.submitter.submit_and_wait(job.owner_id, params).await
    }

    /// 执行所有已到期的激活任务
    ///
    /// 返回实际执行的任务数
    pub async fn run_due_sweep(&self, now: DateTime<Utc>) -> Result<usize, SchedulerError> {
        let due: Vec<CronJob> = self
            .cron_repository
            .find_active_jobs()
            .await?
            .into_iter()
            .filter(|job| job.is_due(now))
            .collect();

        let mut fired = 0;
        for job in due {
            match self.fire_job(job.id, now).await {
                Ok(Some(_)) => fired += 1,
                Ok(None) => {}
                Err(e) => error!(cron_job_id = %job.id, "Due job firing failed: {}", e),
            }
        }
        if fired > 0 {
            info!(fired, "Due job sweep finished");
        }
        Ok(fired)
    }

    /// 每日积分重置
    pub async fn reset_credits(&self) -> Result<u64, SchedulerError> {
        Ok(self.owner_repository.reset_daily_credits().await?)
    }

    /// 创建定时任务
    ///
    /// # 参数
    ///
    /// * `owner_id` - 用户ID
    /// * `slot` - 每日时间，`HH:MM`
    ///
    /// # 返回值
    ///
    /// * `Ok(CronJob)` - 已持久化并注册触发器的任务
    /// * `Err(SchedulerError::Validation)` - 时间格式错误、时间槽重复或超出套餐上限
    /// * `Err(SchedulerError::OwnerNotFound)` - 用户不存在
    pub async fn add_cron_job(
        self: &Arc<Self>,
        owner_id: Uuid,
        slot: &str,
    ) -> Result<CronJob, SchedulerError> {
        let slot: TimeSlot = slot.parse()?;

        let owner = self
            .owner_repository
            .find(owner_id)
            .await?
            .ok_or(SchedulerError::OwnerNotFound)?;

        if self
            .cron_repository
            .find_job_by_owner_and_slot(owner_id, slot)
            .await?
            .is_some()
        {
            return Err(SchedulerError::Validation(format!(
                "time slot {} is already scheduled",
                slot
            )));
        }

        let existing = self.cron_repository.count_jobs_by_owner(owner_id).await?;
        if existing >= owner.max_cron_jobs.max(0) as u64 {
            return Err(SchedulerError::Validation(format!(
                "plan {} allows at most {} cron jobs",
                owner.plan, owner.max_cron_jobs
            )));
        }

        let job = self
            .cron_repository
            .create_job(&CronJob::new(owner_id, slot, Utc::now()))
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(message) => SchedulerError::Validation(message),
                other => other.into(),
            })?;

        self.arm(&job).await?;
        info!(cron_job_id = %job.id, owner_id = %owner_id, slot = %slot, "Cron job created");
        Ok(job)
    }

    /// 删除定时任务
    ///
    /// 任务不存在或属于其他用户时返回 false
    pub async fn remove_cron_job(&self, owner_id: Uuid, job_id: Uuid) -> Result<bool, SchedulerError> {
        match self.cron_repository.find_job(job_id).await? {
            Some(job) if job.owner_id == owner_id => {
                self.disarm(job_id).await?;
                let deleted = self.cron_repository.delete_job(job_id).await?;
                info!(cron_job_id = %job_id, "Cron job removed");
                Ok(deleted)
            }
            _ => Ok(false),
        }
    }

    /// 启用或停用定时任务，启用时重新计算 next_run
    pub async fn set_active(
        self: &Arc<Self>,
        owner_id: Uuid,
        job_id: Uuid,
        active: bool,
    ) -> Result<CronJob, SchedulerError> {
        let mut job = self
            .cron_repository
            .find_job(job_id)
            .await?
            .filter(|job| job.owner_id == owner_id)
            .ok_or(SchedulerError::NotFound)?;

        let now = Utc::now();
        job.is_active = active;
        job.updated_at = now.into();
        if active {
            job.next_run = Some(job.time_slot.next_occurrence_after(now).into());
        }
        let job = self.cron_repository.update_job(&job).await?;

        if active {
            self.arm(&job).await?;
        } else {
            self.disarm(job.id).await?;
        }
        Ok(job)
    }

    pub async fn list_cron_jobs(&self, owner_id: Uuid) -> Result<Vec<CronJob>, SchedulerError> {
        Ok(self.cron_repository.list_jobs_by_owner(owner_id).await?)
    }

    /// 最近的执行记录，条数限制在 1..=100
    pub async fn list_cron_executions(
        &self,
        owner_id: Uuid,
        limit: Option<u64>,
    ) -> Result<Vec<CronExecution>, SchedulerError> {
        let limit = limit
            .unwrap_or(DEFAULT_EXECUTION_LIMIT)
            .clamp(1, MAX_EXECUTION_LIMIT);
        Ok(self.cron_repository.list_executions(owner_id, limit).await?)
    }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod tests;
