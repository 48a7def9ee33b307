// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::task::{DomainError, SearchParams, Task, TaskStatus};
use crate::domain::repositories::task_repository::{RepositoryError, TaskRepository};
use crate::queue::task_queue::{QueueError, QueuedTask, ScrapeSubmitter, TaskOutcome, TaskQueue};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// 进程重启时仍处于处理中的任务使用的失败原因
pub const INTERRUPTED_MESSAGE: &str = "interrupted by process restart";

#[derive(Error, Debug)]
pub enum TaskServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
    #[error("Task not found")]
    NotFound,
}

/// 恢复结果
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryReport {
    pub requeued: usize,
    pub interrupted: usize,
}

/// 任务服务
///
/// 负责任务的创建、入队与查询。任务只会被 ScrapeWorker 推进状态。
pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
    queue: Arc<dyn TaskQueue>,
}

impl TaskService {
    pub fn new(repository: Arc<dyn TaskRepository>, queue: Arc<dyn TaskQueue>) -> Self {
        Self { repository, queue }
    }

    /// 创建并入队一个抓取任务
    ///
    /// # 参数
    ///
    /// * `owner_id` - 用户ID
    /// * `params` - 搜索参数
    ///
    /// # 返回值
    ///
    /// * `Ok(Task)` - 已持久化的 pending 任务
    /// * `Err(TaskServiceError)` - 参数不合法、持久化或入队失败
    #[instrument(skip(self, params), fields(owner_id = %owner_id))]
    pub async fn enqueue_task(
        &self,
        owner_id: Uuid,
        params: SearchParams,
    ) -> Result<Task, TaskServiceError> {
        let (task, _) = self.persist_and_push(owner_id, params, false).await?;
        info!(task_id = %task.id, queued = self.queue.len(), "Task enqueued");
        Ok(task)
    }

    /// 查询任务状态
    ///
    /// 指定 `owner_id` 时，其他用户的任务视为不存在
    pub async fn get_task_status(
        &self,
        task_id: Uuid,
        owner_id: Option<Uuid>,
    ) -> Result<Task, TaskServiceError> {
        let task = self
            .repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskServiceError::NotFound)?;

        match owner_id {
            Some(owner) if owner != task.owner_id => Err(TaskServiceError::NotFound),
            _ => Ok(task),
        }
    }

    /// 列出用户的任务，最新的在前
    pub async fn list_owner_tasks(&self, owner_id: Uuid) -> Result<Vec<Task>, TaskServiceError> {
        Ok(self.repository.list_by_owner(owner_id).await?)
    }

    /// 启动时恢复上一进程遗留的任务
    ///
    /// pending 任务按创建顺序重新入队，processing 任务直接标记失败
    pub async fn recover_unfinished(&self) -> Result<RecoveryReport, TaskServiceError> {
        let mut report = RecoveryReport::default();

        for task in self.repository.find_by_status(TaskStatus::Processing).await? {
            let failed = task.fail(INTERRUPTED_MESSAGE)?;
            self.repository.update(&failed).await?;
            report.interrupted += 1;
        }

        for task in self.repository.find_by_status(TaskStatus::Pending).await? {
            self.queue.enqueue(QueuedTask::new(task)).await?;
            report.requeued += 1;
        }

        if report.requeued > 0 || report.interrupted > 0 {
            warn!(
                requeued = report.requeued,
                interrupted = report.interrupted,
                "Recovered unfinished tasks"
            );
        }
        Ok(report)
    }

    async fn persist_and_push(
        &self,
        owner_id: Uuid,
        params: SearchParams,
        wait: bool,
    ) -> Result<(Task, Option<tokio::sync::oneshot::Receiver<TaskOutcome>>), TaskServiceError>
    {
        params.validate()?;
        let task = self.repository.create(&Task::new(owner_id, params)).await?;

        let (item, rx) = if wait {
            let (item, rx) = QueuedTask::with_responder(task.clone());
            (item, Some(rx))
        } else {
            (QueuedTask::new(task.clone()), None)
        };

        if let Err(e) = self.queue.enqueue(item).await {
            let failed = task.fail(e.to_string())?;
            self.repository.update(&failed).await?;
            return Err(e.into());
        }
        Ok((task, rx))
    }
}

#[async_trait]
impl ScrapeSubmitter for TaskService {
    async fn submit_and_wait(&self, owner_id: Uuid, params: SearchParams) -> TaskOutcome {
        let (task, rx) = self
            .persist_and_push(owner_id, params, true)
            .await
            .map_err(|e| e.to_string())?;

        match rx {
            Some(rx) => rx
                .await
                .map_err(|_| format!("task {} was dropped before completion", task.id))?,
            None => Err("task has no result channel".to_string()),
        }
    }
}

#[cfg(test)]
#[path = "task_service_test.rs"]
mod tests;
