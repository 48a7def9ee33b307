// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::{ScrapeSummary, SearchParams, Task};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{oneshot, Notify};
use uuid::Uuid;

/// 任务处理结果，失败时为错误信息
pub type TaskOutcome = Result<ScrapeSummary, String>;

/// 队列错误类型
#[derive(Error, Debug)]
pub enum QueueError {
    /// 队列已关闭
    #[error("Queue closed")]
    Closed,
}

/// 队列中的一项
///
/// `responder` 用于等待处理结果的调用方（定时任务），临时任务为 None
#[derive(Debug)]
pub struct QueuedTask {
    pub task: Task,
    pub responder: Option<oneshot::Sender<TaskOutcome>>,
}

impl QueuedTask {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            responder: None,
        }
    }

    /// 创建带结果通道的队列项
    pub fn with_responder(task: Task) -> (Self, oneshot::Receiver<TaskOutcome>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                task,
                responder: Some(tx),
            },
            rx,
        )
    }

    /// 通知等待方，对方已放弃等待时忽略
    pub fn respond(&mut self, outcome: TaskOutcome) {
        if let Some(tx) = self.responder.take() {
            let _ = tx.send(outcome);
        }
    }
}

/// 任务队列特质
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// 入队任务
    async fn enqueue(&self, item: QueuedTask) -> Result<(), QueueError>;

    /// 出队任务，队列为空时等待；队列关闭且为空时返回 None
    async fn dequeue(&self) -> Option<QueuedTask>;

    /// 等待中的任务数
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 关闭队列，不再接受新任务
    fn close(&self);
}

/// 进程内 FIFO 任务队列
#[derive(Default)]
pub struct InMemoryTaskQueue {
    items: Mutex<VecDeque<QueuedTask>>,
    notify: Notify,
    closed: AtomicBool,
}

impl InMemoryTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskQueue for InMemoryTaskQueue {
    async fn enqueue(&self, item: QueuedTask) -> Result<(), QueueError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(QueueError::Closed);
        }
        self.items.lock().push_back(item);
        self.notify.notify_one();
        Ok(())
    }

    async fn dequeue(&self) -> Option<QueuedTask> {
        loop {
            if let Some(item) = self.items.lock().pop_front() {
                return Some(item);
            }
            if self.closed.load(Ordering::Acquire) {
                return None;
            }
            self.notify.notified().await;
        }
    }

    fn len(&self) -> usize {
        self.items.lock().len()
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }
}

#[async_trait]
impl<T: TaskQueue + ?Sized> TaskQueue for Arc<T> {
    async fn enqueue(&self, item: QueuedTask) -> Result<(), QueueError> {
        (**self).enqueue(item).await
    }

    async fn dequeue(&self) -> Option<QueuedTask> {
        (**self).dequeue().await
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn close(&self) {
        (**self).close()
    }
}

/// 抓取提交特质
///
/// 定时任务通过它把抓取交给同一个单并发队列，并等待结果
#[async_trait]
pub trait ScrapeSubmitter: Send + Sync {
    /// 提交抓取并等待处理完成
    ///
    /// # 返回值
    ///
    /// * `Ok(ScrapeSummary)` - 抓取成功
    /// * `Err(String)` - 入队、抓取或持久化失败的原因
    async fn submit_and_wait(&self, owner_id: Uuid, params: SearchParams) -> TaskOutcome;
}
