// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::queue::task_queue::TaskQueue;
use crate::workers::Worker;
use std::sync::Arc;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// 工作管理器
///
/// 抓取必须串行执行，生产环境只启动一个抓取工作器
pub struct WorkerManager {
    queue: Arc<dyn TaskQueue>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerManager {
    pub fn new(queue: Arc<dyn TaskQueue>) -> Self {
        Self {
            queue,
            handles: Vec::new(),
        }
    }

    /// 在后台任务中启动工作器
    pub fn start_worker(&mut self, worker: Arc<dyn Worker>) {
        let handle = tokio::spawn(async move {
            let name = worker.name().to_string();
            match worker.run().await {
                Ok(()) => info!("Worker {} stopped", name),
                Err(e) => error!("Worker {} exited with error: {}", name, e),
            }
        });
        self.handles.push(handle);
    }

    /// 正在运行的工作器数量
    pub fn running(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    /// 等待关闭信号并关闭工作进程
    pub async fn wait_for_shutdown(&mut self) {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(err) => error!("Unable to listen for shutdown signal: {}", err),
        }
        self.shutdown();
    }

    /// 关闭队列并终止所有工作器
    ///
    /// 正在处理的任务会在下次启动时由恢复流程标记为失败
    pub fn shutdown(&mut self) {
        info!("Shutting down workers...");
        self.queue.close();
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        info!("Workers shut down successfully");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::task_queue::InMemoryTaskQueue;
    use crate::utils::errors::WorkerError;
    use async_trait::async_trait;
    use std::time::Duration;

    struct IdleWorker {
        queue: Arc<InMemoryTaskQueue>,
    }

    #[async_trait]
    impl Worker for IdleWorker {
        async fn run(&self) -> Result<(), WorkerError> {
            while self.queue.dequeue().await.is_some() {}
            Ok(())
        }

        fn name(&self) -> &str {
            "idle"
        }
    }

    #[tokio::test]
    async fn test_shutdown_stops_workers() {
        let queue = Arc::new(InMemoryTaskQueue::new());
        let mut manager = WorkerManager::new(queue.clone());
        manager.start_worker(Arc::new(IdleWorker {
            queue: queue.clone(),
        }));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(manager.running(), 1);

        manager.shutdown();
        assert_eq!(manager.running(), 0);
        assert!(queue
            .enqueue(crate::queue::task_queue::QueuedTask::new(
                crate::domain::models::task::Task::new(
                    uuid::Uuid::new_v4(),
                    crate::domain::models::task::SearchParams::new("rust"),
                ),
            ))
            .await
            .is_err());
    }
}
