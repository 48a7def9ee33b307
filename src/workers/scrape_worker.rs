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

use async_trait::async_trait;
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::models::listing::Listing;
use crate::domain::models::task::{ScrapeSummary, Task};
use crate::domain::repositories::listing_repository::ListingRepository;
use crate::domain::repositories::task_repository::TaskRepository;
use crate::domain::search::engine::JobSearchEngine;
use crate::queue::task_queue::{QueuedTask, TaskOutcome, TaskQueue};
use crate::utils::errors::WorkerError;
use crate::workers::Worker;

/// 抓取工作者
///
/// 每次只处理一个任务，任务之间固定等待 `inter_task_delay`
pub struct ScrapeWorker {
    queue: Arc<dyn TaskQueue>,
    task_repository: Arc<dyn TaskRepository>,
    listing_repository: Arc<dyn ListingRepository>,
    engine: Arc<dyn JobSearchEngine>,
    inter_task_delay: Duration,
    worker_id: Uuid,
}

impl ScrapeWorker {
    /// 创建新的抓取工作器实例
    pub fn new(
        queue: Arc<dyn TaskQueue>,
        task_repository: Arc<dyn TaskRepository>,
        listing_repository: Arc<dyn ListingRepository>,
        engine: Arc<dyn JobSearchEngine>,
        inter_task_delay: Duration,
    ) -> Self {
        Self {
            queue,
            task_repository,
            listing_repository,
            engine,
            inter_task_delay,
            worker_id: Uuid::new_v4(),
        }
    }

    /// 处理一个队列项并通知等待方
    pub async fn handle(&self, mut item: QueuedTask) -> TaskOutcome {
        let started = Instant::now();
        let outcome = self.process_task(item.task.clone()).await;

        let label = if outcome.is_ok() { "completed" } else { "failed" };
        counter!("scrape_tasks_total", "outcome" => label).increment(1);
        histogram!("scrape_task_duration_seconds").record(started.elapsed().as_secs_f64());

        item.respond(outcome.clone());
        outcome
    }

    #[instrument(skip(self, task), fields(task_id = %task.id, owner_id = %task.owner_id))]
    async fn process_task(&self, task: Task) -> TaskOutcome {
        let task = match task.start() {
            Ok(task) => task,
            Err(e) => {
                warn!("Skipping task: {}", e);
                return Err(e.to_string());
            }
        };
        if let Err(e) = self.task_repository.update(&task).await {
            error!("Failed to persist processing state: {}", e);
        }
        info!(keywords = %task.params.keywords, "Processing task");

        match self.execute(&task).await {
            Ok(summary) => {
                info!(
                    jobs_found = summary.jobs_found,
                    jobs_added = summary.jobs_added,
                    "Task completed"
                );
                self.finish(task.complete(summary.clone())).await;
                Ok(summary)
            }
            Err(message) => {
                warn!("Task failed: {}", message);
                self.finish(task.fail(message.clone())).await;
                Err(message)
            }
        }
    }

    async fn execute(&self, task: &Task) -> Result<ScrapeSummary, String> {
        let outcome = self
            .engine
            .search(&task.params)
            .await
            .map_err(|e| e.to_string())?;

        let jobs_found = outcome.listings.len() as u32;
        let listings: Vec<Listing> = outcome
            .listings
            .into_iter()
            .map(|l| l.into_listing(task.owner_id))
            .collect();

        let upserted = self
            .listing_repository
            .upsert_listings(task.owner_id, &listings)
            .await
            .map_err(|e| format!("Failed to store listings: {}", e))?;
        counter!("listings_inserted_total").increment(upserted.inserted as u64);

        Ok(ScrapeSummary {
            jobs_found,
            jobs_added: upserted.inserted as u32,
            transport: outcome.transport,
        })
    }

    async fn finish(&self, transition: Result<Task, crate::domain::models::task::DomainError>) {
        match transition {
            Ok(task) => {
                if let Err(e) = self.task_repository.update(&task).await {
                    error!("Failed to persist final task state: {}", e);
                }
            }
            Err(e) => error!("Invalid task transition: {}", e),
        }
    }
}

#[async_trait]
impl Worker for ScrapeWorker {
    async fn run(&self) -> Result<(), WorkerError> {
        info!("Scrape worker {} started", self.worker_id);

        while let Some(item) = self.queue.dequeue().await {
            let _ = self.handle(item).await;
            if !self.inter_task_delay.is_zero() {
                sleep(self.inter_task_delay).await;
            }
        }

        info!("Scrape worker {} stopped, queue closed", self.worker_id);
        Ok(())
    }

    fn name(&self) -> &str {
        "scrape_worker"
    }
}

#[cfg(test)]
#[path = "scrape_worker_test.rs"]
mod tests;
