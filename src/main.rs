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

use jobscout::application::use_cases::task_service::TaskService;
use jobscout::config::settings::Settings;
use jobscout::domain::services::listing_filter::ListingFilter;
use jobscout::engines::proxy_router::ProxyRouter;
use jobscout::engines::reqwest_engine::ReqwestTransport;
use jobscout::engines::traits::HttpTransport;
use jobscout::infrastructure::database::connection;
use jobscout::infrastructure::repositories::cron_repo_impl::CronRepositoryImpl;
use jobscout::infrastructure::repositories::listing_repo_impl::ListingRepositoryImpl;
use jobscout::infrastructure::repositories::owner_repo_impl::OwnerRepositoryImpl;
use jobscout::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl;
use jobscout::infrastructure::search::linkedin::LinkedInJobSearch;
use jobscout::presentation::routes;
use jobscout::queue::scheduler::CronScheduler;
use jobscout::queue::task_queue::InMemoryTaskQueue;
use jobscout::utils::retry_policy::RetryPolicy;
use jobscout::utils::telemetry;
use jobscout::workers::manager::WorkerManager;
use jobscout::workers::scrape_worker::ScrapeWorker;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting jobscout...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    if settings.metrics.enabled {
        let addr: SocketAddr = settings.metrics.addr.parse()?;
        jobscout::infrastructure::metrics::init_metrics(addr);
    }

    // 3. Connect to database and run migrations
    let db = Arc::new(connection::init_database(&settings.database).await?);
    info!("Database connection established");

    let task_repo = Arc::new(TaskRepositoryImpl::new(db.clone()));
    let listing_repo = Arc::new(ListingRepositoryImpl::new(db.clone()));
    let cron_repo = Arc::new(CronRepositoryImpl::new(db.clone()));
    let owner_repo = Arc::new(OwnerRepositoryImpl::new(db.clone()));

    // 4. Transports and search engine
    let direct: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::direct()?);
    let proxy: Option<Arc<dyn HttpTransport>> = match settings.proxy.url.as_deref() {
        Some(url) if !url.trim().is_empty() => Some(Arc::new(ReqwestTransport::proxied(url)?)),
        _ => None,
    };
    if proxy.is_none() {
        info!("No proxy configured, using direct transport only");
    }
    let proxy_router = Arc::new(ProxyRouter::new(
        proxy,
        direct,
        settings.proxy.price_per_gb,
    ));

    let engine = Arc::new(LinkedInJobSearch::new(
        proxy_router.clone(),
        &settings.scraper.search_base_url,
        ListingFilter::new(
            settings.filter.title_allow.clone(),
            settings.filter.title_deny.clone(),
            settings.filter.company_deny.clone(),
        ),
        RetryPolicy::new(
            settings.scraper.max_attempts,
            settings.scraper.initial_backoff(),
        ),
        settings.scraper.request_timeout(),
    )?);

    // 5. Queue, task service and the single scrape worker
    let queue = Arc::new(InMemoryTaskQueue::new());
    let task_service = Arc::new(TaskService::new(task_repo.clone(), queue.clone()));
    task_service.recover_unfinished().await?;

    let mut worker_manager = WorkerManager::new(queue.clone());
    worker_manager.start_worker(Arc::new(ScrapeWorker::new(
        queue.clone(),
        task_repo,
        listing_repo,
        engine,
        settings.queue.inter_task_delay(),
    )));

    // 6. Cron scheduler
    let scheduler = Arc::new(CronScheduler::new(
        cron_repo,
        owner_repo,
        task_service.clone(),
        settings.scheduler.clone(),
    ));
    if settings.scheduler.enabled {
        scheduler.initialize().await?;
    } else {
        info!("Cron scheduler disabled");
    }

    // 7. Start HTTP server
    let app = routes::routes(task_service, scheduler.clone(), proxy_router);
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("HTTP server error: {}", e);
        }
    });

    worker_manager.wait_for_shutdown().await;
    if let Err(e) = scheduler.stop().await {
        error!("Failed to stop cron scheduler: {}", e);
    }
    server.abort();

    Ok(())
}
