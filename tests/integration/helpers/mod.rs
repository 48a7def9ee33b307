// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum_test::TestServer;
use jobscout::application::use_cases::task_service::TaskService;
use jobscout::config::settings::SchedulerSettings;
use jobscout::domain::models::owner::{OwnerProfile, PlanTier};
use jobscout::domain::models::task::{SearchParams, Task, TaskStatus};
use jobscout::domain::repositories::owner_repository::OwnerRepository;
use jobscout::domain::repositories::task_repository::TaskRepository;
use jobscout::domain::services::listing_filter::ListingFilter;
use jobscout::engines::proxy_router::ProxyRouter;
use jobscout::engines::reqwest_engine::ReqwestTransport;
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
use jobscout::workers::manager::WorkerManager;
use jobscout::workers::scrape_worker::ScrapeWorker;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SEARCH_PATH: &str = "/jobs/search";

/// 两条职位的搜索结果页
pub const RESULTS_HTML: &str = r#"
<html><body><ul>
  <li><div class="base-card">
    <a class="base-card__full-link" href="/jobs/view/rust-engineer-1?trk=public"></a>
    <h3 class="base-search-card__title">Rust Engineer</h3>
    <h4 class="base-search-card__subtitle">Globex</h4>
    <span class="job-search-card__location">Berlin</span>
  </div></li>
  <li><div class="base-card">
    <a class="base-card__full-link" href="/jobs/view/backend-engineer-2"></a>
    <h3 class="base-search-card__title">Backend Engineer</h3>
    <h4 class="base-search-card__subtitle">Initech</h4>
  </div></li>
</ul></body></html>
"#;

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<DatabaseConnection>,
    pub mock_server: MockServer,
    pub tasks: Arc<TaskRepositoryImpl>,
    pub listings: Arc<ListingRepositoryImpl>,
    pub owners: Arc<OwnerRepositoryImpl>,
    pub crons: Arc<CronRepositoryImpl>,
    pub task_service: Arc<TaskService>,
    pub scheduler: Arc<CronScheduler>,
    pub proxy_router: Arc<ProxyRouter>,
    pub worker_manager: WorkerManager,
}

/// 挂载返回 RESULTS_HTML 的搜索页
pub async fn mount_results(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_HTML))
        .mount(mock_server)
        .await;
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with_delay(Duration::ZERO).await
}

/// 构建完整应用：内存数据库、直连传输、单个抓取工作器
pub async fn create_test_app_with_delay(inter_task_delay: Duration) -> TestApp {
    let mock_server = MockServer::start().await;
    let db = Arc::new(connection::connect_in_memory().await.unwrap());

    let tasks = Arc::new(TaskRepositoryImpl::new(db.clone()));
    let listings = Arc::new(ListingRepositoryImpl::new(db.clone()));
    let owners = Arc::new(OwnerRepositoryImpl::new(db.clone()));
    let crons = Arc::new(CronRepositoryImpl::new(db.clone()));

    let proxy_router = Arc::new(ProxyRouter::direct_only(Arc::new(
        ReqwestTransport::direct().unwrap(),
    )));
    let engine = Arc::new(
        LinkedInJobSearch::new(
            proxy_router.clone(),
            &format!("{}{}", mock_server.uri(), SEARCH_PATH),
            ListingFilter::allow_all(),
            RetryPolicy::immediate(2),
            Duration::from_secs(5),
        )
        .unwrap(),
    );

    let queue = Arc::new(InMemoryTaskQueue::new());
    let task_service = Arc::new(TaskService::new(tasks.clone(), queue.clone()));

    let mut worker_manager = WorkerManager::new(queue.clone());
    worker_manager.start_worker(Arc::new(ScrapeWorker::new(
        queue,
        tasks.clone(),
        listings.clone(),
        engine,
        inter_task_delay,
    )));

    let scheduler = Arc::new(CronScheduler::new(
        crons.clone(),
        owners.clone(),
        task_service.clone(),
        SchedulerSettings::default(),
    ));

    let app = routes::routes(
        task_service.clone(),
        scheduler.clone(),
        proxy_router.clone(),
    );
    let server = TestServer::new(app).unwrap();

    TestApp {
        server,
        db,
        mock_server,
        tasks,
        listings,
        owners,
        crons,
        task_service,
        scheduler,
        proxy_router,
        worker_manager,
    }
}

impl TestApp {
    /// 创建带保存搜索的用户
    pub async fn create_owner(&self, plan: PlanTier, credits: i64) -> Uuid {
        let profile = OwnerProfile::new(Uuid::new_v4(), plan)
            .with_credits(credits)
            .with_saved_search(SearchParams::new("rust"));
        self.owners.upsert_owner(&profile).await.unwrap().owner_id
    }

    /// 轮询直到任务进入终态
    pub async fn wait_for_task(&self, task_id: Uuid) -> Task {
        for _ in 0..200 {
            let task = self.tasks.find_by_id(task_id).await.unwrap().unwrap();
            if task.status.is_terminal() {
                return task;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("task {} did not finish", task_id);
    }

    #[allow(dead_code)]
    pub async fn task_status(&self, task_id: Uuid) -> TaskStatus {
        self.tasks.find_by_id(task_id).await.unwrap().unwrap().status
    }
}
