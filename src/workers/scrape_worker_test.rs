use super::*;
use crate::domain::models::listing::ScrapedListing;
use crate::domain::models::task::{SearchParams, TaskStatus};
use crate::domain::search::engine::{ParseStrategy, SearchError, SearchOutcome};
use crate::infrastructure::database::connection::connect_in_memory;
use crate::infrastructure::repositories::listing_repo_impl::ListingRepositoryImpl;
use crate::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl;
use crate::queue::task_queue::InMemoryTaskQueue;
use parking_lot::Mutex;

struct StubEngine {
    result: Mutex<Result<Vec<ScrapedListing>, SearchError>>,
}

impl StubEngine {
    fn returning(listings: Vec<ScrapedListing>) -> Self {
        Self {
            result: Mutex::new(Ok(listings)),
        }
    }

    fn failing(error: SearchError) -> Self {
        Self {
            result: Mutex::new(Err(error)),
        }
    }
}

#[async_trait]
impl JobSearchEngine for StubEngine {
    async fn search(&self, _params: &SearchParams) -> Result<SearchOutcome, SearchError> {
        let listings = self.result.lock().clone()?;
        Ok(SearchOutcome {
            candidates: listings.len(),
            listings,
            strategy: Some(ParseStrategy::StructuredCards),
            transport: Some("direct".to_string()),
        })
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

fn listing(title: &str, url: &str) -> ScrapedListing {
    ScrapedListing {
        title: title.to_string(),
        company: "Initech".to_string(),
        location: Some("Remote".to_string()),
        url: url.to_string(),
        posted_date: None,
    }
}

struct Fixture {
    worker: ScrapeWorker,
    tasks: Arc<TaskRepositoryImpl>,
    listings: Arc<ListingRepositoryImpl>,
}

async fn fixture(engine: StubEngine) -> Fixture {
    let db = Arc::new(connect_in_memory().await.unwrap());
    let tasks = Arc::new(TaskRepositoryImpl::new(db.clone()));
    let listings = Arc::new(ListingRepositoryImpl::new(db));
    let worker = ScrapeWorker::new(
        Arc::new(InMemoryTaskQueue::new()),
        tasks.clone(),
        listings.clone(),
        Arc::new(engine),
        Duration::ZERO,
    );
    Fixture {
        worker,
        tasks,
        listings,
    }
}

#[tokio::test]
async fn test_successful_task_is_completed_and_listings_stored() {
    let f = fixture(StubEngine::returning(vec![
        listing("Rust Engineer", "https://www.linkedin.com/jobs/view/1"),
        listing("Backend Engineer", "https://www.linkedin.com/jobs/view/2"),
    ]))
    .await;

    let owner_id = Uuid::new_v4();
    let task = f
        .tasks
        .create(&Task::new(owner_id, SearchParams::new("rust")))
        .await
        .unwrap();

    let (item, rx) = QueuedTask::with_responder(task.clone());
    let outcome = f.worker.handle(item).await.unwrap();
    assert_eq!(outcome.jobs_found, 2);
    assert_eq!(outcome.jobs_added, 2);
    assert_eq!(outcome.transport.as_deref(), Some("direct"));
    assert_eq!(rx.await.unwrap().unwrap(), outcome);

    let stored = f.tasks.find_by_id(task.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Completed);
    assert!(stored.started_at.is_some());
    assert_eq!(stored.result.unwrap().jobs_added, 2);

    assert_eq!(f.listings.list_by_owner(owner_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_repeated_scrape_adds_nothing_new() {
    let f = fixture(StubEngine::returning(vec![listing(
        "Rust Engineer",
        "https://www.linkedin.com/jobs/view/1",
    )]))
    .await;
    let owner_id = Uuid::new_v4();

    for expected_added in [1, 0] {
        let task = f
            .tasks
            .create(&Task::new(owner_id, SearchParams::new("rust")))
            .await
            .unwrap();
        let outcome = f.worker.handle(QueuedTask::new(task)).await.unwrap();
        assert_eq!(outcome.jobs_found, 1);
        assert_eq!(outcome.jobs_added, expected_added);
    }
}

#[tokio::test]
async fn test_search_failure_marks_task_failed() {
    let f = fixture(StubEngine::failing(SearchError::Transport {
        attempts: 3,
        message: "connection refused".to_string(),
    }))
    .await;

    let task = f
        .tasks
        .create(&Task::new(Uuid::new_v4(), SearchParams::new("rust")))
        .await
        .unwrap();

    let (item, rx) = QueuedTask::with_responder(task.clone());
    let err = f.worker.handle(item).await.unwrap_err();
    assert!(err.contains("3 attempts"));
    assert!(rx.await.unwrap().is_err());

    let stored = f.tasks.find_by_id(task.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Failed);
    assert!(stored.error_message.unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_terminal_task_is_not_reprocessed() {
    let f = fixture(StubEngine::returning(vec![])).await;
    let task = Task::new(Uuid::new_v4(), SearchParams::new("rust"))
        .fail("interrupted")
        .unwrap();

    assert!(f.worker.handle(QueuedTask::new(task)).await.is_err());
}
