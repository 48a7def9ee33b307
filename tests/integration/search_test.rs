// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{RESULTS_HTML, SEARCH_PATH};
use jobscout::domain::models::task::{DatePosted, SearchParams, WorkMode};
use jobscout::domain::search::engine::{JobSearchEngine, ParseStrategy, SearchError};
use jobscout::domain::services::listing_filter::ListingFilter;
use jobscout::engines::proxy_router::ProxyRouter;
use jobscout::engines::reqwest_engine::ReqwestTransport;
use jobscout::infrastructure::search::linkedin::LinkedInJobSearch;
use jobscout::utils::retry_policy::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn engine(mock_server: &MockServer, filter: ListingFilter) -> LinkedInJobSearch {
    let router = Arc::new(ProxyRouter::direct_only(Arc::new(
        ReqwestTransport::direct().unwrap(),
    )));
    LinkedInJobSearch::new(
        router,
        &format!("{}{}", mock_server.uri(), SEARCH_PATH),
        filter,
        RetryPolicy::immediate(2),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn search_sends_filters_and_parses_cards() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("keywords", "rust engineer"))
        .and(query_param("location", "Berlin"))
        .and(query_param("f_WT", "2"))
        .and(query_param("f_TPR", "r86400"))
        .and(query_param("start", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_HTML))
        .expect(1)
        .mount(&mock_server)
        .await;

    let params = SearchParams {
        keywords: "rust engineer".to_string(),
        location: Some("Berlin".to_string()),
        work_mode: Some(WorkMode::Remote),
        date_posted: DatePosted::PastDay,
        start: 25,
    };
    let outcome = engine(&mock_server, ListingFilter::allow_all())
        .search(&params)
        .await
        .unwrap();

    assert_eq!(outcome.candidates, 2);
    assert_eq!(outcome.strategy, Some(ParseStrategy::StructuredCards));
    assert_eq!(outcome.transport.as_deref(), Some("direct"));

    let first = &outcome.listings[0];
    assert_eq!(first.title, "Rust Engineer");
    assert_eq!(first.company, "Globex");
    assert_eq!(first.location.as_deref(), Some("Berlin"));
    assert!(first.url.starts_with(&mock_server.uri()));
    assert!(first.url.ends_with("/jobs/view/rust-engineer-1"));
}

#[tokio::test]
async fn filter_drops_denied_titles() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_HTML))
        .mount(&mock_server)
        .await;

    let filter = ListingFilter::new(vec![], vec!["backend".to_string()], vec![]);
    let outcome = engine(&mock_server, filter)
        .search(&SearchParams::new("engineer"))
        .await
        .unwrap();

    assert_eq!(outcome.candidates, 2);
    assert_eq!(outcome.listings.len(), 1);
    assert_eq!(outcome.listings[0].title, "Rust Engineer");
}

#[tokio::test]
async fn rate_limited_search_exhausts_retry_budget() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&mock_server)
        .await;

    let err = engine(&mock_server, ListingFilter::allow_all())
        .search(&SearchParams::new("rust"))
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::Transport { attempts: 2, .. }));
}

#[tokio::test]
async fn unrecognised_markup_yields_empty_outcome() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>Sign in to continue</p></body></html>"),
        )
        .mount(&mock_server)
        .await;

    let outcome = engine(&mock_server, ListingFilter::allow_all())
        .search(&SearchParams::new("rust"))
        .await
        .unwrap();

    assert!(outcome.listings.is_empty());
    assert_eq!(outcome.candidates, 0);
    assert_eq!(outcome.strategy, None);
}
