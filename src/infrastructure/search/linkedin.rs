// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::SearchParams;
use crate::domain::search::engine::{JobSearchEngine, SearchError, SearchOutcome};
use crate::domain::services::listing_filter::ListingFilter;
use crate::engines::proxy_router::ProxyRouter;
use crate::engines::traits::{FetchRequest, FetchResponse, TransportError};
use crate::infrastructure::search::deduplicator::ListingDeduplicator;
use crate::infrastructure::search::parser::ListingParser;
use crate::utils::retry_policy::RetryPolicy;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};
use url::Url;

/// 职位搜索引擎（LinkedIn 公开职位搜索页）
///
/// 构建搜索URL，经由 ProxyRouter 抓取（有限次数的带抖动重试），
/// 解析、过滤并去重后返回职位。
pub struct LinkedInJobSearch {
    router: Arc<ProxyRouter>,
    parser: ListingParser,
    filter: ListingFilter,
    retry_policy: RetryPolicy,
    search_url: Url,
    request_timeout: Duration,
}

impl LinkedInJobSearch {
    /// 创建搜索引擎
    ///
    /// # 参数
    ///
    /// * `router` - 代理路由器
    /// * `search_base_url` - 搜索页地址
    /// * `filter` - 相关性过滤器
    /// * `retry_policy` - 抓取重试策略
    /// * `request_timeout` - 单次请求超时
    pub fn new(
        router: Arc<ProxyRouter>,
        search_base_url: &str,
        filter: ListingFilter,
        retry_policy: RetryPolicy,
        request_timeout: Duration,
    ) -> Result<Self, SearchError> {
        let search_url = Url::parse(search_base_url).map_err(|e| {
            SearchError::InvalidParams(format!("invalid search base url: {}", e))
        })?;
        let parser = ListingParser::new(search_url.clone())
            .map_err(|e| SearchError::InvalidParams(e.to_string()))?;

        Ok(Self {
            router,
            parser,
            filter,
            retry_policy,
            search_url,
            request_timeout,
        })
    }

    /// 构建搜索URL
    pub fn build_search_url(&self, params: &SearchParams) -> String {
        let mut url = self.search_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("keywords", params.keywords.trim());
            if let Some(location) = params.location.as_deref().map(str::trim) {
                if !location.is_empty() {
                    query.append_pair("location", location);
                }
            }
            if let Some(mode) = params.work_mode {
                query.append_pair("f_WT", mode.as_query_value());
            }
            if let Some(window) = params.date_posted.as_query_value() {
                query.append_pair("f_TPR", window);
            }
            query.append_pair("start", &params.start.to_string());
        }
        url.to_string()
    }

    /// 顺序重试抓取，预算耗尽后返回 `SearchError::Transport`
    async fn fetch_with_retry(&self, url: &str) -> Result<FetchResponse, SearchError> {
        let request = FetchRequest::get(url, self.request_timeout);
        let mut attempts = 0;

        loop {
            attempts += 1;
            match self.router.request(&request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    let retryable = !matches!(e, TransportError::InvalidConfig(_));
                    if !retryable || !self.retry_policy.should_retry(attempts) {
                        warn!(attempts, error = %e, "Search fetch failed, giving up");
                        return Err(SearchError::Transport {
                            attempts,
                            message: e.to_string(),
                        });
                    }

                    let backoff = self.retry_policy.calculate_backoff(attempts);
                    warn!(
                        attempts,
                        max_attempts = self.retry_policy.max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Search fetch failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

#[async_trait]
impl JobSearchEngine for LinkedInJobSearch {
    #[instrument(skip(self, params), fields(keywords = %params.keywords, start = params.start))]
    async fn search(&self, params: &SearchParams) -> Result<SearchOutcome, SearchError> {
        params
            .validate()
            .map_err(|e| SearchError::InvalidParams(e.to_string()))?;

        let url = self.build_search_url(params);
        let response = self.fetch_with_retry(&url).await?;

        let parsed = self.parser.parse(&response.body);
        let candidates = parsed.listings.len();

        let filtered = self.filter.apply(parsed.listings);
        let listings = ListingDeduplicator::new().deduplicate(filtered);

        info!(
            candidates,
            accepted = listings.len(),
            transport = %response.transport,
            "Job search finished"
        );

        Ok(SearchOutcome {
            listings,
            candidates,
            strategy: parsed.strategy,
            transport: Some(response.transport),
        })
    }

    fn name(&self) -> &'static str {
        "linkedin"
    }
}
