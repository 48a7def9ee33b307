// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::listing::ScrapedListing;
use crate::domain::search::engine::ParseStrategy;
use crate::utils::url_utils::normalize_detail_url;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// 标题、公司与链接的最小长度
pub const MIN_FIELD_LEN: usize = 2;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// 一次解析的结果
#[derive(Debug, Default)]
pub struct ParseResult {
    pub listings: Vec<ScrapedListing>,
    /// 命中的策略，None 表示所有策略都没有结果
    pub strategy: Option<ParseStrategy>,
}

struct Selectors {
    // StructuredCards
    card: Selector,
    card_title: Selector,
    card_company: Selector,
    card_location: Selector,
    card_link: Selector,
    // HeuristicScan
    container: Selector,
    anchor: Selector,
    heading: Selector,
    company_hint: Selector,
    location_hint: Selector,
    // 两种策略共用
    time: Selector,
}

fn selector(css: &str) -> Result<Selector, ParserError> {
    Selector::parse(css).map_err(|e| ParserError::InvalidSelector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

impl Selectors {
    fn new() -> Result<Self, ParserError> {
        Ok(Self {
            card: selector("div.base-card, div.base-search-card, div.job-search-card")?,
            card_title: selector("h3.base-search-card__title")?,
            card_company: selector("h4.base-search-card__subtitle")?,
            card_location: selector("span.job-search-card__location")?,
            card_link: selector("a.base-card__full-link, a.base-search-card__full-link")?,
            container: selector(
                "li, article, div[class*='job'], div[class*='card'], div[class*='result']",
            )?,
            anchor: selector("a[href]")?,
            heading: selector("h1, h2, h3, h4")?,
            company_hint: selector(
                "[class*='company'], [class*='subtitle'], [class*='employer'], h4",
            )?,
            location_hint: selector("[class*='location']")?,
            time: selector("time[datetime]")?,
        })
    }
}

/// 职位列表页解析器
///
/// 按 `ParseStrategy::CASCADE` 顺序尝试各策略，第一个有结果的策略胜出。
/// 所有策略都没有结果时返回空列表，不视为错误。
pub struct ListingParser {
    base_url: Url,
    selectors: Selectors,
}

impl ListingParser {
    /// 创建解析器
    ///
    /// # 参数
    ///
    /// * `base_url` - 用于解析相对链接的基础URL
    pub fn new(base_url: Url) -> Result<Self, ParserError> {
        Ok(Self {
            base_url,
            selectors: Selectors::new()?,
        })
    }

    pub fn parse(&self, html: &str) -> ParseResult {
        let document = Html::parse_document(html);

        for strategy in ParseStrategy::CASCADE {
            let listings = self.apply(strategy, &document);
            if !listings.is_empty() {
                info!(
                    strategy = %strategy,
                    count = listings.len(),
                    "Parsed job listings"
                );
                return ParseResult {
                    listings,
                    strategy: Some(strategy),
                };
            }
            debug!(strategy = %strategy, "Strategy yielded no listings");
        }

        warn!(
            html_len = html.len(),
            "No parse strategy matched, returning empty result"
        );
        ParseResult::default()
    }

    fn apply(&self, strategy: ParseStrategy, document: &Html) -> Vec<ScrapedListing> {
        match strategy {
            ParseStrategy::StructuredCards => self.parse_structured(document),
            ParseStrategy::HeuristicScan => self.parse_heuristic(document),
        }
    }

    fn parse_structured(&self, document: &Html) -> Vec<ScrapedListing> {
        let s = &self.selectors;
        document
            .select(&s.card)
            .filter_map(|card| {
                let title = first_text(card, &s.card_title)?;
                let company = first_text(card, &s.card_company)?;
                let location = first_text(card, &s.card_location);
                let href = card
                    .select(&s.card_link)
                    .next()
                    .and_then(|a| a.value().attr("href"))?;
                let posted_date = self.posted_date(card);
                self.accept(title, company, location, href, posted_date)
            })
            .collect()
    }

    /// 扫描通用容器：容器内恰好有一个形似职位的链接时才视为一条职位
    fn parse_heuristic(&self, document: &Html) -> Vec<ScrapedListing> {
        let s = &self.selectors;
        let mut listings = Vec::new();

        for element in document.select(&s.container) {
            let job_links: Vec<ElementRef> = element
                .select(&s.anchor)
                .filter(|a| a.value().attr("href").is_some_and(is_job_shaped_link))
                .collect();

            let mut hrefs: Vec<&str> = job_links
                .iter()
                .filter_map(|a| a.value().attr("href"))
                .collect();
            hrefs.dedup();
            if hrefs.len() != 1 {
                continue;
            }
            let link = job_links[0];
            let href = hrefs[0];

            let title = first_text(element, &s.heading).or_else(|| non_empty(collapse_text(link)));
            let Some(title) = title else {
                continue;
            };

            let company = element
                .select(&s.company_hint)
                .map(collapse_text)
                .find(|text| !text.is_empty() && *text != title);
            let Some(company) = company else {
                continue;
            };

            let location = first_text(element, &s.location_hint)
                .filter(|text| *text != title && *text != company);
            let posted_date = self.posted_date(element);

            if let Some(listing) = self.accept(title, company, location, href, posted_date) {
                listings.push(listing);
            }
        }

        listings
    }

    fn posted_date(&self, element: ElementRef) -> Option<NaiveDate> {
        element
            .select(&self.selectors.time)
            .filter_map(|t| t.value().attr("datetime"))
            .find_map(|value| {
                let date_part = value.get(..10).unwrap_or(value);
                NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
            })
    }

    /// 校验候选字段，标题、公司与可解析的详情链接必须齐全且满足最小长度
    fn accept(
        &self,
        title: String,
        company: String,
        location: Option<String>,
        href: &str,
        posted_date: Option<NaiveDate>,
    ) -> Option<ScrapedListing> {
        if title.chars().count() < MIN_FIELD_LEN || company.chars().count() < MIN_FIELD_LEN {
            return None;
        }
        let url = normalize_detail_url(&self.base_url, href)?;
        if url.chars().count() < MIN_FIELD_LEN {
            return None;
        }

        Some(ScrapedListing {
            title,
            company,
            location,
            url,
            posted_date,
        })
    }
}

fn is_job_shaped_link(href: &str) -> bool {
    let href = href.to_ascii_lowercase();
    href.contains("/jobs/view")
        || href.contains("/job/")
        || href.contains("/jobs/")
        || href.contains("jobid=")
        || href.contains("job_id=")
}

/// 元素文本，合并连续空白
fn collapse_text(element: ElementRef) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn first_text(element: ElementRef, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .map(collapse_text)
        .find(|text| !text.is_empty())
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
