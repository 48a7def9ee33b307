// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::listing::ScrapedListing;
use crate::domain::models::task::SearchParams;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum SearchError {
    /// 重试预算耗尽仍未取得页面
    #[error("Transport failed after {attempts} attempts: {message}")]
    Transport { attempts: u32, message: String },
    #[error("Invalid search parameters: {0}")]
    InvalidParams(String),
}

/// HTML 解析策略，按优先级依次尝试
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStrategy {
    /// 目标站点当前的结构化卡片标记
    StructuredCards,
    /// 扫描通用元素中形似职位的链接
    HeuristicScan,
}

impl ParseStrategy {
    /// 级联顺序
    pub const CASCADE: [ParseStrategy; 2] =
        [ParseStrategy::StructuredCards, ParseStrategy::HeuristicScan];
}

impl fmt::Display for ParseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseStrategy::StructuredCards => write!(f, "structured_cards"),
            ParseStrategy::HeuristicScan => write!(f, "heuristic_scan"),
        }
    }
}

/// 一次搜索的结果
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// 经过过滤与去重后的职位
    pub listings: Vec<ScrapedListing>,
    /// 解析出的候选数（过滤前）
    pub candidates: usize,
    /// 命中的解析策略，None 表示没有策略匹配
    pub strategy: Option<ParseStrategy>,
    /// 实际使用的传输通道
    pub transport: Option<String>,
}

#[async_trait]
pub trait JobSearchEngine: Send + Sync {
    /// 执行一次职位搜索
    async fn search(&self, params: &SearchParams) -> Result<SearchOutcome, SearchError>;

    /// Get the name of the search engine
    fn name(&self) -> &'static str;
}
