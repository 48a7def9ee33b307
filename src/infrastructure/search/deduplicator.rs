// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::listing::ScrapedListing;
use std::collections::HashSet;

/// 单次抓取内的职位去重器
///
/// 以 (标题, 公司, 规范化URL) 三元组为键，标题和公司不区分大小写，保留首次出现的记录
#[derive(Debug, Default)]
pub struct ListingDeduplicator {
    seen: HashSet<(String, String, String)>,
}

impl ListingDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 首次见到该职位时返回 true
    pub fn insert(&mut self, listing: &ScrapedListing) -> bool {
        self.seen.insert((
            listing.title.to_lowercase(),
            listing.company.to_lowercase(),
            listing.url.clone(),
        ))
    }

    pub fn deduplicate(&mut self, listings: Vec<ScrapedListing>) -> Vec<ScrapedListing> {
        listings.into_iter().filter(|l| self.insert(l)).collect()
    }
}
