// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 职位实体
///
/// 抓取得到并规范化后的职位信息。自然键为 (规范化URL, owner_id)，
/// 重复抓取不会产生重复记录，也不会覆盖用户设置的状态标记。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    /// 规范化后的详情页URL
    pub url: String,
    pub posted_date: Option<NaiveDate>,
    /// 用户设置的状态标记
    #[serde(flatten)]
    pub flags: ListingFlags,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

/// 用户在职位上设置的状态标记
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingFlags {
    pub applied: bool,
    pub hidden: bool,
    pub interview: bool,
    pub rejected: bool,
}

/// 解析阶段得到的候选职位（尚未归属用户）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedListing {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub url: String,
    pub posted_date: Option<NaiveDate>,
}

impl ScrapedListing {
    /// 绑定到用户，生成待持久化的职位
    pub fn into_listing(self, owner_id: Uuid) -> Listing {
        let now: DateTime<FixedOffset> = Utc::now().into();
        Listing {
            id: Uuid::new_v4(),
            owner_id,
            title: self.title,
            company: self.company,
            location: self.location,
            url: self.url,
            posted_date: self.posted_date,
            flags: ListingFlags::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// 批量写入结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertSummary {
    /// 收到的记录数
    pub received: usize,
    /// 新增的记录数
    pub inserted: usize,
    /// 已存在（或写入失败被跳过）的记录数
    pub conflicts: usize,
}
