// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use uuid::Uuid;

use super::task_repository::RepositoryError;
use crate::domain::models::listing::{Listing, ListingFlags, UpsertSummary};

/// 职位仓库特质
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// 幂等写入职位
    ///
    /// 以 (url, owner_id) 为键，已存在的记录只更新抓取字段，不会重置用户设置的状态标记。
    /// 单条记录冲突或失败不会导致整批失败。
    ///
    /// # 参数
    ///
    /// * `owner_id` - 所属用户
    /// * `listings` - 本次抓取得到的职位
    ///
    /// # 返回值
    ///
    /// * `Ok(UpsertSummary)` - 写入统计
    /// * `Err(RepositoryError)` - 数据库不可用
    async fn upsert_listings(
        &self,
        owner_id: Uuid,
        listings: &[Listing],
    ) -> Result<UpsertSummary, RepositoryError>;

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Listing>, RepositoryError>;

    /// 更新用户设置的状态标记
    async fn set_flags(
        &self,
        owner_id: Uuid,
        listing_id: Uuid,
        flags: ListingFlags,
    ) -> Result<Listing, RepositoryError>;
}
