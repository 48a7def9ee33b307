// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use uuid::Uuid;

use super::task_repository::RepositoryError;
use crate::domain::models::owner::OwnerProfile;

/// 用户/套餐仓库特质
#[async_trait]
pub trait OwnerRepository: Send + Sync {
    async fn find(&self, owner_id: Uuid) -> Result<Option<OwnerProfile>, RepositoryError>;

    /// 创建或覆盖用户信息（身份同步时调用）
    async fn upsert_owner(&self, profile: &OwnerProfile) -> Result<OwnerProfile, RepositoryError>;

    /// 原子地扣减一个积分
    ///
    /// 单条条件更新语句，余额为零时不做修改。
    ///
    /// # 返回值
    ///
    /// * `Ok(true)` - 扣减成功
    /// * `Ok(false)` - 余额不足或用户不存在
    async fn decrement_credit_if_positive(&self, owner_id: Uuid) -> Result<bool, RepositoryError>;

    /// 将所有有限额度用户的积分重置为套餐每日额度，返回受影响的用户数
    async fn reset_daily_credits(&self) -> Result<u64, RepositoryError>;
}
