// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::owner::{CreditBalance, OwnerProfile, PlanTier};
use crate::domain::models::task::SearchParams;
use crate::domain::repositories::owner_repository::OwnerRepository;
use crate::domain::repositories::task_repository::RepositoryError;
use crate::infrastructure::database::entities::owner as owner_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// 用户仓库实现
#[derive(Clone)]
pub struct OwnerRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl OwnerRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TryFrom<owner_entity::Model> for OwnerProfile {
    type Error = RepositoryError;

    fn try_from(model: owner_entity::Model) -> Result<Self, Self::Error> {
        let plan: PlanTier = model.plan.parse().map_err(|_| {
            RepositoryError::Corrupted(format!("owner {} plan '{}'", model.id, model.plan))
        })?;
        let credits = match plan.daily_credits() {
            Some(_) => CreditBalance::Limited(model.credits_remaining),
            None => CreditBalance::Unlimited,
        };
        let saved_search: Option<SearchParams> = model
            .saved_search
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| {
                RepositoryError::Corrupted(format!("owner {} saved search: {}", model.id, e))
            })?;

        Ok(Self {
            owner_id: model.id,
            plan,
            credits,
            max_cron_jobs: model.max_cron_jobs,
            saved_search,
        })
    }
}

#[async_trait]
impl OwnerRepository for OwnerRepositoryImpl {
    async fn find(&self, owner_id: Uuid) -> Result<Option<OwnerProfile>, RepositoryError> {
        owner_entity::Entity::find_by_id(owner_id)
            .one(self.db.as_ref())
            .await?
            .map(OwnerProfile::try_from)
            .transpose()
    }

    async fn upsert_owner(&self, profile: &OwnerProfile) -> Result<OwnerProfile, RepositoryError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let credits_remaining = match profile.credits {
            CreditBalance::Limited(n) => n,
            CreditBalance::Unlimited => 0,
        };
        let saved_search = profile
            .saved_search
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| RepositoryError::Corrupted(e.to_string()))?;

        let model = owner_entity::ActiveModel {
            id: Set(profile.owner_id),
            plan: Set(profile.plan.to_string()),
            credits_remaining: Set(credits_remaining),
            max_cron_jobs: Set(profile.max_cron_jobs),
            saved_search: Set(saved_search),
            created_at: Set(now),
            updated_at: Set(now),
        };

        owner_entity::Entity::insert(model)
            .on_conflict(
                OnConflict::column(owner_entity::Column::Id)
                    .update_columns([
                        owner_entity::Column::Plan,
                        owner_entity::Column::CreditsRemaining,
                        owner_entity::Column::MaxCronJobs,
                        owner_entity::Column::SavedSearch,
                        owner_entity::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;

        self.find(profile.owner_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn decrement_credit_if_positive(&self, owner_id: Uuid) -> Result<bool, RepositoryError> {
        // 单条条件更新，并发触发时不会重复扣减
        let result = owner_entity::Entity::update_many()
            .col_expr(
                owner_entity::Column::CreditsRemaining,
                Expr::col(owner_entity::Column::CreditsRemaining).sub(1),
            )
            .col_expr(
                owner_entity::Column::UpdatedAt,
                Expr::value(DateTime::<FixedOffset>::from(Utc::now())),
            )
            .filter(owner_entity::Column::Id.eq(owner_id))
            .filter(owner_entity::Column::CreditsRemaining.gt(0))
            .exec(self.db.as_ref())
            .await?;

        debug!(%owner_id, decremented = result.rows_affected == 1, "Credit decrement");
        Ok(result.rows_affected == 1)
    }

    async fn reset_daily_credits(&self) -> Result<u64, RepositoryError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let mut total = 0;

        for plan in PlanTier::ALL {
            let Some(allowance) = plan.daily_credits() else {
                continue;
            };
            let result = owner_entity::Entity::update_many()
                .col_expr(owner_entity::Column::CreditsRemaining, Expr::value(allowance))
                .col_expr(owner_entity::Column::UpdatedAt, Expr::value(now))
                .filter(owner_entity::Column::Plan.eq(plan.to_string()))
                .exec(self.db.as_ref())
                .await?;
            total += result.rows_affected;
        }

        info!(owners = total, "Daily credits reset");
        Ok(total)
    }
}
