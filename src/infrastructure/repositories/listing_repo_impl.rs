// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::listing::{Listing, ListingFlags, UpsertSummary};
use crate::domain::repositories::listing_repository::ListingRepository;
use crate::domain::repositories::task_repository::RepositoryError;
use crate::infrastructure::database::entities::listing as listing_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// 职位仓库实现
#[derive(Clone)]
pub struct ListingRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl ListingRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// 查询本批次中已经存在的URL
    async fn existing_urls(
        &self,
        owner_id: Uuid,
        urls: Vec<String>,
    ) -> Result<HashSet<String>, RepositoryError> {
        let models = listing_entity::Entity::find()
            .filter(listing_entity::Column::OwnerId.eq(owner_id))
            .filter(listing_entity::Column::Url.is_in(urls))
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(|m| m.url).collect())
    }

    /// 批量写入：已存在的记录只更新抓取字段
    async fn bulk_upsert(
        &self,
        models: Vec<listing_entity::ActiveModel>,
    ) -> Result<(), RepositoryError> {
        listing_entity::Entity::insert_many(models)
            .on_conflict(
                OnConflict::columns([listing_entity::Column::Url, listing_entity::Column::OwnerId])
                    .update_columns([
                        listing_entity::Column::Title,
                        listing_entity::Column::Company,
                        listing_entity::Column::Location,
                        listing_entity::Column::PostedDate,
                        listing_entity::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;
        Ok(())
    }

    /// 逐条写入，冲突与失败都只影响当前记录
    async fn insert_one_by_one(
        &self,
        models: Vec<(String, listing_entity::ActiveModel)>,
    ) -> (usize, usize) {
        let mut inserted = 0;
        let mut conflicts = 0;

        for (url, model) in models {
            let result = listing_entity::Entity::insert(model)
                .on_conflict(
                    OnConflict::columns([
                        listing_entity::Column::Url,
                        listing_entity::Column::OwnerId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(self.db.as_ref())
                .await;

            match result {
                Ok(rows) if rows > 0 => inserted += 1,
                Ok(_) => conflicts += 1,
                Err(e) => {
                    warn!(%url, error = %e, "Failed to insert listing, skipping");
                    conflicts += 1;
                }
            }
        }

        (inserted, conflicts)
    }
}

impl From<listing_entity::Model> for Listing {
    fn from(model: listing_entity::Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            title: model.title,
            company: model.company,
            location: model.location,
            url: model.url,
            posted_date: model.posted_date,
            flags: ListingFlags {
                applied: model.applied,
                hidden: model.hidden,
                interview: model.interview,
                rejected: model.rejected,
            },
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn to_active_model(
    owner_id: Uuid,
    listing: &Listing,
    now: DateTime<FixedOffset>,
) -> listing_entity::ActiveModel {
    listing_entity::ActiveModel {
        id: Set(listing.id),
        owner_id: Set(owner_id),
        title: Set(listing.title.clone()),
        company: Set(listing.company.clone()),
        location: Set(listing.location.clone()),
        url: Set(listing.url.clone()),
        posted_date: Set(listing.posted_date),
        applied: Set(listing.flags.applied),
        hidden: Set(listing.flags.hidden),
        interview: Set(listing.flags.interview),
        rejected: Set(listing.flags.rejected),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

#[async_trait]
impl ListingRepository for ListingRepositoryImpl {
    async fn upsert_listings(
        &self,
        owner_id: Uuid,
        listings: &[Listing],
    ) -> Result<UpsertSummary, RepositoryError> {
        let mut summary = UpsertSummary {
            received: listings.len(),
            ..Default::default()
        };

        // 同一批次内重复的URL只写一次
        let mut seen = HashSet::new();
        let unique: Vec<&Listing> = listings
            .iter()
            .filter(|l| seen.insert(l.url.as_str()))
            .collect();
        let batch_duplicates = listings.len() - unique.len();

        if unique.is_empty() {
            return Ok(summary);
        }

        let now: DateTime<FixedOffset> = Utc::now().into();
        let models: Vec<listing_entity::ActiveModel> = unique
            .iter()
            .map(|l| to_active_model(owner_id, l, now))
            .collect();

        let urls: Vec<String> = unique.iter().map(|l| l.url.clone()).collect();
        let existing = self.existing_urls(owner_id, urls.clone()).await?;

        match self.bulk_upsert(models.clone()).await {
            Ok(()) => {
                summary.inserted = unique.len() - existing.len();
                summary.conflicts = existing.len() + batch_duplicates;
            }
            Err(e) => {
                warn!(
                    error = %e,
                    count = models.len(),
                    "Bulk listing upsert failed, falling back to per-record inserts"
                );
                let (inserted, conflicts) = self
                    .insert_one_by_one(urls.into_iter().zip(models).collect())
                    .await;
                summary.inserted = inserted;
                summary.conflicts = conflicts + batch_duplicates;
            }
        }

        debug!(
            %owner_id,
            received = summary.received,
            inserted = summary.inserted,
            conflicts = summary.conflicts,
            "Listings upserted"
        );
        Ok(summary)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Listing>, RepositoryError> {
        let models = listing_entity::Entity::find()
            .filter(listing_entity::Column::OwnerId.eq(owner_id))
            .order_by_desc(listing_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn set_flags(
        &self,
        owner_id: Uuid,
        listing_id: Uuid,
        flags: ListingFlags,
    ) -> Result<Listing, RepositoryError> {
        let model = listing_entity::Entity::find_by_id(listing_id)
            .filter(listing_entity::Column::OwnerId.eq(owner_id))
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let mut active: listing_entity::ActiveModel = model.into();
        active.applied = Set(flags.applied);
        active.hidden = Set(flags.hidden);
        active.interview = Set(flags.interview);
        active.rejected = Set(flags.rejected);
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(self.db.as_ref()).await?;
        Ok(updated.into())
    }
}
