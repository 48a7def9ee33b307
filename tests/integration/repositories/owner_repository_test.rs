// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use jobscout::domain::models::owner::{CreditBalance, OwnerProfile, PlanTier};
use jobscout::domain::repositories::owner_repository::OwnerRepository;
use jobscout::infrastructure::database::connection;
use jobscout::infrastructure::repositories::owner_repo_impl::OwnerRepositoryImpl;
use std::sync::Arc;
use uuid::Uuid;

async fn repository() -> Arc<OwnerRepositoryImpl> {
    let db = connection::connect_in_memory().await.unwrap();
    Arc::new(OwnerRepositoryImpl::new(Arc::new(db)))
}

#[tokio::test]
async fn concurrent_decrements_never_go_negative() {
    let repo = repository().await;
    let owner = OwnerProfile::new(Uuid::new_v4(), PlanTier::Free).with_credits(3);
    repo.upsert_owner(&owner).await.unwrap();

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let repo = repo.clone();
            let owner_id = owner.owner_id;
            tokio::spawn(async move { repo.decrement_credit_if_positive(owner_id).await })
        })
        .collect();

    let mut granted = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap() {
            granted += 1;
        }
    }

    assert_eq!(granted, 3);
    let stored = repo.find(owner.owner_id).await.unwrap().unwrap();
    assert_eq!(stored.credits, CreditBalance::Limited(0));
}

#[tokio::test]
async fn unlimited_plan_round_trips() {
    let repo = repository().await;
    let owner = OwnerProfile::new(Uuid::new_v4(), PlanTier::Unlimited);

    let stored = repo.upsert_owner(&owner).await.unwrap();
    assert_eq!(stored.credits, CreditBalance::Unlimited);
    assert_eq!(stored.max_cron_jobs, 10);
}

#[tokio::test]
async fn daily_reset_restores_plan_allowance() {
    let repo = repository().await;
    let free = OwnerProfile::new(Uuid::new_v4(), PlanTier::Free).with_credits(0);
    let pro = OwnerProfile::new(Uuid::new_v4(), PlanTier::Pro).with_credits(1);
    let unlimited = OwnerProfile::new(Uuid::new_v4(), PlanTier::Unlimited);
    for owner in [&free, &pro, &unlimited] {
        repo.upsert_owner(owner).await.unwrap();
    }

    let reset = repo.reset_daily_credits().await.unwrap();
    assert_eq!(reset, 2);

    let free = repo.find(free.owner_id).await.unwrap().unwrap();
    let pro = repo.find(pro.owner_id).await.unwrap().unwrap();
    assert_eq!(free.credits, CreditBalance::Limited(5));
    assert_eq!(pro.credits, CreditBalance::Limited(50));
}

#[tokio::test]
async fn unknown_owner_is_not_decremented() {
    let repo = repository().await;
    assert!(!repo.decrement_credit_if_positive(Uuid::new_v4()).await.unwrap());
    assert!(repo.find(Uuid::new_v4()).await.unwrap().is_none());
}
