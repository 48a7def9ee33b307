// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use jobscout::domain::models::listing::{ListingFlags, ScrapedListing};
use jobscout::domain::repositories::listing_repository::ListingRepository;
use jobscout::infrastructure::database::connection;
use jobscout::infrastructure::repositories::listing_repo_impl::ListingRepositoryImpl;
use std::sync::Arc;
use uuid::Uuid;

fn scraped(slug: &str) -> ScrapedListing {
    ScrapedListing {
        title: format!("Engineer {}", slug),
        company: "Globex".to_string(),
        location: Some("Remote".to_string()),
        url: format!("https://www.linkedin.com/jobs/view/{}", slug),
        posted_date: None,
    }
}

async fn repository() -> ListingRepositoryImpl {
    let db = connection::connect_in_memory().await.unwrap();
    ListingRepositoryImpl::new(Arc::new(db))
}

#[tokio::test]
async fn repeated_upsert_is_idempotent_and_keeps_flags() {
    let repo = repository().await;
    let owner_id = Uuid::new_v4();
    let batch: Vec<_> = ["a", "b"]
        .into_iter()
        .map(|s| scraped(s).into_listing(owner_id))
        .collect();

    let summary = repo.upsert_listings(owner_id, &batch).await.unwrap();
    assert_eq!(summary.received, 2);
    assert_eq!(summary.inserted, 2);

    let stored = repo.list_by_owner(owner_id).await.unwrap();
    let target = stored.iter().find(|l| l.url.ends_with("/a")).unwrap();
    let flags = ListingFlags {
        applied: true,
        interview: true,
        ..ListingFlags::default()
    };
    repo.set_flags(owner_id, target.id, flags).await.unwrap();

    // 同样的职位以新的ID再抓取一次
    let again: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .map(|s| scraped(s).into_listing(owner_id))
        .collect();
    let summary = repo.upsert_listings(owner_id, &again).await.unwrap();
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.conflicts, 2);

    let stored = repo.list_by_owner(owner_id).await.unwrap();
    assert_eq!(stored.len(), 3);
    let target = stored.iter().find(|l| l.url.ends_with("/a")).unwrap();
    assert_eq!(target.flags, flags);
}

#[tokio::test]
async fn listings_are_scoped_per_owner() {
    let repo = repository().await;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    repo.upsert_listings(alice, &[scraped("a").into_listing(alice)])
        .await
        .unwrap();
    let summary = repo
        .upsert_listings(bob, &[scraped("a").into_listing(bob)])
        .await
        .unwrap();

    assert_eq!(summary.inserted, 1);
    assert_eq!(repo.list_by_owner(alice).await.unwrap().len(), 1);
    assert_eq!(repo.list_by_owner(bob).await.unwrap().len(), 1);
}

#[tokio::test]
async fn setting_flags_on_foreign_listing_fails() {
    let repo = repository().await;
    let owner_id = Uuid::new_v4();
    repo.upsert_listings(owner_id, &[scraped("a").into_listing(owner_id)])
        .await
        .unwrap();
    let listing = repo.list_by_owner(owner_id).await.unwrap().remove(0);

    let result = repo
        .set_flags(Uuid::new_v4(), listing.id, ListingFlags::default())
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn failed_bulk_write_degrades_to_per_record_inserts() {
    let repo = repository().await;
    let owner_id = Uuid::new_v4();
    repo.upsert_listings(owner_id, &[scraped("a").into_listing(owner_id)])
        .await
        .unwrap();
    let existing = repo.list_by_owner(owner_id).await.unwrap().remove(0);

    // 新URL却复用了已有记录的主键，整批语句会失败
    let mut colliding = scraped("z").into_listing(owner_id);
    colliding.id = existing.id;
    let batch = vec![
        colliding,
        scraped("b").into_listing(owner_id),
        scraped("c").into_listing(owner_id),
    ];

    let summary = repo.upsert_listings(owner_id, &batch).await.unwrap();
    assert_eq!(summary.received, 3);
    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.conflicts, 1);

    let stored = repo.list_by_owner(owner_id).await.unwrap();
    assert_eq!(stored.len(), 3);
    assert!(stored.iter().any(|l| l.url.ends_with("/b")));
    assert!(stored.iter().any(|l| l.url.ends_with("/c")));
    assert!(!stored.iter().any(|l| l.url.ends_with("/z")));

    let original = stored.iter().find(|l| l.id == existing.id).unwrap();
    assert!(original.url.ends_with("/a"));
}
