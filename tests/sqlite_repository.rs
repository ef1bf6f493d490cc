//! SQLite listing repository behavior on a real database file.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jobcrawl::crawler::upsert;
use jobcrawl::models::NewListing;
use jobcrawl::repository::{
    run_migrations, DbPool, DieselListingRepository, InsertOutcome, ListingStore,
};
use tempfile::TempDir;

async fn setup() -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("jobcrawl.db").display());
    run_migrations(&url).await.unwrap();
    (dir, url)
}

fn listing(n: u32, description: &str) -> NewListing {
    NewListing::new(
        format!("https://jobs.test/jobs/view/{n}"),
        &format!("Engineer {n}"),
        "Acme",
        "Pune",
        description,
        "testboard",
    )
}

#[tokio::test]
async fn test_migrations_apply_once() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("fresh.db").display());

    let applied = run_migrations(&url).await.unwrap();
    assert_eq!(applied, vec!["0001_listings", "0002_listing_indexes"]);

    let again = run_migrations(&url).await.unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn test_insert_and_find_by_url() {
    let (_dir, url) = setup().await;
    let repo = DieselListingRepository::new(DbPool::new(&url));
    let new = listing(1, "Write Rust");

    let InsertOutcome::Inserted(record) = repo.insert(&new).await.unwrap() else {
        panic!("expected a fresh insert");
    };
    assert!(record.id > 0);
    assert_eq!(record.title, "Engineer 1");

    let found = repo.find_by_url(&new.url).await.unwrap().unwrap();
    assert_eq!(found, record);
    assert!(repo
        .find_by_url("https://jobs.test/jobs/view/404")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_duplicate_url_is_a_conflict() {
    let (_dir, url) = setup().await;
    let repo = DieselListingRepository::new(DbPool::new(&url));

    repo.insert(&listing(1, "first")).await.unwrap();
    let outcome = repo.insert(&listing(1, "second")).await.unwrap();

    assert_eq!(outcome, InsertOutcome::Conflict);
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_update_by_url_preserves_identity() {
    let (_dir, url) = setup().await;
    let repo = DieselListingRepository::new(DbPool::new(&url));

    let mut original = listing(1, "old");
    original.discovered_at = Utc::now() - Duration::days(3);
    original.last_updated = original.discovered_at;
    let InsertOutcome::Inserted(stored) = repo.insert(&original).await.unwrap() else {
        panic!("expected a fresh insert");
    };

    let updated = repo
        .update_by_url(&listing(1, "new"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.id, stored.id);
    assert_eq!(updated.description, "new");
    assert_eq!(updated.discovered_at, stored.discovered_at);
    assert!(updated.last_updated > stored.last_updated);

    assert!(repo.update_by_url(&listing(2, "x")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_upsert_is_idempotent_per_url() {
    let (_dir, url) = setup().await;
    let repo = DieselListingRepository::new(DbPool::new(&url));

    let first = upsert(&repo, &listing(7, "v1")).await.unwrap();
    let second = upsert(&repo, &listing(7, "v2")).await.unwrap();

    assert_eq!(repo.count().await.unwrap(), 1);
    assert_eq!(first.id, second.id);
    assert_eq!(second.description, "v2");
    assert_eq!(second.discovered_at, first.discovered_at);
    assert!(second.last_updated >= first.last_updated);
}

#[tokio::test]
async fn test_concurrent_upserts_leave_one_row() {
    let (_dir, url) = setup().await;
    let a = Arc::new(DieselListingRepository::new(DbPool::new(&url)));
    let b = Arc::new(DieselListingRepository::new(DbPool::new(&url)));

    let from_a = listing(3, "from a");
    let from_b = listing(3, "from b");
    let (ra, rb) = tokio::join!(upsert(&*a, &from_a), upsert(&*b, &from_b));

    let (ra, rb) = (ra.unwrap(), rb.unwrap());
    assert_eq!(ra.id, rb.id);
    assert_eq!(a.count().await.unwrap(), 1);

    let stored = a.find_by_url(&from_a.url).await.unwrap().unwrap();
    assert!(stored.description == "from a" || stored.description == "from b");
}

#[tokio::test]
async fn test_list_recent_orders_by_last_updated() {
    let (_dir, url) = setup().await;
    let repo = DieselListingRepository::new(DbPool::new(&url));
    let now = Utc::now();

    for (n, age_hours) in [(1, 5), (2, 1), (3, 3)] {
        let mut new = listing(n, "desc");
        new.discovered_at = now - Duration::hours(age_hours);
        new.last_updated = new.discovered_at;
        repo.insert(&new).await.unwrap();
    }

    let recent = repo.list_recent(2).await.unwrap();
    let titles: Vec<_> = recent.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["Engineer 2", "Engineer 3"]);
    assert_eq!(repo.count().await.unwrap(), 3);
    assert_eq!(repo.list_recent(10).await.unwrap().len(), 3);
}
