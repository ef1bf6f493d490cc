//! In-process listing store.
//!
//! Mirrors the SQLite repository's semantics: one row per url, ids assigned
//! on insert, conflicts reported instead of raised.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{InsertOutcome, ListingStore, StoreError};
use crate::models::{ListingRecord, NewListing};

#[derive(Default)]
struct Inner {
    next_id: i32,
    by_url: HashMap<String, ListingRecord>,
}

/// Listing store held entirely in memory.
#[derive(Default)]
pub struct MemoryListingStore {
    inner: Mutex<Inner>,
}

impl MemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListingStore for MemoryListingStore {
    async fn find_by_url(&self, url: &str) -> Result<Option<ListingRecord>, StoreError> {
        Ok(self.inner.lock().await.by_url.get(url).cloned())
    }

    async fn insert(&self, listing: &NewListing) -> Result<InsertOutcome, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.by_url.contains_key(&listing.url) {
            return Ok(InsertOutcome::Conflict);
        }

        inner.next_id += 1;
        let record = ListingRecord::from_new(inner.next_id, listing.clone());
        inner.by_url.insert(record.url.clone(), record.clone());
        Ok(InsertOutcome::Inserted(record))
    }

    async fn update_by_url(&self, listing: &NewListing) -> Result<Option<ListingRecord>, StoreError> {
        let mut inner = self.inner.lock().await;
        let Some(record) = inner.by_url.get_mut(&listing.url) else {
            return Ok(None);
        };

        record.title = listing.title.clone();
        record.company = listing.company.clone();
        record.location = listing.location.clone();
        record.description = listing.description.clone();
        record.source = listing.source.clone();
        record.last_updated = listing.last_updated;
        Ok(Some(record.clone()))
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<ListingRecord>, StoreError> {
        let inner = self.inner.lock().await;
        let mut records: Vec<_> = inner.by_url.values().cloned().collect();
        records.sort_by(|a, b| {
            b.last_updated
                .cmp(&a.last_updated)
                .then_with(|| b.id.cmp(&a.id))
        });
        records.truncate(limit);
        Ok(records)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.inner.lock().await.by_url.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(url: &str, description: &str) -> NewListing {
        NewListing::new(url.to_string(), "Engineer", "Acme", "Pune", description, "test")
    }

    #[tokio::test]
    async fn test_insert_reports_conflict_for_existing_url() {
        let store = MemoryListingStore::new();
        let first = store.insert(&listing("https://x.test/jobs/view/1", "a")).await.unwrap();
        assert!(matches!(first, InsertOutcome::Inserted(ref r) if r.id == 1));

        let second = store.insert(&listing("https://x.test/jobs/view/1", "b")).await.unwrap();
        assert_eq!(second, InsertOutcome::Conflict);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_preserves_id_and_discovery_time() {
        let store = MemoryListingStore::new();
        let InsertOutcome::Inserted(original) =
            store.insert(&listing("https://x.test/jobs/view/1", "old")).await.unwrap()
        else {
            panic!("expected insert");
        };

        let mut newer = listing("https://x.test/jobs/view/1", "new");
        newer.discovered_at = original.discovered_at + chrono::Duration::days(3);
        newer.last_updated = newer.discovered_at;

        let updated = store.update_by_url(&newer).await.unwrap().unwrap();
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.description, "new");
        assert_eq!(updated.discovered_at, original.discovered_at);
        assert!(updated.last_updated > original.last_updated);
    }

    #[tokio::test]
    async fn test_update_missing_url_returns_none() {
        let store = MemoryListingStore::new();
        let result = store.update_by_url(&listing("https://x.test/jobs/view/9", "")).await;
        assert!(result.unwrap().is_none());
    }
}
