//! Insert-or-update keyed by listing url.

use tracing::debug;

use crate::models::{ListingRecord, NewListing};
use crate::repository::{InsertOutcome, ListingStore, StoreError};

/// Persist a listing, updating the existing row on a uniqueness conflict.
///
/// The conflict path covers a row inserted by another crawl between our
/// existence check and this insert. Last write wins for content fields;
/// `discovered_at` keeps the first writer's value.
pub async fn upsert(store: &dyn ListingStore, listing: &NewListing) -> Result<ListingRecord, StoreError> {
    match store.insert(listing).await? {
        InsertOutcome::Inserted(record) => Ok(record),
        InsertOutcome::Conflict => {
            debug!("Listing exists, updating: {}", listing.url);
            store
                .update_by_url(listing)
                .await?
                .ok_or_else(|| StoreError::Missing(listing.url.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryListingStore;

    fn listing(description: &str) -> NewListing {
        NewListing::new(
            "https://x.test/jobs/view/7".to_string(),
            "Engineer",
            "Acme",
            "Pune",
            description,
            "test",
        )
    }

    #[tokio::test]
    async fn test_second_upsert_updates_in_place() {
        let store = MemoryListingStore::new();
        let first = upsert(&store, &listing("first")).await.unwrap();

        let mut second = listing("second");
        second.last_updated = first.last_updated + chrono::Duration::seconds(1);
        second.discovered_at = second.last_updated;
        let updated = upsert(&store, &second).await.unwrap();

        assert_eq!(updated.id, first.id);
        assert_eq!(updated.description, "second");
        assert!(updated.last_updated > first.last_updated);
        assert_eq!(updated.discovered_at, first.discovered_at);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_upserts_leave_one_row() {
        let store = MemoryListingStore::new();
        let (la, lb) = (listing("a"), listing("b"));
        let (a, b) = tokio::join!(upsert(&store, &la), upsert(&store, &lb));
        assert_eq!(a.unwrap().id, b.unwrap().id);
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
