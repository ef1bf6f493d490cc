//! Repository layer for listing persistence.
//!
//! The crawler talks to storage only through [`ListingStore`]. Two
//! implementations exist: the Diesel-backed SQLite repository used by the
//! binary and an in-process store for tests and embedding.

pub mod listing;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod util;

pub use listing::DieselListingRepository;
pub use memory::MemoryListingStore;
pub use migrations::run_migrations;
pub use pool::{DbError, DbPool};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use crate::models::{ListingRecord, NewListing};

/// Errors raised by a listing store.
///
/// Uniqueness conflicts are not errors: they come back as
/// [`InsertOutcome::Conflict`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("listing vanished during upsert: {0}")]
    Missing(String),
}

/// Result of an insert attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(ListingRecord),
    /// A row with the same url already exists.
    Conflict,
}

/// Storage for job listings keyed by url.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Look up a listing by its normalized url.
    async fn find_by_url(&self, url: &str) -> Result<Option<ListingRecord>, StoreError>;

    /// Insert a listing, reporting a uniqueness conflict instead of failing.
    async fn insert(&self, listing: &NewListing) -> Result<InsertOutcome, StoreError>;

    /// Overwrite content fields and `last_updated` of the row with this url.
    ///
    /// `discovered_at` and the id are preserved. Returns the stored record,
    /// or `None` if no row matched.
    async fn update_by_url(&self, listing: &NewListing) -> Result<Option<ListingRecord>, StoreError>;

    /// Most recently updated listings first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<ListingRecord>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Format a timestamp for storage.
///
/// Fixed precision keeps lexical order equal to chronological order.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}
