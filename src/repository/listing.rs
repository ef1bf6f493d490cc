//! Diesel-based listing repository for SQLite.
//!
//! Uses diesel-async's SyncConnectionWrapper to provide an async interface
//! while maintaining Diesel's compile-time query checking. Uniqueness on
//! `url` is enforced by the schema; this layer only translates the
//! constraint violation into [`InsertOutcome::Conflict`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use super::models::{ListingChanges, ListingRow, NewListingRow};
use super::pool::{DbPool, SqliteConn};
use super::util::is_unique_violation;
use super::{InsertOutcome, ListingStore, StoreError};
use crate::models::{ListingRecord, NewListing};
use crate::schema::listings;

/// SQLite listing repository.
#[derive(Clone)]
pub struct DieselListingRepository {
    pool: DbPool,
}

impl DieselListingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn load_by_url(
        conn: &mut SqliteConn,
        url: &str,
    ) -> Result<Option<ListingRecord>, diesel::result::Error> {
        listings::table
            .filter(listings::url.eq(url))
            .select(ListingRow::as_select())
            .first::<ListingRow>(conn)
            .await
            .optional()
            .map(|row| row.map(ListingRecord::from))
    }
}

#[async_trait]
impl ListingStore for DieselListingRepository {
    async fn find_by_url(&self, url: &str) -> Result<Option<ListingRecord>, StoreError> {
        let mut conn = self.pool.get().await?;
        Ok(Self::load_by_url(&mut conn, url).await?)
    }

    async fn insert(&self, listing: &NewListing) -> Result<InsertOutcome, StoreError> {
        let mut conn = self.pool.get().await?;

        let result = diesel::insert_into(listings::table)
            .values(NewListingRow::from(listing))
            .execute(&mut conn)
            .await;

        match result {
            Ok(_) => Self::load_by_url(&mut conn, &listing.url)
                .await?
                .map(InsertOutcome::Inserted)
                .ok_or_else(|| StoreError::Missing(listing.url.clone())),
            Err(e) if is_unique_violation(&e) => {
                debug!("Insert conflict on {}", listing.url);
                Ok(InsertOutcome::Conflict)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_by_url(&self, listing: &NewListing) -> Result<Option<ListingRecord>, StoreError> {
        let mut conn = self.pool.get().await?;

        let rows = diesel::update(listings::table.filter(listings::url.eq(&listing.url)))
            .set(ListingChanges::from(listing))
            .execute(&mut conn)
            .await?;

        if rows == 0 {
            return Ok(None);
        }
        Ok(Self::load_by_url(&mut conn, &listing.url).await?)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<ListingRecord>, StoreError> {
        let mut conn = self.pool.get().await?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = listings::table
            .order((listings::last_updated.desc(), listings::id.desc()))
            .limit(limit)
            .select(ListingRow::as_select())
            .load::<ListingRow>(&mut conn)
            .await?;

        Ok(rows.into_iter().map(ListingRecord::from).collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let mut conn = self.pool.get().await?;

        let count: i64 = listings::table.count().get_result(&mut conn).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
