//! Diesel row models for the listings table.

use diesel::prelude::*;

use super::{format_datetime, parse_datetime};
use crate::models::{ListingRecord, NewListing};
use crate::schema::listings;

/// Listing row from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = listings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ListingRow {
    pub id: i32,
    pub url: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub source: String,
    pub discovered_at: String,
    pub last_updated: String,
}

impl From<ListingRow> for ListingRecord {
    fn from(row: ListingRow) -> Self {
        ListingRecord {
            id: row.id,
            url: row.url,
            title: row.title,
            company: row.company,
            location: row.location,
            description: row.description,
            source: row.source,
            discovered_at: parse_datetime(&row.discovered_at),
            last_updated: parse_datetime(&row.last_updated),
        }
    }
}

/// New listing for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = listings)]
pub struct NewListingRow<'a> {
    pub url: &'a str,
    pub title: &'a str,
    pub company: &'a str,
    pub location: &'a str,
    pub description: &'a str,
    pub source: &'a str,
    pub discovered_at: String,
    pub last_updated: String,
}

impl<'a> From<&'a NewListing> for NewListingRow<'a> {
    fn from(listing: &'a NewListing) -> Self {
        Self {
            url: &listing.url,
            title: &listing.title,
            company: &listing.company,
            location: &listing.location,
            description: &listing.description,
            source: &listing.source,
            discovered_at: format_datetime(&listing.discovered_at),
            last_updated: format_datetime(&listing.last_updated),
        }
    }
}

/// Content fields overwritten when a listing is seen again.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = listings)]
pub struct ListingChanges<'a> {
    pub title: &'a str,
    pub company: &'a str,
    pub location: &'a str,
    pub description: &'a str,
    pub source: &'a str,
    pub last_updated: String,
}

impl<'a> From<&'a NewListing> for ListingChanges<'a> {
    fn from(listing: &'a NewListing) -> Self {
        Self {
            title: &listing.title,
            company: &listing.company,
            location: &listing.location,
            description: &listing.description,
            source: &listing.source,
            last_updated: format_datetime(&listing.last_updated),
        }
    }
}
