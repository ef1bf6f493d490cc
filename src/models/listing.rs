//! Job listing models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 200;
/// Maximum company name length in characters.
pub const COMPANY_MAX_CHARS: usize = 100;
/// Maximum location length in characters.
pub const LOCATION_MAX_CHARS: usize = 100;
/// Maximum description length in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 5000;

/// Sentinel used when a listing has no recoverable title.
pub const UNKNOWN_TITLE: &str = "Unknown";
/// Sentinel used when a listing has no recoverable hiring organization.
pub const UNKNOWN_COMPANY: &str = "Unknown";

/// A listing extracted from a detail page, not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewListing {
    /// Normalized listing URL (unique key in the store).
    pub url: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    /// Tag identifying the job board the listing came from.
    pub source: String,
    pub discovered_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl NewListing {
    /// Create a listing stamped with the current time.
    ///
    /// Field lengths are capped here so every constructed listing already
    /// satisfies the storage limits.
    pub fn new(
        url: String,
        title: &str,
        company: &str,
        location: &str,
        description: &str,
        source: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            url,
            title: truncate_chars(title, TITLE_MAX_CHARS),
            company: truncate_chars(company, COMPANY_MAX_CHARS),
            location: truncate_chars(location, LOCATION_MAX_CHARS),
            description: truncate_chars(description, DESCRIPTION_MAX_CHARS),
            source: source.to_string(),
            discovered_at: now,
            last_updated: now,
        }
    }
}

/// A listing as stored, including its store-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: i32,
    pub url: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub source: String,
    pub discovered_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl ListingRecord {
    /// Build a stored record from a new listing and its assigned id.
    pub fn from_new(id: i32, listing: NewListing) -> Self {
        Self {
            id,
            url: listing.url,
            title: listing.title,
            company: listing.company,
            location: listing.location,
            description: listing.description,
            source: listing.source,
            discovered_at: listing.discovered_at,
            last_updated: listing.last_updated,
        }
    }

    /// Whether this record was last refreshed before `cutoff`.
    pub fn is_stale(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_updated < cutoff
    }
}

/// Truncate a string to at most `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_new_listing_caps_field_lengths() {
        let long = "x".repeat(6000);
        let listing = NewListing::new(
            "https://example.com/jobs/view/1".to_string(),
            &long,
            &long,
            &long,
            &long,
            "test",
        );
        assert_eq!(listing.title.chars().count(), TITLE_MAX_CHARS);
        assert_eq!(listing.company.chars().count(), COMPANY_MAX_CHARS);
        assert_eq!(listing.location.chars().count(), LOCATION_MAX_CHARS);
        assert_eq!(listing.description.chars().count(), DESCRIPTION_MAX_CHARS);
        assert_eq!(listing.discovered_at, listing.last_updated);
    }
}
