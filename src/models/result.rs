//! Per-invocation crawl output.

use serde::{Deserialize, Serialize};

use super::{ListingRecord, SearchQuery};

/// Final status of a crawl invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum CrawlStatus {
    Success,
    /// An unrecoverable failure, carrying a human-readable message.
    Error(String),
}

impl CrawlStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error(_) => "error",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Counters accumulated over one crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStats {
    /// Unique candidate URLs produced by discovery.
    pub discovered: usize,
    /// Listings fetched over the network and upserted.
    pub fetched: usize,
    /// Listings served from the store without a network call.
    pub cached: usize,
    /// Candidates that yielded no listing.
    pub skipped: usize,
}

/// The result handed back to the caller of a crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub query: SearchQuery,
    /// Listings in discovery order.
    pub listings: Vec<ListingRecord>,
    pub count: usize,
    #[serde(flatten)]
    pub status: CrawlStatus,
    pub stats: CrawlStats,
    pub elapsed_ms: u64,
}

impl CrawlResult {
    pub fn success(
        query: SearchQuery,
        listings: Vec<ListingRecord>,
        stats: CrawlStats,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            query,
            count: listings.len(),
            listings,
            status: CrawlStatus::Success,
            stats,
            elapsed_ms,
        }
    }

    pub fn failure(query: SearchQuery, message: String, stats: CrawlStats, elapsed_ms: u64) -> Self {
        Self {
            query,
            listings: Vec::new(),
            count: 0,
            status: CrawlStatus::Error(message),
            stats,
            elapsed_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_with_message() {
        let query = SearchQuery::new("rust", 5, "India").unwrap();
        let result = CrawlResult::failure(
            query,
            "browser unavailable".to_string(),
            CrawlStats::default(),
            10,
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "browser unavailable");
        assert_eq!(json["count"], 0);
    }

    #[test]
    fn test_success_counts_listings() {
        let query = SearchQuery::new("rust", 5, "India").unwrap();
        let result = CrawlResult::success(query, Vec::new(), CrawlStats::default(), 0);
        assert!(result.status.is_success());
        assert_eq!(result.count, 0);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "success");
    }
}
