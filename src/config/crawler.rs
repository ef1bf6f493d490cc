//! Crawl behavior settings.

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::crawler::DelayRange;

/// Tunables for discovery, fetching and pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Listings shown per search results page.
    pub page_size: usize,
    /// Bound on page navigation and on waiting for listing links.
    pub navigation_timeout_secs: u64,
    /// Bound on a single detail page GET.
    pub fetch_timeout_secs: u64,
    /// Pause after scrolling so lazy-loaded results can render.
    pub scroll_pause_ms: u64,
    pub min_cap: usize,
    pub max_cap: usize,
    /// Location used when the caller gives none and for listings without one.
    pub default_location: String,
    pub locale: String,
    pub timezone: String,
    pub page_delay_ms: DelayRange,
    pub fetch_delay_ms: DelayRange,
    /// Detail pages fetched at once. 1 fetches strictly in sequence.
    pub fetch_concurrency: usize,
    /// Extra attempts for transient fetch failures.
    pub max_retries: u32,
    /// First retry delay; doubles on each further attempt.
    pub retry_backoff_ms: u64,
    /// Stored listings older than this are fetched again. 0 never refreshes.
    pub refresh_ttl_days: u32,
    /// Overall deadline for one search.
    pub search_timeout_secs: u64,
    /// Inline user agents.
    pub identities: Vec<String>,
    /// File with one user agent per line.
    pub identity_file: Option<PathBuf>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_size: 25,
            navigation_timeout_secs: 30,
            fetch_timeout_secs: 20,
            scroll_pause_ms: 1500,
            min_cap: 1,
            max_cap: 200,
            default_location: "India".to_string(),
            locale: "en-IN".to_string(),
            timezone: "Asia/Kolkata".to_string(),
            page_delay_ms: DelayRange::new(1000, 3000),
            fetch_delay_ms: DelayRange::new(500, 1500),
            fetch_concurrency: 2,
            max_retries: 2,
            retry_backoff_ms: 500,
            refresh_ttl_days: 14,
            search_timeout_secs: 300,
            identities: Vec::new(),
            identity_file: None,
        }
    }
}

impl CrawlerConfig {
    pub fn cap_bounds(&self) -> RangeInclusive<usize> {
        self.min_cap..=self.max_cap
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    /// Age after which a stored listing is refetched, if refresh is enabled.
    pub fn refresh_ttl(&self) -> Option<chrono::Duration> {
        (self.refresh_ttl_days > 0).then(|| chrono::Duration::days(i64::from(self.refresh_ttl_days)))
    }
}
