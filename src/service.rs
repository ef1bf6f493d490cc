//! Inbound search entry point with a deadline.

use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::crawler::Crawler;
use crate::models::{CrawlResult, QueryError};

/// Errors returned to search callers.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] QueryError),
    /// The crawl was abandoned at the deadline. Its browser session is
    /// released when the crawl future is dropped.
    #[error("search did not finish within {}s", .0.as_secs())]
    TimedOut(Duration),
}

impl SearchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut(_))
    }
}

/// Answers "find up to N listings matching this role".
pub struct JobSearchService {
    crawler: Crawler,
    deadline: Duration,
}

impl JobSearchService {
    /// Service using the crawler's configured search timeout.
    pub fn new(crawler: Crawler) -> Self {
        let deadline = crawler.config().search_timeout();
        Self { crawler, deadline }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn crawler(&self) -> &Crawler {
        &self.crawler
    }

    /// Crawl for up to `max_results` listings.
    ///
    /// `location` falls back to the configured default. Fatal crawl
    /// failures are reported inside the returned [`CrawlResult`].
    pub async fn search(
        &self,
        role: &str,
        max_results: usize,
        location: Option<&str>,
    ) -> Result<CrawlResult, SearchError> {
        let query = self.crawler.query(role, max_results, location)?;
        info!(
            "Searching {:?} in {:?} (max {})",
            query.role(),
            query.location(),
            query.cap()
        );

        match tokio::time::timeout(self.deadline, self.crawler.crawl(query)).await {
            Ok(result) => Ok(result),
            Err(_) => {
                warn!("Search for {:?} exceeded {:?}", role.trim(), self.deadline);
                Err(SearchError::TimedOut(self.deadline))
            }
        }
    }
}
