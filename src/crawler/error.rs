//! Errors that abort a crawl.

use thiserror::Error;

use crate::repository::StoreError;
use crate::scrapers::RenderError;

/// Fatal crawl failures. Per-page and per-listing problems never surface
/// here; they are logged and folded into the crawl stats.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid search URL {url:?}: {reason}")]
    InvalidTarget { url: String, reason: String },
    #[error(transparent)]
    Session(#[from] RenderError),
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}
