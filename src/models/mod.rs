//! Data models for jobcrawl.

mod listing;
mod query;
mod result;

pub use listing::{truncate_chars, ListingRecord, NewListing};
pub use listing::{COMPANY_MAX_CHARS, DESCRIPTION_MAX_CHARS, LOCATION_MAX_CHARS, TITLE_MAX_CHARS};
pub use listing::{UNKNOWN_COMPANY, UNKNOWN_TITLE};
pub use query::{CandidateUrl, QueryError, SearchQuery};
pub use result::{CrawlResult, CrawlStats, CrawlStatus};
