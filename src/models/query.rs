//! Crawl inputs: the search query and the candidate URLs it discovers.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Result cap bounds used when the caller does not supply its own.
pub const DEFAULT_CAP_RANGE: RangeInclusive<usize> = 1..=200;

/// Reasons a search query is rejected before any crawling happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("role must not be empty")]
    EmptyRole,
    #[error("max results must be between {min} and {max}, got {got}")]
    CapOutOfRange { got: usize, min: usize, max: usize },
}

/// Immutable input to a single crawl invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    role: String,
    cap: usize,
    location: String,
}

impl SearchQuery {
    /// Validate and build a query using the default cap bounds.
    pub fn new(role: &str, cap: usize, location: &str) -> Result<Self, QueryError> {
        Self::with_bounds(role, cap, location, DEFAULT_CAP_RANGE)
    }

    /// Validate and build a query against explicit cap bounds.
    pub fn with_bounds(
        role: &str,
        cap: usize,
        location: &str,
        bounds: RangeInclusive<usize>,
    ) -> Result<Self, QueryError> {
        let role = role.trim();
        if role.is_empty() {
            return Err(QueryError::EmptyRole);
        }
        if !bounds.contains(&cap) {
            return Err(QueryError::CapOutOfRange {
                got: cap,
                min: *bounds.start(),
                max: *bounds.end(),
            });
        }
        Ok(Self {
            role: role.to_string(),
            cap,
            location: location.trim().to_string(),
        })
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

/// A normalized, absolute listing detail URL.
///
/// Normalization keeps scheme, host, port and path; query string and
/// fragment are dropped. Two candidates are duplicates exactly when their
/// normalized strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateUrl(String);

impl CandidateUrl {
    /// Normalize an href found on a search results page.
    ///
    /// Relative hrefs are resolved against `base`. Returns `None` for
    /// non-http(s) links and links whose path does not contain
    /// `path_marker` (an empty marker accepts every path).
    pub fn normalize(href: &str, base: Option<&Url>, path_marker: &str) -> Option<Self> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }

        let mut url = match base {
            Some(base) => base.join(href).ok()?,
            None => Url::parse(href).ok()?,
        };

        if url.scheme() != "http" && url.scheme() != "https" {
            return None;
        }
        url.host_str()?;

        if !path_marker.is_empty() && !url.path().contains(path_marker) {
            return None;
        }

        url.set_query(None);
        url.set_fragment(None);
        Some(Self(url.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CandidateUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CandidateUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
