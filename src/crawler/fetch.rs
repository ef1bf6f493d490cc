//! Detail page fetch, extraction and persistence for one candidate URL.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use super::extract::Extractor;
use super::upsert::upsert;
use crate::config::TargetConfig;
use crate::models::{CandidateUrl, ListingRecord, NewListing};
use crate::repository::{ListingStore, StoreError};
use crate::scrapers::{FetchError, FetchRequest, IdentityProvider, PageFetcher};

/// Why a candidate produced no listing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("{0}")]
    Failed(FetchError),
    #[error("{last} (gave up after {attempts} attempts)")]
    Exhausted { attempts: u32, last: FetchError },
}

/// Result of processing one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Fetched over the network and upserted.
    Stored(ListingRecord),
    /// Served from the store: fresh, or stale with a failed refresh.
    Cached(ListingRecord),
    Skipped(SkipReason),
}

/// Settings for detail fetches.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub locale: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    /// `None` serves stored listings forever.
    pub refresh_ttl: Option<chrono::Duration>,
}

/// How listings found on one target are read and tagged.
pub struct ListingSource {
    /// Tag stored with every listing from this target.
    pub name: String,
    pub extractor: Extractor,
}

impl ListingSource {
    pub fn new(target: &TargetConfig, default_location: &str) -> Self {
        Self {
            name: target.source.clone(),
            extractor: Extractor::new(&target.description_selectors, default_location),
        }
    }
}

/// Turns candidate URLs into stored listings.
pub struct DetailFetcher {
    pub(crate) store: Arc<dyn ListingStore>,
    pub(crate) fetcher: Arc<dyn PageFetcher>,
    pub(crate) identities: Arc<dyn IdentityProvider>,
    pub(crate) settings: FetchSettings,
}

impl DetailFetcher {
    /// Process one candidate.
    ///
    /// Network failures are reported as [`FetchOutcome::Skipped`]; only
    /// storage failures are errors. A stale listing whose refresh fails is
    /// still returned as stored.
    pub async fn fetch(
        &self,
        url: &CandidateUrl,
        source: &ListingSource,
    ) -> Result<FetchOutcome, StoreError> {
        let existing = self.store.find_by_url(url.as_str()).await?;
        if let Some(record) = &existing {
            if !self.is_stale(record) {
                debug!("Cached: {}", url);
                return Ok(FetchOutcome::Cached(record.clone()));
            }
            debug!("Refreshing stale listing: {}", url);
        }

        let html = match self.get_with_retry(url).await {
            Ok(html) => html,
            Err(reason) => match existing {
                Some(record) => {
                    warn!("Refresh of {} failed, serving stored listing: {}", url, reason);
                    return Ok(FetchOutcome::Cached(record));
                }
                None => {
                    warn!("Skipping {}: {}", url, reason);
                    return Ok(FetchOutcome::Skipped(reason));
                }
            },
        };

        let extracted = source.extractor.extract(&html);
        if !extracted.structured {
            debug!("No JobPosting data on {}, used HTML fallback", url);
        }

        let listing = NewListing::new(
            url.to_string(),
            &extracted.title,
            &extracted.company,
            &extracted.location,
            &extracted.description,
            &source.name,
        );

        let record = upsert(self.store.as_ref(), &listing).await?;
        Ok(FetchOutcome::Stored(record))
    }

    fn is_stale(&self, record: &ListingRecord) -> bool {
        match self.settings.refresh_ttl {
            Some(ttl) => record.is_stale(Utc::now() - ttl),
            None => false,
        }
    }

    /// GET with exponential backoff on transient failures.
    async fn get_with_retry(&self, url: &CandidateUrl) -> Result<String, SkipReason> {
        let mut attempt: u32 = 0;

        loop {
            let identity = self.identities.identity();
            let request = FetchRequest {
                url: url.as_str(),
                identity: &identity,
                locale: &self.settings.locale,
                timeout: self.settings.timeout,
            };

            match self.fetcher.fetch(&request).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() && attempt < self.settings.max_retries => {
                    let delay = self
                        .settings
                        .retry_backoff
                        .saturating_mul(1u32 << attempt.min(16));
                    debug!("Retrying {} in {:?} after: {}", url, delay, e);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) if attempt == 0 => return Err(SkipReason::Failed(e)),
                Err(e) => {
                    return Err(SkipReason::Exhausted {
                        attempts: attempt + 1,
                        last: e,
                    })
                }
            }
        }
    }
}
