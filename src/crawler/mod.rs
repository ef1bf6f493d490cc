//! Crawl orchestration: discovery, then detail fetches, then the result.
//!
//! A [`Crawler`] is built once and shared; every [`Crawler::crawl`] call
//! owns a fresh [`CrawlRun`] so concurrent crawls share only the store.

mod discovery;
mod error;
mod extract;
mod fetch;
mod policy;
mod run;
pub mod text;
mod upsert;

pub use discovery::{build_search_url, planned_pages, Discovered, Discovery};
pub use error::CrawlError;
pub use extract::{ExtractedListing, Extractor};
pub use fetch::{DetailFetcher, FetchOutcome, FetchSettings, ListingSource, SkipReason};
pub use policy::{DelayRange, NoPacing, Pacing, RandomPacing};
pub use run::{CrawlPhase, CrawlRun, SeenSet};
pub use upsert::upsert;

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{info, warn};

use crate::config::{CrawlerConfig, TargetConfig};
use crate::models::{CrawlResult, ListingRecord, QueryError, SearchQuery};
use crate::repository::ListingStore;
use crate::scrapers::{IdentityPool, IdentityProvider, PageFetcher, RenderBackend, SessionProfile};
use policy::pause;

/// Job listing crawler.
pub struct Crawler {
    renderer: Arc<dyn RenderBackend>,
    pacing: Arc<dyn Pacing>,
    details: DetailFetcher,
    crawler: CrawlerConfig,
    /// Searched in order; never empty.
    targets: Vec<TargetConfig>,
    /// One per target, same order.
    sources: Vec<ListingSource>,
}

impl Crawler {
    /// Create a crawler with randomized pacing and the configured identity pool.
    ///
    /// An empty `targets` list falls back to the default target.
    pub fn new(
        crawler: CrawlerConfig,
        targets: Vec<TargetConfig>,
        store: Arc<dyn ListingStore>,
        fetcher: Arc<dyn PageFetcher>,
        renderer: Arc<dyn RenderBackend>,
    ) -> Self {
        let identities: Arc<dyn IdentityProvider> = Arc::new(IdentityPool::load(
            &crawler.identities,
            crawler.identity_file.as_deref(),
        ));
        let pacing: Arc<dyn Pacing> = Arc::new(RandomPacing::new(
            crawler.page_delay_ms,
            crawler.fetch_delay_ms,
        ));

        let details = DetailFetcher {
            store,
            fetcher,
            identities,
            settings: FetchSettings {
                locale: crawler.locale.clone(),
                timeout: crawler.fetch_timeout(),
                max_retries: crawler.max_retries,
                retry_backoff: crawler.retry_backoff(),
                refresh_ttl: crawler.refresh_ttl(),
            },
        };

        let targets = if targets.is_empty() {
            vec![TargetConfig::default()]
        } else {
            targets
        };
        let sources = targets
            .iter()
            .map(|target| ListingSource::new(target, &crawler.default_location))
            .collect();

        Self {
            renderer,
            pacing,
            details,
            crawler,
            targets,
            sources,
        }
    }

    /// Replace the pacing policy.
    pub fn with_pacing(mut self, pacing: Arc<dyn Pacing>) -> Self {
        self.pacing = pacing;
        self
    }

    /// Replace the identity source used for sessions and fetches.
    pub fn with_identities(mut self, identities: Arc<dyn IdentityProvider>) -> Self {
        self.details.identities = identities;
        self
    }

    pub fn store(&self) -> &Arc<dyn ListingStore> {
        &self.details.store
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.crawler
    }

    pub fn targets(&self) -> &[TargetConfig] {
        &self.targets
    }

    /// Validate a query against the configured bounds and default location.
    pub fn query(
        &self,
        role: &str,
        max_results: usize,
        location: Option<&str>,
    ) -> Result<SearchQuery, QueryError> {
        let location = location
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(self.crawler.default_location.as_str());
        SearchQuery::with_bounds(role, max_results, location, self.crawler.cap_bounds())
    }

    /// Run one crawl. Never fails: fatal problems become an error-status result.
    pub async fn crawl(&self, query: SearchQuery) -> CrawlResult {
        let started = Instant::now();
        let mut run = CrawlRun::new();

        let outcome = self.run_stages(&query, &mut run).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok(listings) => {
                run.advance(CrawlPhase::Done);
                info!(
                    "Crawl for {:?} finished: {} listings ({} fetched, {} cached, {} skipped) in {}ms",
                    query.role(),
                    listings.len(),
                    run.stats.fetched,
                    run.stats.cached,
                    run.stats.skipped,
                    elapsed_ms
                );
                CrawlResult::success(query, listings, run.stats, elapsed_ms)
            }
            Err(e) => {
                run.advance(CrawlPhase::Failed);
                warn!("Crawl for {:?} failed: {}", query.role(), e);
                CrawlResult::failure(query, e.to_string(), run.stats, elapsed_ms)
            }
        }
    }

    async fn run_stages(
        &self,
        query: &SearchQuery,
        run: &mut CrawlRun,
    ) -> Result<Vec<ListingRecord>, CrawlError> {
        run.advance(CrawlPhase::Discovering);

        let profile = SessionProfile {
            identity: self.details.identities.identity(),
            locale: self.crawler.locale.clone(),
            timezone: self.crawler.timezone.clone(),
        };
        let discovery = Discovery {
            backend: self.renderer.as_ref(),
            crawler: &self.crawler,
            targets: &self.targets,
            pacing: self.pacing.as_ref(),
        };
        let candidates = discovery.discover(query, &profile, &mut run.seen).await?;
        run.stats.discovered = candidates.len();

        run.advance(CrawlPhase::Fetching);
        let outcomes = self.fetch_all(&candidates).await?;

        let mut listings = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                FetchOutcome::Stored(record) => {
                    run.stats.fetched += 1;
                    listings.push(record);
                }
                FetchOutcome::Cached(record) => {
                    run.stats.cached += 1;
                    listings.push(record);
                }
                FetchOutcome::Skipped(_) => run.stats.skipped += 1,
            }
        }

        Ok(listings)
    }

    /// Fetch candidates with bounded concurrency, keeping discovery order.
    async fn fetch_all(&self, candidates: &[Discovered]) -> Result<Vec<FetchOutcome>, CrawlError> {
        let concurrency = self.crawler.fetch_concurrency.max(1);

        let outcomes = stream::iter(candidates)
            .map(|candidate| async move {
                pause(self.pacing.fetch_delay()).await;
                self.details
                    .fetch(&candidate.url, &self.sources[candidate.target])
                    .await
            })
            .buffered(concurrency)
            .try_collect::<Vec<_>>()
            .await?;

        Ok(outcomes)
    }
}
