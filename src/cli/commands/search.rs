//! Search command: run one crawl under a deadline.

use std::sync::Arc;
use std::time::Duration;

use console::style;

use crate::cli::helpers::{open_store, print_listings};
use crate::config::{Config, Settings};
use crate::crawler::Crawler;
use crate::models::CrawlStatus;
use crate::scrapers::{ChromiumBackend, HttpClient};
use crate::service::{JobSearchService, SearchError};

#[allow(clippy::too_many_arguments)]
pub async fn cmd_search(
    settings: &Settings,
    config: &Config,
    role: &str,
    max_results: usize,
    location: Option<&str>,
    timeout: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let store = open_store(settings).await?;
    let fetcher = Arc::new(HttpClient::new(config.crawler.fetch_timeout())?);
    let renderer = Arc::new(ChromiumBackend::new(config.browser.clone()));

    let crawler = Crawler::new(
        config.crawler.clone(),
        config.targets(),
        store,
        fetcher,
        renderer,
    );

    let mut service = JobSearchService::new(crawler);
    if let Some(secs) = timeout {
        service = service.with_deadline(Duration::from_secs(secs));
    }

    let result = match service.search(role, max_results, location).await {
        Ok(result) => result,
        Err(SearchError::TimedOut(deadline)) => {
            anyhow::bail!(
                "search timed out after {}s; try again with a narrower query or fewer results",
                deadline.as_secs()
            );
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_listings(&result.listings);
        println!();
        println!(
            "{} {} listings for {:?} in {:.1}s ({} fetched, {} cached, {} skipped)",
            if result.status.is_success() {
                style("✓").green()
            } else {
                style("✗").red()
            },
            result.count,
            result.query.role(),
            result.elapsed_ms as f64 / 1000.0,
            result.stats.fetched,
            result.stats.cached,
            result.stats.skipped,
        );
    }

    match result.status {
        CrawlStatus::Success => Ok(()),
        CrawlStatus::Error(message) => anyhow::bail!("crawl failed: {}", message),
    }
}
