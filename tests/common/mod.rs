//! Test doubles for the rendering browser and the detail page fetcher.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use jobcrawl::config::{CrawlerConfig, TargetConfig};
use jobcrawl::crawler::{Crawler, NoPacing};
use jobcrawl::repository::ListingStore;
use jobcrawl::scrapers::{
    FetchError, FetchRequest, FixedIdentity, PageFetcher, RenderBackend, RenderError,
    RenderSession, SessionProfile,
};
use url::Url;

pub const SEARCH_URL: &str = "https://jobs.test/jobs/search";

pub fn listing_url(n: u32) -> String {
    format!("https://jobs.test/jobs/view/{n}")
}

/// Crawler settings with no pauses and small pages.
pub fn test_configs() -> (CrawlerConfig, TargetConfig) {
    let crawler = CrawlerConfig {
        page_size: 5,
        scroll_pause_ms: 0,
        navigation_timeout_secs: 1,
        retry_backoff_ms: 1,
        ..CrawlerConfig::default()
    };
    let target = TargetConfig {
        search_url: SEARCH_URL.to_string(),
        source: "testboard".to_string(),
        ..TargetConfig::default()
    };
    (crawler, target)
}

pub fn build_crawler(
    crawler: CrawlerConfig,
    target: TargetConfig,
    store: Arc<dyn ListingStore>,
    fetcher: Arc<FakeFetcher>,
    renderer: Arc<FakeBackend>,
) -> Crawler {
    build_crawler_for(crawler, vec![target], store, fetcher, renderer)
}

pub fn build_crawler_for(
    crawler: CrawlerConfig,
    targets: Vec<TargetConfig>,
    store: Arc<dyn ListingStore>,
    fetcher: Arc<FakeFetcher>,
    renderer: Arc<FakeBackend>,
) -> Crawler {
    Crawler::new(crawler, targets, store, fetcher, renderer)
        .with_pacing(Arc::new(NoPacing))
        .with_identities(Arc::new(FixedIdentity("TestAgent/1.0".into())))
}

/// Behavior of one search results page, keyed by its `start` offset.
#[derive(Debug, Clone)]
pub enum PageScript {
    Links(Vec<String>),
    /// Navigation fails.
    Fail,
    /// Navigation never completes.
    Hang,
}

/// Observable lifecycle of sessions opened by [`FakeBackend`].
#[derive(Debug, Default)]
pub struct SessionLog {
    pub opened: AtomicUsize,
    pub closed: AtomicBool,
    pub dropped: AtomicBool,
    pub visited: Mutex<Vec<String>>,
}

#[derive(Default)]
pub struct FakeBackend {
    pages: HashMap<usize, PageScript>,
    /// Host-specific pages, consulted before `pages`.
    host_pages: HashMap<(String, usize), PageScript>,
    fail_open: bool,
    pub log: Arc<SessionLog>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the page at result offset `start`.
    pub fn page(mut self, start: usize, script: PageScript) -> Self {
        self.pages.insert(start, script);
        self
    }

    pub fn links(self, start: usize, links: &[&str]) -> Self {
        self.page(
            start,
            PageScript::Links(links.iter().map(|s| s.to_string()).collect()),
        )
    }

    /// Script the page at offset `start` on one host only.
    pub fn links_on(mut self, host: &str, start: usize, links: &[&str]) -> Self {
        self.host_pages.insert(
            (host.to_string(), start),
            PageScript::Links(links.iter().map(|s| s.to_string()).collect()),
        );
        self
    }

    pub fn failing_open() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl RenderBackend for FakeBackend {
    async fn open(&self, _profile: &SessionProfile) -> Result<Box<dyn RenderSession>, RenderError> {
        if self.fail_open {
            return Err(RenderError::Launch("chrome exited with status 1".into()));
        }
        self.log.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            pages: self.pages.clone(),
            host_pages: self.host_pages.clone(),
            current: None,
            log: self.log.clone(),
        }))
    }
}

struct FakeSession {
    pages: HashMap<usize, PageScript>,
    host_pages: HashMap<(String, usize), PageScript>,
    current: Option<Vec<String>>,
    log: Arc<SessionLog>,
}

#[async_trait]
impl RenderSession for FakeSession {
    async fn goto(&mut self, url: &str, _timeout: Duration) -> Result<(), RenderError> {
        self.log.visited.lock().unwrap().push(url.to_string());
        let parsed = Url::parse(url).ok();
        let host = parsed
            .as_ref()
            .and_then(|u| u.host_str())
            .unwrap_or_default()
            .to_string();
        let start = parsed
            .as_ref()
            .and_then(|u| {
                u.query_pairs()
                    .find(|(k, _)| k == "start")
                    .and_then(|(_, v)| v.parse::<usize>().ok())
            })
            .unwrap_or(0);

        let script = self
            .host_pages
            .get(&(host, start))
            .or_else(|| self.pages.get(&start))
            .cloned();
        match script {
            Some(PageScript::Links(links)) => {
                self.current = Some(links);
                Ok(())
            }
            Some(PageScript::Fail) => Err(RenderError::Navigation("net::ERR_CONNECTION_RESET".into())),
            Some(PageScript::Hang) => {
                std::future::pending::<()>().await;
                Ok(())
            }
            None => {
                self.current = Some(Vec::new());
                Ok(())
            }
        }
    }

    async fn wait_for_selector(&mut self, selector: &str, _timeout: Duration) -> Result<(), RenderError> {
        match &self.current {
            Some(links) if !links.is_empty() => Ok(()),
            _ => Err(RenderError::Timeout(format!("waiting for {selector}"))),
        }
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    async fn collect_hrefs(&mut self, _selector: &str) -> Result<Vec<String>, RenderError> {
        Ok(self.current.clone().unwrap_or_default())
    }

    async fn close(&mut self) {
        self.log.closed.store(true, Ordering::SeqCst);
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.log.dropped.store(true, Ordering::SeqCst);
    }
}

/// Serves canned detail pages.
#[derive(Default)]
pub struct FakeFetcher {
    pages: Mutex<HashMap<String, String>>,
    failures: Mutex<HashMap<String, VecDeque<FetchError>>>,
    delays: HashMap<String, Duration>,
    pub calls: Mutex<Vec<String>>,
    pub identities: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, html: String) -> Self {
        self.pages.lock().unwrap().insert(url.to_string(), html);
        self
    }

    /// Fail the next requests for `url` with these errors, in order.
    pub fn fail_first(self, url: &str, errors: Vec<FetchError>) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(url.to_string(), errors.into());
        self
    }

    pub fn delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn set_page(&self, url: &str, html: String) {
        self.pages.lock().unwrap().insert(url.to_string(), html);
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, request: &FetchRequest<'_>) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(request.url.to_string());
        self.identities
            .lock()
            .unwrap()
            .push(request.identity.to_string());

        if let Some(delay) = self.delays.get(request.url) {
            tokio::time::sleep(*delay).await;
        }

        let failure = self
            .failures
            .lock()
            .unwrap()
            .get_mut(request.url)
            .and_then(|queue| queue.pop_front());
        if let Some(error) = failure {
            return Err(error);
        }

        self.pages
            .lock()
            .unwrap()
            .get(request.url)
            .cloned()
            .ok_or(FetchError::Status(404))
    }
}

/// Detail page carrying a JobPosting JSON-LD block.
pub fn job_posting_page(title: &str, company: &str, city: &str, description: &str) -> String {
    let posting = serde_json::json!({
        "@context": "https://schema.org",
        "@type": "JobPosting",
        "title": title,
        "hiringOrganization": { "@type": "Organization", "name": company },
        "jobLocation": { "@type": "Place", "address": { "addressLocality": city } },
        "description": description,
    });
    format!(
        r#"<html><head><script type="application/ld+json">{posting}</script></head><body><h1>{title}</h1></body></html>"#
    )
}

/// Detail page with only HTML content.
pub fn plain_page(title: &str, description: &str) -> String {
    format!(
        r#"<html><body><h1 class="top-card-layout__title">{title}</h1>
        <section class="show-more-less-html__markup"><p>{description}</p></section></body></html>"#
    )
}
