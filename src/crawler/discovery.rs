//! Listing discovery on paginated, script-rendered search results.

use tracing::{debug, info, warn};
use url::Url;

use super::error::CrawlError;
use super::policy::{pause, Pacing};
use super::run::SeenSet;
use crate::config::{CrawlerConfig, TargetConfig};
use crate::models::{CandidateUrl, SearchQuery};
use crate::scrapers::{RenderBackend, RenderError, RenderSession, SessionProfile};

/// Number of results pages to visit for a cap.
///
/// Two pages beyond the minimum absorb duplicates and sparse pages.
pub fn planned_pages(cap: usize, page_size: usize) -> usize {
    cap.div_ceil(page_size.max(1)) + 2
}

/// Build the results page URL for a query at a result offset.
pub fn build_search_url(base: &Url, query: &SearchQuery, offset: usize) -> Url {
    let mut url = base.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("keywords", query.role());
        if !query.location().is_empty() {
            pairs.append_pair("location", query.location());
        }
        pairs.append_pair("start", &offset.to_string());
    }
    url
}

/// A candidate URL and the index of the target whose results listed it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Discovered {
    pub url: CandidateUrl,
    pub target: usize,
}

/// Drives one rendering session across every target's results pages.
pub struct Discovery<'a> {
    pub backend: &'a dyn RenderBackend,
    pub crawler: &'a CrawlerConfig,
    pub targets: &'a [TargetConfig],
    pub pacing: &'a dyn Pacing,
}

impl Discovery<'_> {
    /// Collect up to `query.cap()` unique candidate URLs.
    ///
    /// Targets are searched in order and share `seen`, so a listing linked
    /// from two boards is kept once, under the first board that listed it.
    /// Only a bad search URL or a failure to open the session is an error.
    /// Pages that fail to load contribute nothing and the next page is tried.
    pub async fn discover(
        &self,
        query: &SearchQuery,
        profile: &SessionProfile,
        seen: &mut SeenSet,
    ) -> Result<Vec<Discovered>, CrawlError> {
        let bases = self
            .targets
            .iter()
            .map(|target| {
                Url::parse(&target.search_url).map_err(|e| CrawlError::InvalidTarget {
                    url: target.search_url.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut session = self.backend.open(profile).await?;
        let mut found = Vec::with_capacity(query.cap());

        for (index, (target, base)) in self.targets.iter().zip(&bases).enumerate() {
            if found.len() >= query.cap() {
                break;
            }
            if index > 0 {
                pause(self.pacing.page_delay()).await;
            }

            let before = found.len();
            self.discover_target(session.as_mut(), index, target, base, query, seen, &mut found)
                .await;
            info!(
                "{}: {} new listing URLs for {:?}",
                target.source,
                found.len() - before,
                query.role()
            );
        }
        session.close().await;

        info!(
            "Discovered {} listing URLs for {:?} (cap {})",
            found.len(),
            query.role(),
            query.cap()
        );
        Ok(found)
    }

    #[allow(clippy::too_many_arguments)]
    async fn discover_target(
        &self,
        session: &mut dyn RenderSession,
        index: usize,
        target: &TargetConfig,
        base: &Url,
        query: &SearchQuery,
        seen: &mut SeenSet,
        found: &mut Vec<Discovered>,
    ) {
        let cap = query.cap();
        let page_size = self.crawler.page_size.max(1);
        let pages = planned_pages(cap - found.len(), page_size);

        for page in 0..pages {
            if page > 0 {
                pause(self.pacing.page_delay()).await;
            }

            let url = build_search_url(base, query, page * page_size);
            let hrefs = match self.scrape_page(session, target, &url).await {
                Ok(hrefs) => hrefs,
                Err(e) => {
                    warn!("{}: search page {}/{} failed: {}", target.source, page + 1, pages, e);
                    continue;
                }
            };

            let before = found.len();
            for href in &hrefs {
                let Some(candidate) =
                    CandidateUrl::normalize(href, Some(&url), &target.listing_path_marker)
                else {
                    continue;
                };
                if seen.insert(&candidate) {
                    found.push(Discovered {
                        url: candidate,
                        target: index,
                    });
                    if found.len() >= cap {
                        debug!("Reached cap of {} on {} page {}", cap, target.source, page + 1);
                        return;
                    }
                }
            }

            debug!(
                "{}: page {}/{}: {} links, {} new",
                target.source,
                page + 1,
                pages,
                hrefs.len(),
                found.len() - before
            );
        }
    }

    async fn scrape_page(
        &self,
        session: &mut dyn RenderSession,
        target: &TargetConfig,
        url: &Url,
    ) -> Result<Vec<String>, RenderError> {
        let timeout = self.crawler.navigation_timeout();
        session.goto(url.as_str(), timeout).await?;
        session.wait_for_selector(&target.link_selector, timeout).await?;
        session.scroll_to_bottom().await?;
        pause(self.crawler.scroll_pause()).await;
        session.collect_hrefs(&target.link_selector).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planned_pages() {
        assert_eq!(planned_pages(1, 25), 3);
        assert_eq!(planned_pages(25, 25), 3);
        assert_eq!(planned_pages(26, 25), 4);
        assert_eq!(planned_pages(200, 25), 10);
    }

    #[test]
    fn test_build_search_url_is_deterministic() {
        let base = Url::parse("https://www.linkedin.com/jobs/search").unwrap();
        let query = SearchQuery::new("backend developer", 10, "New Delhi").unwrap();

        let url = build_search_url(&base, &query, 50);
        assert_eq!(
            url.as_str(),
            "https://www.linkedin.com/jobs/search?keywords=backend+developer&location=New+Delhi&start=50"
        );
        assert_eq!(build_search_url(&base, &query, 50), url);
    }

    #[test]
    fn test_build_search_url_omits_empty_location() {
        let base = Url::parse("https://jobs.example/search").unwrap();
        let query = SearchQuery::new("sre", 10, "").unwrap();
        assert_eq!(
            build_search_url(&base, &query, 0).as_str(),
            "https://jobs.example/search?keywords=sre&start=0"
        );
    }
}
