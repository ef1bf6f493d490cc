//! Per-invocation crawl state.

use std::collections::HashSet;
use std::fmt;

use tracing::info;

use crate::models::{CandidateUrl, CrawlStats};

/// Lifecycle of one crawl invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Idle,
    Discovering,
    Fetching,
    Done,
    Failed,
}

impl CrawlPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Discovering => "discovering",
            Self::Fetching => "fetching",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidate URLs already emitted during this invocation.
#[derive(Debug, Default)]
pub struct SeenSet {
    seen: HashSet<CandidateUrl>,
}

impl SeenSet {
    /// Record a candidate. Returns `false` if it was already seen.
    pub fn insert(&mut self, url: &CandidateUrl) -> bool {
        if self.seen.contains(url) {
            return false;
        }
        self.seen.insert(url.clone())
    }

    pub fn contains(&self, url: &CandidateUrl) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// State owned by a single crawl and dropped when it returns.
#[derive(Debug)]
pub struct CrawlRun {
    phase: CrawlPhase,
    pub seen: SeenSet,
    pub stats: CrawlStats,
}

impl CrawlRun {
    pub fn new() -> Self {
        Self {
            phase: CrawlPhase::Idle,
            seen: SeenSet::default(),
            stats: CrawlStats::default(),
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Move to the next phase. Terminal phases are sticky.
    pub fn advance(&mut self, next: CrawlPhase) {
        if self.phase.is_terminal() {
            return;
        }
        info!("Crawl phase: {} -> {}", self.phase, next);
        self.phase = next;
    }
}

impl Default for CrawlRun {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seen_set_rejects_duplicates() {
        let mut seen = SeenSet::default();
        let url = CandidateUrl::normalize("https://x.test/jobs/view/1", None, "").unwrap();
        assert!(seen.insert(&url));
        assert!(!seen.insert(&url));
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn test_terminal_phase_is_sticky() {
        let mut run = CrawlRun::new();
        run.advance(CrawlPhase::Discovering);
        run.advance(CrawlPhase::Failed);
        run.advance(CrawlPhase::Fetching);
        assert_eq!(run.phase(), CrawlPhase::Failed);
    }
}
