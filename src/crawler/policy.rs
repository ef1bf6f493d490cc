//! Pacing between page loads and detail fetches.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Inclusive millisecond range, written as `[min, max]` in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u64; 2]", into = "[u64; 2]")]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Uniformly random delay within the range. A reversed range is
    /// treated as if its bounds were swapped.
    pub fn sample(&self) -> Duration {
        let (lo, hi) = if self.min_ms <= self.max_ms {
            (self.min_ms, self.max_ms)
        } else {
            (self.max_ms, self.min_ms)
        };
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }
}

impl From<[u64; 2]> for DelayRange {
    fn from([min_ms, max_ms]: [u64; 2]) -> Self {
        Self { min_ms, max_ms }
    }
}

impl From<DelayRange> for [u64; 2] {
    fn from(range: DelayRange) -> Self {
        [range.min_ms, range.max_ms]
    }
}

/// Decides how long to pause between requests.
pub trait Pacing: Send + Sync {
    /// Pause before loading the next search results page.
    fn page_delay(&self) -> Duration;
    /// Pause before fetching a listing detail page.
    fn fetch_delay(&self) -> Duration;
}

/// Randomized delays drawn from configured ranges.
#[derive(Debug, Clone)]
pub struct RandomPacing {
    page: DelayRange,
    fetch: DelayRange,
}

impl RandomPacing {
    pub fn new(page: DelayRange, fetch: DelayRange) -> Self {
        Self { page, fetch }
    }
}

impl Pacing for RandomPacing {
    fn page_delay(&self) -> Duration {
        self.page.sample()
    }

    fn fetch_delay(&self) -> Duration {
        self.fetch.sample()
    }
}

/// No delays at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

impl Pacing for NoPacing {
    fn page_delay(&self) -> Duration {
        Duration::ZERO
    }

    fn fetch_delay(&self) -> Duration {
        Duration::ZERO
    }
}

/// Sleep for `delay`, skipping the timer entirely for zero.
pub(crate) async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_stays_in_range() {
        let range = DelayRange::new(100, 200);
        for _ in 0..50 {
            let d = range.sample().as_millis() as u64;
            assert!((100..=200).contains(&d));
        }
        assert_eq!(DelayRange::new(7, 7).sample(), Duration::from_millis(7));
        let reversed = DelayRange::new(30, 10).sample().as_millis() as u64;
        assert!((10..=30).contains(&reversed));
    }

    #[test]
    fn test_range_deserializes_from_pair() {
        let range: DelayRange = serde_json::from_str("[500, 1500]").unwrap();
        assert_eq!(range, DelayRange::new(500, 1500));
    }
}
