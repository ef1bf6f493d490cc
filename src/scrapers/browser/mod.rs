//! Headless rendering for dynamically built search result pages.
//!
//! The crawler sees only [`RenderBackend`] and [`RenderSession`]. With the
//! `browser` feature these are backed by chromiumoxide (CDP); without it a
//! stub backend reports the browser as unavailable.

#[cfg(feature = "browser")]
mod chromium;
mod config;
#[cfg(feature = "browser")]
mod stealth;

#[cfg(feature = "browser")]
pub use chromium::ChromiumBackend;
pub use config::BrowserEngineConfig;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a rendering backend or session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("browser unavailable: {0}")]
    Unavailable(String),
    #[error("failed to start browser session: {0}")]
    Launch(String),
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("timed out {0}")]
    Timeout(String),
    #[error("page script failed: {0}")]
    Script(String),
}

/// How a rendering session presents itself to the target site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProfile {
    /// User agent string.
    pub identity: String,
    /// BCP 47 locale, e.g. `en-IN`.
    pub locale: String,
    /// IANA timezone, e.g. `Asia/Kolkata`.
    pub timezone: String,
}

/// Opens rendering sessions.
#[async_trait]
pub trait RenderBackend: Send + Sync {
    async fn open(&self, profile: &SessionProfile) -> Result<Box<dyn RenderSession>, RenderError>;
}

/// One browser tab driven through a crawl.
///
/// Dropping a session must release its browser resources even when
/// [`close`](RenderSession::close) was never awaited.
#[async_trait]
pub trait RenderSession: Send {
    /// Navigate and wait for the load to finish.
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), RenderError>;

    /// Wait until at least one element matches `selector`.
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration)
        -> Result<(), RenderError>;

    async fn scroll_to_bottom(&mut self) -> Result<(), RenderError>;

    /// Absolute `href` of every element matching `selector`, in document order.
    async fn collect_hrefs(&mut self, selector: &str) -> Result<Vec<String>, RenderError>;

    /// Close the session. Calling it more than once is a no-op.
    async fn close(&mut self);
}

/// Stand-in backend for builds without the `browser` feature.
#[cfg(not(feature = "browser"))]
#[derive(Debug, Clone, Default)]
pub struct ChromiumBackend {
    _config: BrowserEngineConfig,
}

#[cfg(not(feature = "browser"))]
impl ChromiumBackend {
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self { _config: config }
    }
}

#[cfg(not(feature = "browser"))]
#[async_trait]
impl RenderBackend for ChromiumBackend {
    async fn open(&self, _profile: &SessionProfile) -> Result<Box<dyn RenderSession>, RenderError> {
        Err(RenderError::Unavailable(
            "jobcrawl was built without the `browser` feature".to_string(),
        ))
    }
}
