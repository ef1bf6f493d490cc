//! Network access: plain HTTP for detail pages, a rendering browser for
//! search results.

pub mod browser;
mod http_client;

pub use browser::{
    BrowserEngineConfig, ChromiumBackend, RenderBackend, RenderError, RenderSession,
    SessionProfile,
};
pub use http_client::{
    accept_language, parse_identity_lines, FixedIdentity, HttpClient, IdentityPool,
    IdentityProvider, BUILTIN_IDENTITIES,
};

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a non-rendering page fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("unreadable response body: {0}")]
    Body(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    /// Whether retrying the same request might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Connect(_) => true,
            Self::Status(code) => *code == 429 || (500..600).contains(code),
            Self::Body(_) | Self::Request(_) | Self::Client(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if let Some(status) = e.status() {
            Self::Status(status.as_u16())
        } else if e.is_body() || e.is_decode() {
            Self::Body(e.to_string())
        } else {
            Self::Request(e.to_string())
        }
    }
}

/// A single GET issued on behalf of the crawler.
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    pub url: &'a str,
    /// User agent presented to the server.
    pub identity: &'a str,
    /// Locale sent as Accept-Language, e.g. `en-IN`.
    pub locale: &'a str,
    pub timeout: Duration,
}

/// Fetches a page's HTML without rendering it.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Return the body of a 2xx response.
    async fn fetch(&self, request: &FetchRequest<'_>) -> Result<String, FetchError>;
}
