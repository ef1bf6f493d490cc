//! HTTP client for listing detail pages.

mod user_agent;

pub use user_agent::{
    parse_identity_lines, FixedIdentity, IdentityPool, IdentityProvider, BUILTIN_IDENTITIES,
};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use tracing::debug;

use super::{FetchError, FetchRequest, PageFetcher};

/// reqwest-backed page fetcher.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client.
    ///
    /// `timeout` is the default bound for requests that do not set one.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, request: &FetchRequest<'_>) -> Result<String, FetchError> {
        debug!("GET {}", request.url);

        let response = self
            .client
            .get(request.url)
            .timeout(request.timeout)
            .header(USER_AGENT, request.identity)
            .header(ACCEPT_LANGUAGE, accept_language(request.locale))
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(FetchError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Body(e.to_string())
            }
        })
    }
}

/// Build an Accept-Language header value for a locale such as `en-IN`.
pub fn accept_language(locale: &str) -> String {
    let locale = locale.trim();
    match locale.split_once('-') {
        Some((lang, _)) if !lang.is_empty() => format!("{locale},{lang};q=0.9"),
        _ if locale.is_empty() => "en;q=0.9".to_string(),
        _ => locale.to_string(),
    }
}
