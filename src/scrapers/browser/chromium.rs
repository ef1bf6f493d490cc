//! chromiumoxide-backed rendering sessions.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetTimezoneOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::{Browser, BrowserConfig, Handler, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::stealth::stealth_script;
use super::{BrowserEngineConfig, RenderBackend, RenderError, RenderSession, SessionProfile};
use crate::scrapers::accept_language;

/// Common Chrome executable paths to check.
const CHROME_PATHS: &[&str] = &[
    // Linux
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    // macOS
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    // Common install locations
    "/opt/google/chrome/google-chrome",
];

const CHROME_COMMANDS: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);
const TAB_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Launches (or connects to) Chrome for each crawl.
#[derive(Debug, Clone, Default)]
pub struct ChromiumBackend {
    config: BrowserEngineConfig,
}

impl ChromiumBackend {
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self { config }
    }

    /// Find Chrome executable.
    fn find_chrome() -> Result<PathBuf, RenderError> {
        for path in CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                debug!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in CHROME_COMMANDS {
            if let Ok(path) = which::which(cmd) {
                debug!("Found Chrome in PATH: {}", path.display());
                return Ok(path);
            }
        }

        Err(RenderError::Unavailable(
            "Chrome/Chromium not found. Install it or set BROWSER_URL to a running instance"
                .to_string(),
        ))
    }

    async fn launch(&self) -> Result<(Browser, Handler), RenderError> {
        let chrome_path = Self::find_chrome()?;
        info!("Launching browser (headless={})", self.config.headless);

        let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);

        // with_head means NOT headless
        if !self.config.headless {
            builder = builder.with_head();
        }

        if let Some(ref proxy) = self.config.proxy {
            builder = builder.arg(format!("--proxy-server={}", proxy));
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-sync")
            .arg("--no-sandbox")
            .arg("--disable-gpu");

        for arg in &self.config.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder.build().map_err(RenderError::Launch)?;

        Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))
    }

    /// Connect to a remote Chrome instance via its `/json/version` endpoint.
    async fn connect_remote(&self, url: &str) -> Result<(Browser, Handler), RenderError> {
        info!("Connecting to remote browser at {}", url);

        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let resp: serde_json::Value = reqwest::Client::new()
            .get(&version_url)
            .send()
            .await
            .map_err(|e| RenderError::Launch(format!("remote browser unreachable: {e}")))?
            .json()
            .await
            .map_err(|e| RenderError::Launch(format!("bad browser version info: {e}")))?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| RenderError::Launch("no webSocketDebuggerUrl in response".into()))?;

        debug!("Connecting to WebSocket: {}", ws_url);

        Browser::connect(ws_url)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))
    }

    async fn prepare_page(page: &Page, profile: &SessionProfile) -> Result<(), RenderError> {
        let ua = SetUserAgentOverrideParams::builder()
            .user_agent(profile.identity.clone())
            .accept_language(accept_language(&profile.locale))
            .build()
            .map_err(RenderError::Launch)?;
        page.execute(ua)
            .await
            .map_err(|e| RenderError::Launch(format!("user agent override: {e}")))?;

        if let Err(e) = page
            .execute(SetTimezoneOverrideParams::new(profile.timezone.clone()))
            .await
        {
            warn!("Could not set timezone {}: {}", profile.timezone, e);
        }

        page.execute(AddScriptToEvaluateOnNewDocumentParams::new(stealth_script(
            &profile.locale,
        )))
        .await
        .map_err(|e| RenderError::Launch(format!("stealth script: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl RenderBackend for ChromiumBackend {
    async fn open(&self, profile: &SessionProfile) -> Result<Box<dyn RenderSession>, RenderError> {
        let remote = self.config.remote_url.is_some();
        let (browser, mut handler) = match self.config.remote_url.as_deref() {
            Some(url) => self.connect_remote(url).await?,
            None => self.launch().await?,
        };

        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        // From here on the session owns the browser, so an early return
        // still tears it down through Drop.
        let mut session = ChromiumSession {
            browser: Some(browser),
            page: None,
            handler_task,
            remote,
        };

        let browser = session
            .browser
            .as_ref()
            .ok_or_else(|| RenderError::Launch("browser closed".into()))?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;
        Self::prepare_page(&page, profile).await?;
        session.page = Some(page);

        Ok(Box::new(session))
    }
}

/// A single tab plus the browser that owns it.
struct ChromiumSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler_task: JoinHandle<()>,
    /// Remote browsers are shared; only our tab is closed.
    remote: bool,
}

impl ChromiumSession {
    fn page(&self) -> Result<&Page, RenderError> {
        self.page
            .as_ref()
            .ok_or_else(|| RenderError::Navigation("session closed".into()))
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), RenderError> {
        let page = self.page()?;
        match tokio::time::timeout(timeout, page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(RenderError::Navigation(e.to_string())),
            Err(_) => Err(RenderError::Timeout(format!("navigating to {url}"))),
        }
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), RenderError> {
        let page = self.page()?;
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if let Ok(Ok(_)) = tokio::time::timeout(remaining, page.find_element(selector)).await {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(RenderError::Timeout(format!("waiting for {selector}")));
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), RenderError> {
        self.page()?
            .evaluate("window.scrollTo(0, document.body.scrollHeight)".to_string())
            .await
            .map(|_| ())
            .map_err(|e| RenderError::Script(e.to_string()))
    }

    async fn collect_hrefs(&mut self, selector: &str) -> Result<Vec<String>, RenderError> {
        let selector = serde_json::to_string(selector)
            .map_err(|e| RenderError::Script(e.to_string()))?;
        let script = format!(
            "Array.from(document.querySelectorAll({selector})).map(a => a.href).filter(Boolean)"
        );

        self.page()?
            .evaluate(script)
            .await
            .map_err(|e| RenderError::Script(e.to_string()))?
            .into_value::<Vec<String>>()
            .map_err(|e| RenderError::Script(e.to_string()))
    }

    async fn close(&mut self) {
        if let Some(page) = self.page.take() {
            let _ = page.close().await;
        }
        if let Some(mut browser) = self.browser.take() {
            if !self.remote {
                if let Err(e) = browser.close().await {
                    debug!("Browser close failed: {}", e);
                }
                let _ = browser.wait().await;
            }
        }
        self.handler_task.abort();
    }
}

/// What dropping a session still owes the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropCleanup {
    /// Close our tab, then stop the handler.
    CloseTab,
    /// Stop the handler; the dropped `Browser` takes its process with it.
    AbortHandler,
}

impl DropCleanup {
    fn plan(remote: bool, has_page: bool, in_runtime: bool) -> Self {
        // A shared remote browser outlives us, so an open tab would leak.
        if remote && has_page && in_runtime {
            Self::CloseTab
        } else {
            Self::AbortHandler
        }
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        let abort = self.handler_task.abort_handle();
        let runtime = tokio::runtime::Handle::try_current().ok();
        let plan = DropCleanup::plan(self.remote, self.page.is_some(), runtime.is_some());

        match (plan, self.page.take(), runtime) {
            (DropCleanup::CloseTab, Some(page), Some(runtime)) => {
                // The handler must keep running until the close is acknowledged.
                runtime.spawn(async move {
                    if tokio::time::timeout(TAB_CLOSE_TIMEOUT, page.close()).await.is_err() {
                        debug!("Timed out closing tab of dropped session");
                    }
                    abort.abort();
                });
            }
            _ => abort.abort(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_closes_tab_only_on_remote_browsers() {
        assert_eq!(DropCleanup::plan(true, true, true), DropCleanup::CloseTab);
        assert_eq!(DropCleanup::plan(false, true, true), DropCleanup::AbortHandler);
        assert_eq!(DropCleanup::plan(true, false, true), DropCleanup::AbortHandler);
        assert_eq!(DropCleanup::plan(true, true, false), DropCleanup::AbortHandler);
    }

    async fn open_tabs(browser_url: &str) -> usize {
        let http_url = browser_url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let tabs: Vec<serde_json::Value> = reqwest::get(format!("{}/json/list", http_url.trim_end_matches('/')))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        tabs.iter().filter(|t| t["type"] == "page").count()
    }

    /// Run with: BROWSER_URL=http://localhost:9222 cargo test test_dropped_remote_session -- --ignored
    #[tokio::test]
    #[ignore]
    async fn test_dropped_remote_session_closes_its_tab() {
        let Ok(url) = std::env::var("BROWSER_URL") else {
            return;
        };
        let backend = ChromiumBackend::new(BrowserEngineConfig {
            remote_url: Some(url.clone()),
            ..BrowserEngineConfig::default()
        });
        let profile = SessionProfile {
            identity: "TestAgent/1.0".into(),
            locale: "en-IN".into(),
            timezone: "Asia/Kolkata".into(),
        };

        let before = open_tabs(&url).await;
        let session = backend.open(&profile).await.unwrap();
        assert_eq!(open_tabs(&url).await, before + 1);

        drop(session);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(open_tabs(&url).await, before);
    }
}
