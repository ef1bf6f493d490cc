//! Configuration management using the prefer crate for discovery.
//!
//! Layering, lowest first: built-in defaults, the config file
//! (`jobcrawl.toml`/`.yaml`/`.json` found by prefer, or an explicit path),
//! environment overrides, then CLI flags applied by the caller.

mod crawler;
mod target;

pub use crate::scrapers::BrowserEngineConfig;
pub use crawler::CrawlerConfig;
pub use target::TargetConfig;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Default database filename inside the data directory.
pub const DEFAULT_DATABASE_FILENAME: &str = "jobcrawl.db";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {format} config: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Database filename or `sqlite:` URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    /// Single-board shorthand, used when `targets` is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetConfig>,
    /// Boards searched in order, sharing one dedup set and one cap.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<TargetConfig>,
    #[serde(default)]
    pub browser: BrowserEngineConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer for file discovery.
    ///
    /// A missing file means defaults; an invalid one is logged and
    /// replaced by defaults.
    pub async fn load() -> Self {
        let config = match prefer::load("jobcrawl").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        warn!("Ignoring config file {}: {}", path.display(), e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            Err(e) => {
                debug!("No config file found: {}", e);
                Self::default()
            }
        };

        config.with_env_overrides()
    }

    /// Load configuration from a specific file path.
    /// Format is chosen by extension: TOML, YAML, otherwise JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut config = Self::parse(&contents, ext)?;
        config.validate()?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse config text in the format named by a file extension.
    pub fn parse(contents: &str, ext: &str) -> Result<Self, ConfigError> {
        match ext {
            "toml" => toml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "TOML",
                message: e.to_string(),
            }),
            "yaml" | "yml" => serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "YAML",
                message: e.to_string(),
            }),
            _ => serde_json::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "JSON",
                message: e.to_string(),
            }),
        }
    }

    /// Apply `BROWSER_URL` and `JOBCRAWL_IDENTITY_FILE`.
    pub fn with_env_overrides(mut self) -> Self {
        self.browser = self.browser.with_env_overrides();
        if let Ok(path) = std::env::var("JOBCRAWL_IDENTITY_FILE") {
            if !path.trim().is_empty() {
                self.crawler.identity_file = Some(PathBuf::from(path.trim()));
            }
        }
        self
    }

    /// Reject settings the crawler cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let crawler = &self.crawler;
        if crawler.page_size == 0 {
            return Err(ConfigError::Invalid("crawler.page_size must be at least 1".into()));
        }
        if crawler.min_cap == 0 || crawler.min_cap > crawler.max_cap {
            return Err(ConfigError::Invalid(format!(
                "crawler.min_cap ({}) must be between 1 and crawler.max_cap ({})",
                crawler.min_cap, crawler.max_cap
            )));
        }
        if crawler.fetch_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "crawler.fetch_concurrency must be at least 1".into(),
            ));
        }
        for (index, target) in self.targets().iter().enumerate() {
            Url::parse(&target.search_url).map_err(|e| {
                ConfigError::Invalid(format!(
                    "targets[{}].search_url {:?}: {}",
                    index, target.search_url, e
                ))
            })?;
            if target.link_selector.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "targets[{}].link_selector must not be empty",
                    index
                )));
            }
        }
        Ok(())
    }

    /// Boards to crawl, in order: `[[targets]]`, else `[target]`, else the default.
    pub fn targets(&self) -> Vec<TargetConfig> {
        if !self.targets.is_empty() {
            return self.targets.clone();
        }
        vec![self.target.clone().unwrap_or_default()]
    }

    /// Resolve storage locations, with an optional `--data` override.
    pub fn settings(&self, data_override: Option<PathBuf>) -> Settings {
        let mut settings = Settings::default();

        if let Some(dir) = data_override {
            settings.data_dir = dir;
        } else if let Some(ref dir) = self.data_dir {
            settings.data_dir = self.resolve_path(dir);
        }

        if let Some(ref db) = self.database {
            if db.starts_with("sqlite:") {
                settings.database_url = Some(db.clone());
            } else {
                settings.database_filename = db.clone();
            }
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                settings.database_url = Some(url);
            }
        }

        settings
    }

    /// Resolve a path relative to the config file's directory.
    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            return path;
        }
        match self.source_path.as_ref().and_then(|p| p.parent()) {
            Some(base) => base.join(path),
            None => path,
        }
    }
}

/// Resolved storage locations.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub database_filename: String,
    /// Explicit database URL, overriding `data_dir`/`database_filename`.
    pub database_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        // Falls back gracefully: data dir -> home dir -> current dir
        let data_dir = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jobcrawl");

        Self {
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            database_url: None,
        }
    }
}

impl Settings {
    /// Get the database URL, constructing from path if not explicitly set.
    pub fn database_url(&self) -> String {
        match self.database_url {
            Some(ref url) => url.clone(),
            None => {
                let path = self.data_dir.join(&self.database_filename);
                format!("sqlite:{}", path.display())
            }
        }
    }

    /// Create the data directory if needed.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}
