//! Listing extraction from detail page HTML.
//!
//! Embedded JSON-LD `JobPosting` data is preferred. When it is missing or
//! carries no description, configured container selectors supply the
//! description and the first `<h1>` supplies a missing title.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, warn};

use super::text::{element_text, html_to_text, normalize_text};
use crate::models::{UNKNOWN_COMPANY, UNKNOWN_TITLE};

static JSON_LD: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#)
        .expect("JSON-LD selector should compile")
});

static HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("h1 selector should compile"));

/// Fields recovered from one detail page. Never partially empty: unknown
/// values carry sentinels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedListing {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    /// Whether a JobPosting block was found.
    pub structured: bool,
}

/// Extracts listings using a fixed set of fallback selectors.
#[derive(Debug, Clone)]
pub struct Extractor {
    description_selectors: Vec<Selector>,
    default_location: String,
}

impl Extractor {
    /// Build an extractor. Unparseable selectors are logged and skipped.
    pub fn new(description_selectors: &[String], default_location: &str) -> Self {
        let description_selectors = description_selectors
            .iter()
            .filter_map(|s| match Selector::parse(s) {
                Ok(sel) => Some(sel),
                Err(e) => {
                    warn!("Ignoring invalid description selector {:?}: {}", s, e);
                    None
                }
            })
            .collect();

        Self {
            description_selectors,
            default_location: default_location.to_string(),
        }
    }

    pub fn extract(&self, html: &str) -> ExtractedListing {
        let document = Html::parse_document(html);

        let posting = document
            .select(&JSON_LD)
            .filter_map(|script| {
                let raw = script.text().collect::<String>();
                match serde_json::from_str::<Value>(raw.trim()) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        debug!("Skipping unparseable JSON-LD block: {}", e);
                        None
                    }
                }
            })
            .find_map(|value| find_job_posting(&value).cloned());

        let mut listing = match &posting {
            Some(posting) => self.from_posting(posting),
            None => ExtractedListing {
                title: UNKNOWN_TITLE.to_string(),
                company: UNKNOWN_COMPANY.to_string(),
                location: self.default_location.clone(),
                description: String::new(),
                structured: false,
            },
        };

        if listing.description.is_empty() {
            if let Some(text) = self
                .description_selectors
                .iter()
                .find_map(|sel| document.select(sel).next())
                .map(element_text)
            {
                listing.description = text;
            }
        }

        if listing.title == UNKNOWN_TITLE {
            if let Some(h1) = document
                .select(&HEADING)
                .map(element_text)
                .find(|t| !t.is_empty())
            {
                listing.title = h1;
            }
        }

        listing
    }

    fn from_posting(&self, posting: &Value) -> ExtractedListing {
        let title = posting
            .get("title")
            .and_then(Value::as_str)
            .map(normalize_text)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        let company = posting
            .get("hiringOrganization")
            .and_then(|org| match org {
                Value::String(name) => Some(name.as_str()),
                other => other.get("name").and_then(Value::as_str),
            })
            .map(normalize_text)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN_COMPANY.to_string());

        let location = posting
            .get("jobLocation")
            .and_then(job_locality)
            .map(normalize_text)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.default_location.clone());

        let description = posting
            .get("description")
            .and_then(Value::as_str)
            .map(html_to_text)
            .unwrap_or_default();

        ExtractedListing {
            title,
            company,
            location,
            description,
            structured: true,
        }
    }
}

/// Find the first JobPosting at the top level, in an array, or in `@graph`.
fn find_job_posting(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.iter().find_map(find_job_posting),
        Value::Object(map) => {
            if map.get("@type").is_some_and(is_job_posting_type) {
                return Some(value);
            }
            map.get("@graph").and_then(find_job_posting)
        }
        _ => None,
    }
}

fn is_job_posting_type(ty: &Value) -> bool {
    match ty {
        Value::String(s) => s == "JobPosting",
        Value::Array(types) => types.iter().any(is_job_posting_type),
        _ => false,
    }
}

/// `addressLocality` from a `jobLocation` object or the first of an array.
fn job_locality(location: &Value) -> Option<&str> {
    match location {
        Value::Array(items) => items.iter().find_map(job_locality),
        Value::Object(_) => {
            let address = location.get("address")?;
            match address {
                Value::String(s) => Some(s.as_str()),
                other => other.get("addressLocality").and_then(Value::as_str),
            }
        }
        _ => None,
    }
}
