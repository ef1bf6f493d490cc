//! The job board being crawled.

use serde::{Deserialize, Serialize};

/// Where to search and how to recognize listings on the target site.
///
/// Defaults point at the public LinkedIn jobs guest search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Search results page; query parameters are appended per page.
    pub search_url: String,
    /// CSS selector matching listing links on a results page.
    pub link_selector: String,
    /// Path fragment every listing detail URL contains.
    pub listing_path_marker: String,
    /// Description containers tried in order when structured data is absent.
    pub description_selectors: Vec<String>,
    /// Tag stored with every listing from this site.
    pub source: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            search_url: "https://www.linkedin.com/jobs/search".to_string(),
            link_selector: r#"a[href*="/jobs/view/"]"#.to_string(),
            listing_path_marker: "/jobs/view/".to_string(),
            description_selectors: vec![
                ".show-more-less-html__markup".to_string(),
                ".description__text".to_string(),
            ],
            source: "linkedin".to_string(),
        }
    }
}
