//! jobcrawl - job listing discovery and persistence.
//!
//! Discovers listing URLs on a job board's script-rendered search results,
//! fetches each listing's detail page, extracts structured fields and keeps
//! one record per listing URL in SQLite.

pub mod cli;
pub mod config;
pub mod crawler;
mod migrations;
pub mod models;
pub mod repository;
mod schema;
pub mod scrapers;
pub mod service;

pub use crawler::Crawler;
pub use models::{CrawlResult, ListingRecord, SearchQuery};
pub use service::{JobSearchService, SearchError};
