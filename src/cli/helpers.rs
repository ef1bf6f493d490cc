//! Shared helper functions for CLI commands.

use std::sync::Arc;

use console::style;

use crate::config::Settings;
use crate::models::{truncate_chars, ListingRecord};
use crate::repository::util::validate_database_url;
use crate::repository::{run_migrations, DbPool, DieselListingRepository};

/// Open the SQLite store, creating the data directory and schema if needed.
pub async fn open_store(settings: &Settings) -> anyhow::Result<Arc<DieselListingRepository>> {
    let database_url = settings.database_url();
    validate_database_url(&database_url).map_err(anyhow::Error::msg)?;

    if settings.database_url.is_none() {
        settings.ensure_directories()?;
    }

    run_migrations(&database_url).await?;
    Ok(Arc::new(DieselListingRepository::new(DbPool::new(&database_url))))
}

/// Print listings as a compact human-readable list.
pub fn print_listings(listings: &[ListingRecord]) {
    for listing in listings {
        println!(
            "{} {}",
            style(format!("[{}]", listing.id)).dim(),
            style(&listing.title).bold()
        );
        println!("    {} | {}", listing.company, listing.location);
        println!("    {}", style(&listing.url).cyan());
        if !listing.description.is_empty() {
            let first_line = listing.description.lines().next().unwrap_or_default();
            println!("    {}", style(truncate_chars(first_line, 100)).dim());
        }
    }
}
