//! Listings command: show what is stored.

use console::style;

use crate::cli::helpers::{open_store, print_listings};
use crate::config::Settings;
use crate::repository::ListingStore;

pub async fn cmd_listings(settings: &Settings, limit: usize, json: bool) -> anyhow::Result<()> {
    let store = open_store(settings).await?;
    let listings = store.list_recent(limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }

    if listings.is_empty() {
        println!("{} No listings stored yet", style("!").yellow());
        println!("  Run `jobcrawl search <ROLE>` to crawl some");
        return Ok(());
    }

    print_listings(&listings);
    println!();
    println!(
        "Showing {} of {} stored listings",
        listings.len(),
        store.count().await?
    );

    Ok(())
}
