//! Initialize command.

use console::style;

use crate::cli::helpers::open_store;
use crate::config::Settings;
use crate::repository::ListingStore;

/// Initialize the data directory and database.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    let store = open_store(settings).await?;
    let count = store.count().await?;

    println!(
        "{} Initialized jobcrawl database at {}",
        style("✓").green(),
        settings.database_url()
    );
    if count > 0 {
        println!("  {} listings already stored", count);
    }

    Ok(())
}
