//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod init;
mod listings;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "jobcrawl")]
#[command(about = "Discover, extract and store job listings")]
#[command(version)]
pub struct Cli {
    /// Data directory (overrides config file)
    #[arg(long, short = 'd', global = true)]
    data: Option<PathBuf>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Crawl the job board for listings matching a role
    Search {
        /// Role or keywords to search for
        role: String,
        /// Maximum number of listings to return
        #[arg(short = 'n', long, default_value = "60")]
        max_results: usize,
        /// Location hint (defaults to crawler.default_location)
        #[arg(short, long)]
        location: Option<String>,
        /// Overall deadline in seconds (defaults to crawler.search_timeout_secs)
        #[arg(long)]
        timeout: Option<u64>,
        /// Print the crawl result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show stored listings, most recently updated first
    Listings {
        /// Maximum number of listings to show
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Print listings as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Load configuration from an explicit path or by discovery.
///
/// An explicitly named file must be valid; a discovered one falls back to
/// defaults when it is not.
async fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Ok(Config::load_from_path(&path).await?.with_env_overrides()),
        None => Ok(Config::load().await),
    }
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config).await?;
    let settings = config.settings(cli.data);

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Search {
            role,
            max_results,
            location,
            timeout,
            json,
        } => {
            search::cmd_search(
                &settings,
                &config,
                &role,
                max_results,
                location.as_deref(),
                timeout,
                json,
            )
            .await
        }
        Commands::Listings { limit, json } => listings::cmd_listings(&settings, limit, json).await,
    }
}
