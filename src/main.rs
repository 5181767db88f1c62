//! Tidepool main entry point
//!
//! Command-line interface for the Tidepool crawl engine.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tidepool::analytics::Aggregator;
use tidepool::config::load_config_with_hash;
use tidepool::crawler::run_crawl;
use tidepool::output::{build_report, print_report, write_markdown_summary};
use tidepool::storage::SqliteStore;
use tracing_subscriber::EnvFilter;

/// Tidepool: a persistent, resumable crawl engine
///
/// Tidepool crawls a set of seed domains with a bounded worker pool,
/// persists its frontier so an interrupted crawl resumes without
/// re-fetching finished pages, and keeps streaming content analytics
/// (word frequencies, subdomain inventories, sitemap collections).
#[derive(Parser, Debug)]
#[command(name = "tidepool")]
#[command(version = "1.0.0")]
#[command(about = "A persistent, resumable crawl engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Resume an interrupted crawl (default behavior)
    #[arg(long, conflicts_with = "fresh")]
    resume: bool,

    /// Start a fresh crawl, ignoring previous state
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Show a report from the databases and exit
    #[arg(long, conflicts_with = "export_summary")]
    stats: bool,

    /// Generate the markdown summary from existing data and exit
    #[arg(long, conflicts_with = "stats")]
    export_summary: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_summary {
        handle_export_summary(&config)?;
    } else {
        handle_crawl(config, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tidepool=info,warn"),
            1 => EnvFilter::new("tidepool=debug,info"),
            2 => EnvFilter::new("tidepool=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --stats mode: prints a report from the databases
fn handle_stats(config: &tidepool::config::Config) -> anyhow::Result<()> {
    let store = SqliteStore::open(Path::new(&config.storage.frontier_path))?;
    let analytics = Aggregator::open(Path::new(&config.storage.analytics_path))?;

    let report = build_report(&store, &analytics, config.output.top_words)?;
    print_report(&report);

    Ok(())
}

/// Handles the --export-summary mode: writes the markdown summary
fn handle_export_summary(config: &tidepool::config::Config) -> anyhow::Result<()> {
    let store = SqliteStore::open(Path::new(&config.storage.frontier_path))?;
    let analytics = Aggregator::open(Path::new(&config.storage.analytics_path))?;

    let report = build_report(&store, &analytics, config.output.top_words)?;
    write_markdown_summary(&report, Path::new(&config.output.summary_path))?;

    println!("Summary exported to: {}", config.output.summary_path);
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: tidepool::config::Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring previous state)");
    } else {
        tracing::info!("Starting crawl (will resume persisted frontier if present)");
    }
    tracing::info!("Seed URLs: {}", config.seeds.len());

    let summary_path = config.output.summary_path.clone();
    let frontier_path = config.storage.frontier_path.clone();
    let analytics_path = config.storage.analytics_path.clone();
    let top_words = config.output.top_words;

    run_crawl(config, fresh).await?;

    // Write the summary from the state the crawl left behind
    let store = SqliteStore::open(Path::new(&frontier_path))?;
    let analytics = Aggregator::open(Path::new(&analytics_path))?;
    let report = build_report(&store, &analytics, top_words)?;
    write_markdown_summary(&report, Path::new(&summary_path))?;
    tracing::info!("Summary written to {}", summary_path);

    Ok(())
}
