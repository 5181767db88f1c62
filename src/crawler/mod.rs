//! Crawler module for page fetching and crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - The fetcher collaborator interface and its HTTP implementation
//! - HTML parsing for link and token extraction
//! - The worker pool coordinator with politeness and retries

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{Coordinator, ShutdownHandle};
pub use fetcher::{build_http_client, FetchError, FetchedPage, HttpFetcher, PageFetcher};
pub use parser::{parse_html, ParsedPage};

use crate::config::Config;
use crate::TidepoolError;
use std::time::Duration;

/// Runs a complete crawl operation with the HTTP fetcher
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open or resume the frontier and analytics databases
/// 2. Seed the frontier from configuration
/// 3. Spawn the worker pool and crawl until the frontier drains
/// 4. Flush analytics and log final counts
///
/// Ctrl-C triggers a graceful shutdown: workers stop claiming new URLs
/// and in-flight pages complete their full side-effect set.
pub async fn run_crawl(config: Config, fresh: bool) -> Result<(), TidepoolError> {
    let fetcher = HttpFetcher::new(
        &config.user_agent,
        Duration::from_secs(config.crawler.fetch_timeout_secs),
    )?;

    let mut coordinator = Coordinator::new(config, fetcher, fresh)?;

    let handle = coordinator.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received, finishing in-flight pages");
            handle.shutdown();
        }
    });

    coordinator.run().await
}
