//! Crawl coordinator - worker pool orchestration
//!
//! This module drives the crawl end to end:
//! - Opening (or resuming) the frontier store and seeding it
//! - Spawning the fixed-size worker pool
//! - Per-URL lifecycle: claim, politeness wait, bounded fetch, analytics,
//!   link discovery, durable scraped mark
//! - Bounded retries with terminal failure annotations
//! - Graceful shutdown

use crate::analytics::Aggregator;
use crate::config::Config;
use crate::crawler::fetcher::{FetchError, PageFetcher};
use crate::state::DomainState;
use crate::storage::{FrontierEntry, FrontierStore, InsertOutcome, SqliteStore};
use crate::url::{canonicalize, extract_domain};
use crate::TidepoolError;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use url::Url;

/// How long an idle worker waits before re-checking the frontier
const IDLE_WAIT: Duration = Duration::from_millis(50);

/// Pause after a storage error before the worker retries its loop
const STORAGE_BACKOFF: Duration = Duration::from_millis(500);

/// Handle for requesting a graceful shutdown
///
/// Workers stop claiming new URLs as soon as shutdown is signalled;
/// in-flight URLs complete their full side-effect set first.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Signals all workers to finish their current URL and stop
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<F: PageFetcher + 'static> {
    config: Arc<Config>,
    store: Arc<Mutex<SqliteStore>>,
    analytics: Arc<Mutex<Aggregator>>,
    fetcher: Arc<F>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
}

/// Everything one worker needs, shared by reference counting
struct WorkerContext<F: PageFetcher + 'static> {
    worker_id: u32,
    config: Arc<Config>,
    store: Arc<Mutex<SqliteStore>>,
    analytics: Arc<Mutex<Aggregator>>,
    fetcher: Arc<F>,
    politeness: Arc<Mutex<HashMap<String, DomainState>>>,
    in_flight: Arc<AtomicUsize>,
    pages_scraped: Arc<AtomicU64>,
    shutdown: watch::Receiver<bool>,
}

impl<F: PageFetcher + 'static> Coordinator<F> {
    /// Creates a new coordinator instance
    ///
    /// Opens the frontier and analytics databases from the configured
    /// paths and inserts the seed URLs at depth 0. With `fresh` the
    /// previous frontier is cleared first; otherwise the crawl resumes
    /// from persisted state and already-scraped URLs are never re-served.
    pub fn new(config: Config, fetcher: F, fresh: bool) -> Result<Self, TidepoolError> {
        let mut store = SqliteStore::open(Path::new(&config.storage.frontier_path))?;

        if fresh {
            tracing::info!("Starting fresh crawl, clearing previous frontier");
            store.clear()?;
        } else {
            let pending = store.count_pending()?;
            let total = store.count_total()?;
            if total > 0 {
                tracing::info!(
                    "Resuming from persisted frontier: {} of {} URLs still to scrape",
                    pending,
                    total
                );
            }
        }

        // Seed the frontier. On resume these are no-ops for known seeds.
        let mut seeded = 0;
        for seed in &config.seeds {
            let (url, key) = canonicalize(seed).map_err(|e| {
                TidepoolError::Config(crate::ConfigError::InvalidUrl(format!(
                    "Invalid seed URL '{}': {}",
                    seed, e
                )))
            })?;
            if store.try_insert(&url, key, 0)? == InsertOutcome::Inserted {
                seeded += 1;
            }
        }
        tracing::info!("Seeded {} new URLs at depth 0", seeded);

        let analytics = Aggregator::open(Path::new(&config.storage.analytics_path))?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(Mutex::new(store)),
            analytics: Arc::new(Mutex::new(analytics)),
            fetcher: Arc::new(fetcher),
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
        })
    }

    /// Returns a handle that can request graceful shutdown
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: Arc::clone(&self.shutdown_tx),
        }
    }

    /// Shared frontier store (read access for reporting)
    pub fn store(&self) -> Arc<Mutex<SqliteStore>> {
        Arc::clone(&self.store)
    }

    /// Shared analytics aggregator (read access for reporting)
    pub fn analytics(&self) -> Arc<Mutex<Aggregator>> {
        Arc::clone(&self.analytics)
    }

    /// Runs the crawl to completion (or until shutdown)
    ///
    /// Spawns the configured number of workers and waits for all of them
    /// to drain the frontier. Returns once every worker has stopped and
    /// the analytics database has been flushed.
    pub async fn run(&mut self) -> Result<(), TidepoolError> {
        let worker_count = self.config.crawler.workers;
        let start_time = Instant::now();

        tracing::info!("Starting crawl with {} workers", worker_count);

        let politeness = Arc::new(Mutex::new(HashMap::new()));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let pages_scraped = Arc::new(AtomicU64::new(0));

        let mut handles = Vec::new();
        for worker_id in 0..worker_count {
            let ctx = WorkerContext {
                worker_id,
                config: Arc::clone(&self.config),
                store: Arc::clone(&self.store),
                analytics: Arc::clone(&self.analytics),
                fetcher: Arc::clone(&self.fetcher),
                politeness: Arc::clone(&politeness),
                in_flight: Arc::clone(&in_flight),
                pages_scraped: Arc::clone(&pages_scraped),
                shutdown: self.shutdown_rx.clone(),
            };
            handles.push(tokio::spawn(worker_loop(ctx)));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("Worker task panicked: {}", e);
            }
        }

        // Flush analytics now that no worker can write
        {
            let analytics = self.analytics.lock().unwrap();
            analytics.flush()?;
        }

        let (scraped, failed, pending) = {
            let store = self.store.lock().unwrap();
            (
                store.count_scraped()?,
                store.count_failed()?,
                store.count_pending()?,
            )
        };
        tracing::info!(
            "Crawl finished in {:?}: {} scraped, {} failed, {} pending",
            start_time.elapsed(),
            scraped,
            failed,
            pending
        );

        Ok(())
    }
}

/// One worker's claim-fetch-record loop
///
/// Per-URL errors are isolated to that URL's state transition; storage
/// errors are logged and retried with backoff, never swallowed silently.
async fn worker_loop<F: PageFetcher + 'static>(ctx: WorkerContext<F>) {
    tracing::debug!("Worker {} started", ctx.worker_id);

    loop {
        if *ctx.shutdown.borrow() {
            tracing::info!("Worker {} acknowledging shutdown", ctx.worker_id);
            break;
        }

        // in_flight covers the window from claim to completed side
        // effects, so no worker exits while links may still arrive.
        ctx.in_flight.fetch_add(1, Ordering::SeqCst);

        let claimed = {
            let mut store = ctx.store.lock().unwrap();
            store.claim_next()
        };

        let entry = match claimed {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                ctx.in_flight.fetch_sub(1, Ordering::SeqCst);
                if ctx.in_flight.load(Ordering::SeqCst) == 0 {
                    tracing::debug!("Worker {}: frontier drained, stopping", ctx.worker_id);
                    break;
                }
                tokio::time::sleep(IDLE_WAIT).await;
                continue;
            }
            Err(e) => {
                ctx.in_flight.fetch_sub(1, Ordering::SeqCst);
                tracing::error!("Worker {}: storage error while claiming: {}", ctx.worker_id, e);
                tokio::time::sleep(STORAGE_BACKOFF).await;
                continue;
            }
        };

        if let Err(e) = process_entry(&ctx, &entry).await {
            tracing::error!(
                "Worker {}: error processing {}: {}",
                ctx.worker_id,
                entry.url,
                e
            );
            // Return the claim so the URL is not stranded; the retry
            // policy will pick it up again.
            {
                let mut store = ctx.store.lock().unwrap();
                store.release_claim(entry.key);
            }
            tokio::time::sleep(STORAGE_BACKOFF).await;
        }

        ctx.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Processes a single claimed frontier entry
///
/// On success the side effects are applied in a fixed order: discovered
/// links are inserted first, the scraped flag is made durable second, and
/// analytics are recorded last. A crash at any point therefore never
/// drops a discovered URL, never re-schedules a scraped URL, and never
/// double-counts a page's analytics.
async fn process_entry<F: PageFetcher + 'static>(
    ctx: &WorkerContext<F>,
    entry: &FrontierEntry,
) -> Result<(), TidepoolError> {
    let url = Url::parse(&entry.url)?;
    let domain = extract_domain(&url).unwrap_or_default();

    wait_for_domain_window(ctx, &domain).await;

    let timeout = Duration::from_secs(ctx.config.crawler.fetch_timeout_secs);
    let outcome = match tokio::time::timeout(timeout, ctx.fetcher.fetch(&url)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout),
    };

    match outcome {
        Ok(page) => {
            if entry.depth < ctx.config.crawler.max_depth {
                let mut store = ctx.store.lock().unwrap();
                for link in &page.links {
                    match canonicalize(link) {
                        Ok((link_url, link_key)) => {
                            store.try_insert(&link_url, link_key, entry.depth + 1)?;
                        }
                        Err(e) => {
                            tracing::debug!("Dropping invalid link {}: {}", link, e);
                        }
                    }
                }
            } else {
                tracing::debug!("Not expanding {} links, at max depth", url);
            }

            {
                let mut store = ctx.store.lock().unwrap();
                store.mark_scraped(entry.key)?;
            }

            {
                let mut analytics = ctx.analytics.lock().unwrap();
                analytics.record(&url, entry.depth, &page.tokens, &page.sitemap_links)?;
            }

            let scraped = ctx.pages_scraped.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::info!("Scraped {} (depth {})", url, entry.depth);
            if scraped % 10 == 0 {
                let pending = {
                    let store = ctx.store.lock().unwrap();
                    store.count_pending().unwrap_or(0)
                };
                tracing::info!("Progress: {} pages scraped, {} pending", scraped, pending);
            }

            Ok(())
        }
        Err(fetch_err) => {
            let mut store = ctx.store.lock().unwrap();
            let attempts = store.increment_retry(entry.key)?;

            if attempts >= ctx.config.crawler.max_retries {
                tracing::warn!(
                    "Giving up on {} after {} attempts: {}",
                    url,
                    attempts,
                    fetch_err
                );
                store.mark_failed(entry.key, &format!("{} after {} attempts", fetch_err, attempts))?;
            } else {
                tracing::debug!("Attempt {} failed for {}: {}", attempts, url, fetch_err);
                store.release_claim(entry.key);
            }

            Ok(())
        }
    }
}

/// Waits until the politeness window for a domain is open, then claims it
///
/// The minimum per-domain delay is enforced across all workers through
/// the shared politeness map; the request slot is recorded under the same
/// lock that checks it.
async fn wait_for_domain_window<F: PageFetcher + 'static>(ctx: &WorkerContext<F>, domain: &str) {
    let min_delay = Duration::from_millis(ctx.config.crawler.politeness_delay_ms);

    loop {
        let wait = {
            let mut politeness = ctx.politeness.lock().unwrap();
            let state = politeness.entry(domain.to_string()).or_default();
            let now = Instant::now();
            match state.time_until_next_request(min_delay, now) {
                None => {
                    state.record_request(now);
                    None
                }
                Some(wait) => Some(wait),
            }
        };

        match wait {
            None => return,
            Some(wait) => tokio::time::sleep(wait).await,
        }
    }
}
