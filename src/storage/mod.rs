//! Storage module for the persistent crawl frontier
//!
//! This module is the single source of truth for which URLs are known,
//! scheduled, and scraped. It handles:
//! - SQLite database initialization and schema management
//! - Deduplicated insertion of discovered URLs
//! - Breadth-first claim ordering for workers
//! - Durable write-through of the scraped flag
//! - Crash recovery and resumption support

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{FrontierStore, StorageError, StorageResult};

use crate::url::UrlKey;

/// One frontier entry per distinct canonical URL ever discovered
///
/// Entries are created on first discovery and never deleted; they serve
/// as the permanent deduplication record. `depth` is set once at
/// insertion. `scraped` transitions false to true exactly once and never
/// reverts; a permanently failed entry is also marked scraped, with the
/// failure annotation kept so it stays visible in accounting.
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    pub key: UrlKey,
    pub url: String,
    pub depth: u32,
    pub scraped: bool,
    pub retry_count: u32,
    pub failure: Option<String>,
}

/// Outcome of a deduplicated frontier insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The URL was not known; a new entry was created
    Inserted,
    /// An entry with the same key already exists; no-op
    AlreadyKnown,
}
