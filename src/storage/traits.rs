//! Frontier store trait and error types

use crate::storage::{FrontierEntry, InsertOutcome};
use crate::url::UrlKey;
use thiserror::Error;
use url::Url;

/// Errors that can occur during storage operations
///
/// Storage failures threaten the durability guarantee and are always
/// surfaced to the caller, never swallowed.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt persisted state: {0}")]
    CorruptState(String),

    #[error("Frontier entry not found: {0}")]
    EntryNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for frontier store implementations
///
/// The store is shared by all workers behind a mutex; every method takes
/// `&mut self` and relies on that exclusive access for atomicity. In
/// particular `claim_next` is the sole serialization point for claims:
/// under the lock it both selects an entry and records the claim, so two
/// concurrent callers can never receive the same key.
pub trait FrontierStore {
    /// Inserts a URL if its key is not already known
    ///
    /// This is the single deduplication gate: every newly discovered link
    /// must pass through it before any worker may fetch it. `depth` is
    /// recorded once, at first insertion, and never mutated afterwards.
    fn try_insert(&mut self, url: &Url, key: UrlKey, depth: u32) -> StorageResult<InsertOutcome>;

    /// Claims the next unscraped, unclaimed entry for exactly one caller
    ///
    /// Entries are served in non-decreasing depth, ties broken by
    /// insertion order. Returns `None` when nothing is claimable (the
    /// frontier may still have in-flight claims outstanding).
    fn claim_next(&mut self) -> StorageResult<Option<FrontierEntry>>;

    /// Returns a claimed entry to the claimable pool without marking it
    ///
    /// Used by the retry path after a failed fetch attempt.
    fn release_claim(&mut self, key: UrlKey);

    /// Marks an entry as scraped, durably, before returning
    ///
    /// Idempotent: a second call on the same key leaves state identical.
    /// Once this returns, a crash never re-schedules the URL.
    fn mark_scraped(&mut self, key: UrlKey) -> StorageResult<()>;

    /// Terminally fails an entry after its retries are exhausted
    ///
    /// Sets the scraped flag so the entry is never re-scheduled, and
    /// records the failure annotation so it does not vanish from
    /// accounting.
    fn mark_failed(&mut self, key: UrlKey, reason: &str) -> StorageResult<()>;

    /// Increments and returns the retry count for an entry
    fn increment_retry(&mut self, key: UrlKey) -> StorageResult<u32>;

    /// Gets an entry by key
    fn get_entry(&self, key: UrlKey) -> StorageResult<Option<FrontierEntry>>;

    // ===== Counting queries for reporting =====

    /// Total number of entries ever discovered
    fn count_total(&self) -> StorageResult<u64>;

    /// Entries successfully scraped (excludes terminal failures)
    fn count_scraped(&self) -> StorageResult<u64>;

    /// Entries still awaiting a successful scrape
    fn count_pending(&self) -> StorageResult<u64>;

    /// Entries terminally failed
    fn count_failed(&self) -> StorageResult<u64>;

    /// Removes every entry (fresh crawl)
    fn clear(&mut self) -> StorageResult<()>;
}
