//! SQLite implementation of the frontier store

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{FrontierStore, StorageError, StorageResult};
use crate::storage::{FrontierEntry, InsertOutcome};
use crate::url::UrlKey;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;
use url::Url;

/// Columns read back for a frontier entry
const ENTRY_COLUMNS: &str = "key, url, depth, scraped, retry_count, failure";

/// Raw row shape as stored; validated into a [`FrontierEntry`] on read
type RawEntryRow = (String, String, i64, i64, i64, Option<String>);

/// SQLite-backed frontier store
///
/// The connection is the durable record; `claimed` is the in-memory set
/// of keys currently handed out to workers. Both are guarded by the same
/// outer mutex (the store is shared as `Arc<Mutex<SqliteStore>>`), which
/// makes select-and-claim a single atomic step.
pub struct SqliteStore {
    conn: Connection,
    claimed: HashSet<UrlKey>,
}

impl SqliteStore {
    /// Opens or creates a frontier database at the given path
    ///
    /// Persisted rows are validated on open; malformed state surfaces as
    /// `StorageError::CorruptState` rather than failing later mid-crawl.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // synchronous = FULL: mark_scraped must survive a crash once it
        // has returned.
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = FULL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        let store = Self {
            conn,
            claimed: HashSet::new(),
        };
        store.validate_persisted_rows()?;

        Ok(store)
    }

    /// Creates an in-memory store (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            claimed: HashSet::new(),
        })
    }

    /// Checks every persisted row decodes into a valid entry
    fn validate_persisted_rows(&self) -> StorageResult<()> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM frontier", ENTRY_COLUMNS))?;
        let rows = stmt.query_map([], raw_entry_row)?;

        for row in rows {
            entry_from_row(row?)?;
        }

        Ok(())
    }
}

/// Maps a result row to its raw stored shape
fn raw_entry_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEntryRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

/// Validates a raw row into a frontier entry
///
/// Any malformed field is reported as `CorruptState`, never as a panic or
/// an unrelated decoding fault.
fn entry_from_row(raw: RawEntryRow) -> StorageResult<FrontierEntry> {
    let (key_hex, url, depth, scraped, retry_count, failure) = raw;

    let key = UrlKey::from_hex(&key_hex)
        .map_err(|e| StorageError::CorruptState(format!("bad key '{}': {}", key_hex, e)))?;

    Url::parse(&url)
        .map_err(|e| StorageError::CorruptState(format!("bad url '{}': {}", url, e)))?;

    let depth = u32::try_from(depth)
        .map_err(|_| StorageError::CorruptState(format!("bad depth {} for '{}'", depth, url)))?;

    let retry_count = u32::try_from(retry_count).map_err(|_| {
        StorageError::CorruptState(format!("bad retry count {} for '{}'", retry_count, url))
    })?;

    Ok(FrontierEntry {
        key,
        url,
        depth,
        scraped: scraped != 0,
        retry_count,
        failure,
    })
}

impl FrontierStore for SqliteStore {
    fn try_insert(&mut self, url: &Url, key: UrlKey, depth: u32) -> StorageResult<InsertOutcome> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT OR IGNORE INTO frontier (key, url, depth, discovered_at) VALUES (?1, ?2, ?3, ?4)",
            params![key.to_hex(), url.as_str(), depth, now],
        )?;

        if self.conn.changes() == 1 {
            Ok(InsertOutcome::Inserted)
        } else {
            Ok(InsertOutcome::AlreadyKnown)
        }
    }

    fn claim_next(&mut self) -> StorageResult<Option<FrontierEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM frontier WHERE scraped = 0 ORDER BY depth ASC, id ASC",
            ENTRY_COLUMNS
        ))?;
        let rows = stmt.query_map([], raw_entry_row)?;

        for row in rows {
            let entry = entry_from_row(row?)?;
            if self.claimed.contains(&entry.key) {
                continue;
            }
            self.claimed.insert(entry.key);
            return Ok(Some(entry));
        }

        Ok(None)
    }

    fn release_claim(&mut self, key: UrlKey) {
        self.claimed.remove(&key);
    }

    fn mark_scraped(&mut self, key: UrlKey) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE frontier SET scraped = 1 WHERE key = ?1",
            params![key.to_hex()],
        )?;
        self.claimed.remove(&key);

        if updated == 0 {
            return Err(StorageError::EntryNotFound(key.to_hex()));
        }
        Ok(())
    }

    fn mark_failed(&mut self, key: UrlKey, reason: &str) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE frontier SET scraped = 1, failure = ?2 WHERE key = ?1",
            params![key.to_hex(), reason],
        )?;
        self.claimed.remove(&key);

        if updated == 0 {
            return Err(StorageError::EntryNotFound(key.to_hex()));
        }
        Ok(())
    }

    fn increment_retry(&mut self, key: UrlKey) -> StorageResult<u32> {
        self.conn.execute(
            "UPDATE frontier SET retry_count = retry_count + 1 WHERE key = ?1",
            params![key.to_hex()],
        )?;

        let count: Option<i64> = self
            .conn
            .query_row(
                "SELECT retry_count FROM frontier WHERE key = ?1",
                params![key.to_hex()],
                |row| row.get(0),
            )
            .optional()?;

        match count {
            Some(c) => Ok(c as u32),
            None => Err(StorageError::EntryNotFound(key.to_hex())),
        }
    }

    fn get_entry(&self, key: UrlKey) -> StorageResult<Option<FrontierEntry>> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {} FROM frontier WHERE key = ?1", ENTRY_COLUMNS),
                params![key.to_hex()],
                raw_entry_row,
            )
            .optional()?;

        raw.map(entry_from_row).transpose()
    }

    fn count_total(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM frontier", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_scraped(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM frontier WHERE scraped = 1 AND failure IS NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_pending(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM frontier WHERE scraped = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_failed(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM frontier WHERE failure IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn clear(&mut self) -> StorageResult<()> {
        self.conn.execute("DELETE FROM frontier", [])?;
        self.claimed.clear();
        Ok(())
    }
}
