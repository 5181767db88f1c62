//! Content analytics aggregator
//!
//! Consumes parsed page content and maintains four derived aggregates:
//! the global word-frequency table, the longest-page tracker, the
//! per-subdomain URL inventory, and the per-domain sitemap collection.
//!
//! The aggregator owns all four structures and persists them in its own
//! SQLite database, loaded at startup and written through on every
//! [`Aggregator::record`] call. Each structure's update is atomic within
//! itself (one transaction per record call); atomicity *across* the
//! aggregator and the frontier store is deliberately not guaranteed,
//! since analytics are diagnostic rather than correctness-critical.
//!
//! Callers share the aggregator as `Arc<Mutex<Aggregator>>`; the mutex is
//! the documented locking discipline for all four structures.

mod tokens;

pub use tokens::normalize_token;

use crate::storage::{StorageError, StorageResult};
use crate::url::extract_domain;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use url::Url;

/// The scraped page with the largest retained-token count seen so far
///
/// Updated only on strict increase, so the first page to reach a given
/// count keeps the record on ties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxWordsRecord {
    pub url: String,
    pub word_count: u64,
}

/// SQL schema for the analytics database, one table per structure
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS word_counts (
    word TEXT PRIMARY KEY,
    count INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS max_words (
    id INTEGER PRIMARY KEY CHECK (id = 0),
    url TEXT NOT NULL,
    word_count INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS subdomain_urls (
    domain TEXT NOT NULL,
    url TEXT NOT NULL,
    PRIMARY KEY (domain, url)
);

CREATE TABLE IF NOT EXISTS sitemap_urls (
    domain TEXT NOT NULL,
    sitemap_url TEXT NOT NULL,
    position INTEGER NOT NULL,
    PRIMARY KEY (domain, sitemap_url)
);
"#;

/// Streaming content analytics over scraped pages
pub struct Aggregator {
    conn: Connection,
    word_counts: HashMap<String, u64>,
    max_words: Option<MaxWordsRecord>,
    subdomains: HashMap<String, HashSet<String>>,
    sitemaps: HashMap<String, Vec<String>>,
}

impl Aggregator {
    /// Opens or creates the analytics database and loads all aggregates
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;
        conn.execute_batch(SCHEMA_SQL)?;

        let mut aggregator = Self {
            conn,
            word_counts: HashMap::new(),
            max_words: None,
            subdomains: HashMap::new(),
            sitemaps: HashMap::new(),
        };
        aggregator.load()?;

        Ok(aggregator)
    }

    /// Creates an in-memory aggregator (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn,
            word_counts: HashMap::new(),
            max_words: None,
            subdomains: HashMap::new(),
            sitemaps: HashMap::new(),
        })
    }

    /// Loads every aggregate table into memory
    fn load(&mut self) -> StorageResult<()> {
        {
            let mut stmt = self.conn.prepare("SELECT word, count FROM word_counts")?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get::<_, i64>(1)?)))?;
            for row in rows {
                let (word, count): (String, i64) = row?;
                let count = u64::try_from(count).map_err(|_| {
                    StorageError::CorruptState(format!("negative count for word '{}'", word))
                })?;
                self.word_counts.insert(word, count);
            }
        }

        self.max_words = self
            .conn
            .query_row("SELECT url, word_count FROM max_words WHERE id = 0", [], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .optional()?
            .map(|(url, word_count)| {
                u64::try_from(word_count)
                    .map(|word_count| MaxWordsRecord { url, word_count })
                    .map_err(|_| {
                        StorageError::CorruptState("negative max word count".to_string())
                    })
            })
            .transpose()?;

        {
            let mut stmt = self.conn.prepare("SELECT domain, url FROM subdomain_urls")?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            for row in rows {
                let (domain, url): (String, String) = row?;
                self.subdomains.entry(domain).or_default().insert(url);
            }
        }

        {
            let mut stmt = self.conn.prepare(
                "SELECT domain, sitemap_url FROM sitemap_urls ORDER BY domain, position",
            )?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            for row in rows {
                let (domain, sitemap_url): (String, String) = row?;
                self.sitemaps.entry(domain).or_default().push(sitemap_url);
            }
        }

        Ok(())
    }

    /// Records the content of one successfully scraped page
    ///
    /// Invoked exactly once per scraped page. Tokens arrive pre-computed
    /// from the fetcher collaborator; this method normalizes them (see
    /// [`normalize_token`]), then updates all four aggregates and commits
    /// them in a single transaction.
    pub fn record(
        &mut self,
        url: &Url,
        depth: u32,
        tokens: &[String],
        sitemap_links: &[String],
    ) -> StorageResult<()> {
        let mut page_counts: HashMap<String, u64> = HashMap::new();
        for token in tokens {
            if let Some(word) = normalize_token(token) {
                *page_counts.entry(word).or_insert(0) += 1;
            }
        }
        let page_word_total: u64 = page_counts.values().sum();

        tracing::debug!(
            "Recording {} ({} retained tokens, depth {})",
            url,
            page_word_total,
            depth
        );

        // Decide all updates against current in-memory state first, then
        // persist, then apply in memory once the commit has succeeded.
        let current_max = self.max_words.as_ref().map(|r| r.word_count).unwrap_or(0);
        let new_max = if page_word_total > current_max {
            Some(MaxWordsRecord {
                url: url.to_string(),
                word_count: page_word_total,
            })
        } else {
            None
        };

        let inventory_insert = extract_domain(url).and_then(|domain| {
            let already_present = self
                .subdomains
                .get(&domain)
                .map(|set| set.contains(url.as_str()))
                .unwrap_or(false);
            if already_present {
                None
            } else {
                Some((domain, url.to_string()))
            }
        });

        let mut sitemap_inserts: Vec<(String, String, usize)> = Vec::new();
        for link in sitemap_links {
            let parsed = match Url::parse(link) {
                Ok(p) => p,
                Err(e) => {
                    tracing::debug!("Dropping malformed sitemap URL {}: {}", link, e);
                    continue;
                }
            };
            let domain = match extract_domain(&parsed) {
                Some(d) => d,
                None => continue,
            };

            let existing = self.sitemaps.get(&domain).map(|l| l.len()).unwrap_or(0);
            let pending = sitemap_inserts
                .iter()
                .filter(|(d, _, _)| *d == domain)
                .count();
            let duplicate = self
                .sitemaps
                .get(&domain)
                .map(|l| l.iter().any(|s| s == link))
                .unwrap_or(false)
                || sitemap_inserts.iter().any(|(d, s, _)| d == &domain && s == link);

            if !duplicate {
                sitemap_inserts.push((domain, link.clone(), existing + pending));
            }
        }

        let tx = self.conn.transaction()?;

        for (word, n) in &page_counts {
            tx.execute(
                "INSERT INTO word_counts (word, count) VALUES (?1, ?2)
                 ON CONFLICT(word) DO UPDATE SET count = count + ?2",
                params![word, *n as i64],
            )?;
        }

        if let Some(record) = &new_max {
            tx.execute(
                "INSERT INTO max_words (id, url, word_count) VALUES (0, ?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET url = ?1, word_count = ?2",
                params![record.url, record.word_count as i64],
            )?;
        }

        if let Some((domain, url_str)) = &inventory_insert {
            tx.execute(
                "INSERT OR IGNORE INTO subdomain_urls (domain, url) VALUES (?1, ?2)",
                params![domain, url_str],
            )?;
        }

        for (domain, link, position) in &sitemap_inserts {
            tx.execute(
                "INSERT OR IGNORE INTO sitemap_urls (domain, sitemap_url, position)
                 VALUES (?1, ?2, ?3)",
                params![domain, link, *position as i64],
            )?;
        }

        tx.commit()?;

        // Durable; now reflect the same updates in memory.
        for (word, n) in page_counts {
            *self.word_counts.entry(word).or_insert(0) += n;
        }
        if let Some(record) = new_max {
            self.max_words = Some(record);
        }
        if let Some((domain, url_str)) = inventory_insert {
            self.subdomains.entry(domain).or_default().insert(url_str);
        }
        for (domain, link, _) in sitemap_inserts {
            self.sitemaps.entry(domain).or_default().push(link);
        }

        Ok(())
    }

    /// Forces a WAL checkpoint so the main database file is current
    ///
    /// Called at shutdown; per-record transactions already make every
    /// update durable in the log.
    pub fn flush(&self) -> StorageResult<()> {
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }

    // ===== Read-only queries for reporting =====

    /// Sum of all word occurrences recorded so far
    pub fn word_total(&self) -> u64 {
        self.word_counts.values().sum()
    }

    /// Number of distinct words in the frequency table
    pub fn distinct_words(&self) -> usize {
        self.word_counts.len()
    }

    /// Cumulative count for one word (absent words have count 0)
    pub fn word_count(&self, word: &str) -> u64 {
        self.word_counts.get(word).copied().unwrap_or(0)
    }

    /// Top N words by frequency, ties broken alphabetically
    pub fn top_words(&self, n: usize) -> Vec<(String, u64)> {
        let mut words: Vec<(String, u64)> = self
            .word_counts
            .iter()
            .map(|(w, c)| (w.clone(), *c))
            .collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words.truncate(n);
        words
    }

    /// The longest page seen so far, if any page has been recorded
    pub fn max_words(&self) -> Option<&MaxWordsRecord> {
        self.max_words.as_ref()
    }

    /// Subdomain to distinct-URL-count table, sorted by domain
    pub fn subdomain_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = self
            .subdomains
            .iter()
            .map(|(domain, urls)| (domain.clone(), urls.len()))
            .collect();
        counts.sort_by(|a, b| a.0.cmp(&b.0));
        counts
    }

    /// Sitemap URLs per domain in discovery order, sorted by domain
    pub fn sitemaps(&self) -> Vec<(String, Vec<String>)> {
        let mut sitemaps: Vec<(String, Vec<String>)> = self
            .sitemaps
            .iter()
            .map(|(domain, urls)| (domain.clone(), urls.clone()))
            .collect();
        sitemaps.sort_by(|a, b| a.0.cmp(&b.0));
        sitemaps
    }
}
