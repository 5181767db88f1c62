//! Database schema definitions for the frontier store

/// SQL schema for the frontier database
///
/// `id` records insertion order; the claim query orders by
/// `(scraped, depth, id)` so entries are served breadth-first with ties
/// broken by discovery order.
pub const SCHEMA_SQL: &str = r#"
-- All discovered URLs and their crawl status
CREATE TABLE IF NOT EXISTS frontier (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    key TEXT NOT NULL UNIQUE,
    url TEXT NOT NULL,
    depth INTEGER NOT NULL,
    scraped INTEGER NOT NULL DEFAULT 0,
    retry_count INTEGER NOT NULL DEFAULT 0,
    failure TEXT,
    discovered_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_frontier_claim ON frontier(scraped, depth, id);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
