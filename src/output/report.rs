//! Report generation from crawl state
//!
//! Answers the reporting queries the engine exposes: scraped counts,
//! top-N words, the subdomain inventory table, and per-domain sitemaps.

use crate::analytics::{Aggregator, MaxWordsRecord};
use crate::storage::FrontierStore;
use crate::TidepoolError;
use std::fmt::Write as _;
use std::path::Path;

/// Snapshot of everything the reporting collaborator can ask for
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Total URLs ever discovered
    pub total_urls: u64,

    /// URLs successfully scraped
    pub scraped: u64,

    /// URLs still awaiting a scrape
    pub pending: u64,

    /// URLs terminally failed
    pub failed: u64,

    /// Sum of all recorded word occurrences
    pub total_words: u64,

    /// Number of distinct words seen
    pub distinct_words: usize,

    /// Most frequent words, descending
    pub top_words: Vec<(String, u64)>,

    /// The longest page recorded so far
    pub max_words: Option<MaxWordsRecord>,

    /// Subdomain to distinct-URL-count table, sorted by domain
    pub subdomain_counts: Vec<(String, usize)>,

    /// Sitemap URLs per domain in discovery order
    pub sitemaps: Vec<(String, Vec<String>)>,
}

/// Builds a report from the current store and aggregator state
pub fn build_report(
    store: &dyn FrontierStore,
    analytics: &Aggregator,
    top_n: usize,
) -> Result<CrawlReport, TidepoolError> {
    Ok(CrawlReport {
        total_urls: store.count_total()?,
        scraped: store.count_scraped()?,
        pending: store.count_pending()?,
        failed: store.count_failed()?,
        total_words: analytics.word_total(),
        distinct_words: analytics.distinct_words(),
        top_words: analytics.top_words(top_n),
        max_words: analytics.max_words().cloned(),
        subdomain_counts: analytics.subdomain_counts(),
        sitemaps: analytics.sitemaps(),
    })
}

/// Prints a report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Frontier:");
    println!("  Total URLs discovered: {}", report.total_urls);
    println!("  Scraped: {}", report.scraped);
    println!("  Pending: {}", report.pending);
    println!("  Failed: {}", report.failed);
    println!();

    println!("Content:");
    println!("  Word occurrences: {}", report.total_words);
    println!("  Distinct words: {}", report.distinct_words);
    match &report.max_words {
        Some(record) => println!(
            "  Longest page: {} ({} words)",
            record.url, record.word_count
        ),
        None => println!("  Longest page: (none recorded)"),
    }
    println!();

    if !report.top_words.is_empty() {
        println!("Top words:");
        for (word, count) in &report.top_words {
            println!("  {} {}", count, word);
        }
        println!();
    }

    println!("Subdomains ({}):", report.subdomain_counts.len());
    for (domain, count) in &report.subdomain_counts {
        println!("  {}, {}", domain, count);
    }

    if !report.sitemaps.is_empty() {
        println!();
        println!("Sitemaps:");
        for (domain, sitemaps) in &report.sitemaps {
            println!("  {}:", domain);
            for sitemap in sitemaps {
                println!("    {}", sitemap);
            }
        }
    }
}

/// Writes the report as a markdown summary file
pub fn write_markdown_summary(report: &CrawlReport, path: &Path) -> Result<(), TidepoolError> {
    let mut md = String::new();

    let _ = writeln!(md, "# Crawl Summary\n");

    let _ = writeln!(md, "## Frontier\n");
    let _ = writeln!(md, "| Metric | Count |");
    let _ = writeln!(md, "|--------|-------|");
    let _ = writeln!(md, "| Total URLs discovered | {} |", report.total_urls);
    let _ = writeln!(md, "| Scraped | {} |", report.scraped);
    let _ = writeln!(md, "| Pending | {} |", report.pending);
    let _ = writeln!(md, "| Failed | {} |", report.failed);

    let _ = writeln!(md, "\n## Content\n");
    let _ = writeln!(md, "- Word occurrences: {}", report.total_words);
    let _ = writeln!(md, "- Distinct words: {}", report.distinct_words);
    match &report.max_words {
        Some(record) => {
            let _ = writeln!(
                md,
                "- Longest page: [{}]({}) with {} words",
                record.url, record.url, record.word_count
            );
        }
        None => {
            let _ = writeln!(md, "- Longest page: none recorded");
        }
    }

    if !report.top_words.is_empty() {
        let _ = writeln!(md, "\n## Top {} words\n", report.top_words.len());
        let _ = writeln!(md, "| Word | Count |");
        let _ = writeln!(md, "|------|-------|");
        for (word, count) in &report.top_words {
            let _ = writeln!(md, "| {} | {} |", word, count);
        }
    }

    let _ = writeln!(md, "\n## Subdomains\n");
    let _ = writeln!(md, "| Domain | URLs |");
    let _ = writeln!(md, "|--------|------|");
    for (domain, count) in &report.subdomain_counts {
        let _ = writeln!(md, "| {} | {} |", domain, count);
    }

    if !report.sitemaps.is_empty() {
        let _ = writeln!(md, "\n## Sitemaps\n");
        for (domain, sitemaps) in &report.sitemaps {
            let _ = writeln!(md, "- {}", domain);
            for sitemap in sitemaps {
                let _ = writeln!(md, "  - {}", sitemap);
            }
        }
    }

    std::fs::write(path, md)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FrontierStore, SqliteStore};
    use crate::url::canonicalize;
    use url::Url;

    fn populated_state() -> (SqliteStore, Aggregator) {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut analytics = Aggregator::open_in_memory().unwrap();

        let (url_a, key_a) = canonicalize("https://a.example.com/1").unwrap();
        let (url_b, key_b) = canonicalize("https://b.example.com/1").unwrap();
        store.try_insert(&url_a, key_a, 0).unwrap();
        store.try_insert(&url_b, key_b, 1).unwrap();
        store.mark_scraped(key_a).unwrap();
        store.mark_failed(key_b, "HTTP 500 after 3 attempts").unwrap();

        let tokens: Vec<String> = vec!["word".to_string(), "word".to_string(), "other".to_string()];
        analytics
            .record(&Url::parse("https://a.example.com/1").unwrap(), 0, &tokens, &[])
            .unwrap();

        (store, analytics)
    }

    #[test]
    fn test_build_report_counts() {
        let (store, analytics) = populated_state();
        let report = build_report(&store, &analytics, 10).unwrap();

        assert_eq!(report.total_urls, 2);
        assert_eq!(report.scraped, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.pending, 0);
        assert_eq!(report.total_words, 3);
        assert_eq!(report.distinct_words, 2);
        assert_eq!(report.top_words[0], ("word".to_string(), 2));
        assert_eq!(report.max_words.as_ref().unwrap().word_count, 3);
        assert_eq!(
            report.subdomain_counts,
            vec![("a.example.com".to_string(), 1)]
        );
    }

    #[test]
    fn test_markdown_summary_written() {
        let (store, analytics) = populated_state();
        let report = build_report(&store, &analytics, 10).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.md");
        write_markdown_summary(&report, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# Crawl Summary"));
        assert!(content.contains("| a.example.com | 1 |"));
        assert!(content.contains("| word | 2 |"));
    }
}
