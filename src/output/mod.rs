//! Output module for crawl reports
//!
//! Read-only reporting over the frontier store and the analytics
//! aggregator: console statistics and a markdown summary file. Nothing
//! in this module mutates crawl state.

mod report;

pub use report::{build_report, print_report, write_markdown_summary, CrawlReport};
