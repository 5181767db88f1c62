use serde::Deserialize;

/// Main configuration structure for Tidepool
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    pub output: OutputConfig,

    /// Seed URLs inserted into the frontier at depth 0
    #[serde(default)]
    pub seeds: Vec<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of concurrent workers in the pool
    pub workers: u32,

    /// Maximum BFS depth from a seed URL; links found at this depth are
    /// not enqueued
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Fetch attempts before an entry is terminally failed
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Minimum time between requests to the same domain (milliseconds)
    #[serde(rename = "politeness-delay-ms")]
    pub politeness_delay_ms: u64,

    /// Upper bound on a single fetch, including the response body (seconds)
    #[serde(rename = "fetch-timeout-secs")]
    pub fetch_timeout_secs: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the frontier SQLite database
    #[serde(rename = "frontier-path")]
    pub frontier_path: String,

    /// Path to the analytics SQLite database
    #[serde(rename = "analytics-path")]
    pub analytics_path: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the markdown summary file
    #[serde(rename = "summary-path")]
    pub summary_path: String,

    /// How many words the summary's frequency table shows
    #[serde(rename = "top-words", default = "default_top_words")]
    pub top_words: usize,
}

fn default_top_words() -> usize {
    50
}
