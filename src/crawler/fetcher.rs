//! Page fetcher collaborator
//!
//! The engine consumes pages through the narrow [`PageFetcher`] interface:
//! a canonical URL in, extracted links, text tokens, and sitemap
//! declarations out. [`HttpFetcher`] is the production implementation
//! (reqwest + HTML parsing); tests substitute scripted fetchers.

use crate::config::UserAgentConfig;
use crate::crawler::parser::parse_html;
use crate::robots::sitemap_declarations;
use reqwest::Client;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Everything the engine needs from one fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,

    /// Extracted link URLs (absolute, unfiltered)
    pub links: Vec<String>,

    /// Whitespace-separated text tokens of the page content
    pub tokens: Vec<String>,

    /// Sitemap URLs declared for this page's domain
    pub sitemap_links: Vec<String>,
}

/// Errors from the fetch/parse collaborator
///
/// Every variant is treated the same way by the coordinator: the URL's
/// attempt fails, and the entry follows the bounded retry policy.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("HTTP {status}")]
    Http { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Unsupported content type: {content_type}")]
    NotHtml { content_type: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Trait for page fetching implementations
///
/// The returned future must be `Send` so fetches can run on the worker
/// pool.
pub trait PageFetcher: Send + Sync {
    /// Fetches and parses one page
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// The user agent is formatted as
/// `CrawlerName/Version (+ContactURL; ContactEmail)` so site operators
/// can identify and reach the crawler's owner.
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// HTTP implementation of [`PageFetcher`]
pub struct HttpFetcher {
    client: Client,
    /// Domains whose robots.txt has already been scanned for sitemap
    /// declarations; later pages on the same domain report an empty list.
    robots_seen: Mutex<HashSet<String>>,
}

impl HttpFetcher {
    /// Creates a fetcher with the given identity and per-request timeout
    pub fn new(user_agent: &UserAgentConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, timeout)?;
        Ok(Self {
            client,
            robots_seen: Mutex::new(HashSet::new()),
        })
    }

    /// Fetches a domain's sitemap declarations, once per domain
    ///
    /// robots.txt is only read for its `Sitemap:` lines; a missing or
    /// unreadable file simply yields no declarations.
    async fn domain_sitemaps(&self, url: &Url) -> Vec<String> {
        let domain = match url.host_str() {
            Some(host) => host.to_lowercase(),
            None => return Vec::new(),
        };

        {
            let mut seen = self.robots_seen.lock().unwrap();
            if !seen.insert(domain.clone()) {
                return Vec::new();
            }
        }

        let robots_url = match url.join("/robots.txt") {
            Ok(u) => u,
            Err(_) => return Vec::new(),
        };

        match self.client.get(robots_url.as_str()).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => sitemap_declarations(&body),
                Err(_) => Vec::new(),
            },
            _ => {
                tracing::debug!("No readable robots.txt for {}", domain);
                Vec::new()
            }
        }
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send {
        async move {
            let sitemap_links = self.domain_sitemaps(url).await;

            let response = self
                .client
                .get(url.as_str())
                .send()
                .await
                .map_err(classify_error)?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Http {
                    status: status.as_u16(),
                });
            }

            let final_url = response.url().clone();

            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            if !content_type.contains("text/html") {
                return Err(FetchError::NotHtml { content_type });
            }

            let body = response.text().await.map_err(classify_error)?;
            let parsed = parse_html(&body, &final_url).map_err(FetchError::Parse)?;

            Ok(FetchedPage {
                final_url,
                links: parsed.links,
                tokens: parsed.tokens,
                sitemap_links,
            })
        }
    }
}

/// Classifies a reqwest error into the fetch taxonomy
fn classify_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_user_agent() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&test_user_agent(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&test_user_agent(), Duration::from_secs(30));
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_extracts_links_and_tokens() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(
                        r#"<html><body><p>hello world</p><a href="/next">next</a></body></html>"#,
                        "text/html",
                    ),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/", server.uri())).unwrap();
        let page = fetcher().fetch(&url).await.unwrap();

        assert_eq!(page.tokens, vec!["hello", "world", "next"]);
        assert_eq!(page.links.len(), 1);
        assert!(page.links[0].ends_with("/next"));
        assert!(page.sitemap_links.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_reports_sitemaps_once_per_domain() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("User-agent: *\nSitemap: https://example.com/sitemap.xml"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><body>page</body></html>", "text/html"),
            )
            .mount(&server)
            .await;

        let f = fetcher();

        let first = f
            .fetch(&Url::parse(&format!("{}/a", server.uri())).unwrap())
            .await
            .unwrap();
        assert_eq!(first.sitemap_links, vec!["https://example.com/sitemap.xml"]);

        let second = f
            .fetch(&Url::parse(&format!("{}/b", server.uri())).unwrap())
            .await
            .unwrap();
        assert!(second.sitemap_links.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        let result = fetcher().fetch(&url).await;

        assert!(matches!(result, Err(FetchError::Http { status: 404 })));
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_html() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{}")
                    .insert_header("content-type", "application/json"),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/data.json", server.uri())).unwrap();
        let result = fetcher().fetch(&url).await;

        assert!(matches!(result, Err(FetchError::NotHtml { .. })));
    }
}
