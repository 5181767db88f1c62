//! HTML parser for extracting links and text tokens
//!
//! This module turns a fetched HTML body into the narrow shape the engine
//! consumes: the absolute link URLs found on the page and the whitespace
//! separated text tokens of its visible content.

use scraper::{Html, Selector};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// All links found on the page (absolute URLs)
    pub links: Vec<String>,

    /// Whitespace-separated text tokens of the page body
    pub tokens: Vec<String>,
}

/// Parses HTML content and extracts links and text tokens
///
/// # Link Extraction Rules
///
/// **Include:** `<a href="...">` anywhere in the document.
///
/// **Exclude:** `javascript:`, `mailto:`, `tel:` and `data:` hrefs,
/// fragment-only anchors, `<a ... download>` links, and anything that does
/// not resolve to an HTTP(S) URL against the base.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The base URL for resolving relative links
pub fn parse_html(html: &str, base_url: &Url) -> Result<ParsedPage, String> {
    let document = Html::parse_document(html);

    let links = extract_links(&document, base_url)?;
    let tokens = extract_tokens(&document)?;

    Ok(ParsedPage { links, tokens })
}

/// Extracts all valid links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Result<Vec<String>, String> {
    let mut links = Vec::new();

    let a_selector =
        Selector::parse("a[href]").map_err(|e| format!("bad selector: {:?}", e))?;
    for element in document.select(&a_selector) {
        // Skip if it has the download attribute
        if element.value().attr("download").is_some() {
            continue;
        }

        if let Some(href) = element.value().attr("href") {
            if let Some(absolute_url) = resolve_link(href, base_url) {
                links.push(absolute_url);
            }
        }
    }

    Ok(links)
}

/// Extracts the visible text of the document body as raw tokens
///
/// Script and style contents are excluded. Tokens are split on
/// whitespace; normalization happens downstream in the analytics
/// aggregator, not here.
fn extract_tokens(document: &Html) -> Result<Vec<String>, String> {
    let body_selector = Selector::parse("body").map_err(|e| format!("bad selector: {:?}", e))?;

    let mut tokens = Vec::new();
    for body in document.select(&body_selector) {
        collect_text_tokens(body, &mut tokens);
    }

    Ok(tokens)
}

/// Walks the element tree accumulating text tokens, skipping script/style
fn collect_text_tokens(element: scraper::ElementRef<'_>, tokens: &mut Vec<String>) {
    for child in element.children() {
        if let Some(child_element) = scraper::ElementRef::wrap(child) {
            let name = child_element.value().name();
            if name == "script" || name == "style" {
                continue;
            }
            collect_text_tokens(child_element, tokens);
        } else if let Some(text) = child.value().as_text() {
            tokens.extend(text.split_whitespace().map(|t| t.to_string()));
        }
    }
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only anchors
/// - Invalid URLs or non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#;
        let parsed = parse_html(html, &base_url()).unwrap();
        assert_eq!(parsed.links, vec!["https://other.com/page"]);
    }

    #[test]
    fn test_extract_relative_link() {
        let html = r#"<html><body><a href="/other">Link</a></body></html>"#;
        let parsed = parse_html(html, &base_url()).unwrap();
        assert_eq!(parsed.links, vec!["https://example.com/other"]);
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r#"<html><body>
            <a href="javascript:void(0)">Js</a>
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+1234567890">Call</a>
            <a href="data:text/html,x">Data</a>
        </body></html>"#;
        let parsed = parse_html(html, &base_url()).unwrap();
        assert!(parsed.links.is_empty());
    }

    #[test]
    fn test_skip_download_link() {
        let html = r#"<html><body><a href="/file.pdf" download>Download</a></body></html>"#;
        let parsed = parse_html(html, &base_url()).unwrap();
        assert!(parsed.links.is_empty());
    }

    #[test]
    fn test_skip_fragment_only() {
        let html = r##"<html><body><a href="#section">Jump</a></body></html>"##;
        let parsed = parse_html(html, &base_url()).unwrap();
        assert!(parsed.links.is_empty());
    }

    #[test]
    fn test_multiple_links() {
        let html = r#"
            <html>
            <body>
                <a href="/page1">Link 1</a>
                <a href="/page2">Link 2</a>
                <a href="https://other.com/page3">Link 3</a>
            </body>
            </html>
        "#;
        let parsed = parse_html(html, &base_url()).unwrap();
        assert_eq!(parsed.links.len(), 3);
    }

    #[test]
    fn test_extract_tokens_from_body() {
        let html = r#"<html><body><p>Hello crawler world</p></body></html>"#;
        let parsed = parse_html(html, &base_url()).unwrap();
        assert_eq!(parsed.tokens, vec!["Hello", "crawler", "world"]);
    }

    #[test]
    fn test_tokens_span_nested_elements() {
        let html = r#"<html><body><div>one <span>two</span></div><p>three</p></body></html>"#;
        let parsed = parse_html(html, &base_url()).unwrap();
        assert_eq!(parsed.tokens, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_script_and_style_excluded_from_tokens() {
        let html = r#"<html><body>
            <script>var hidden = true;</script>
            <style>.hidden { display: none; }</style>
            <p>visible</p>
        </body></html>"#;
        let parsed = parse_html(html, &base_url()).unwrap();
        assert_eq!(parsed.tokens, vec!["visible"]);
    }

    #[test]
    fn test_empty_body_has_no_tokens() {
        let html = r#"<html><body></body></html>"#;
        let parsed = parse_html(html, &base_url()).unwrap();
        assert!(parsed.tokens.is_empty());
    }
}
