use url::Url;

/// Extracts the domain from a URL
///
/// Returns the lowercase host component. This is the grouping key for the
/// subdomain inventory and for per-domain politeness: a URL belongs to
/// exactly one domain, derived deterministically from its host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use tidepool::url::extract_domain;
///
/// let url = Url::parse("https://blog.example.com/post").unwrap();
/// assert_eq!(extract_domain(&url), Some("blog.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}
