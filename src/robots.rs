//! Sitemap declaration extraction from robots.txt content
//!
//! Allow/disallow policy is out of scope for this crate; the only thing
//! read from robots.txt is the set of `Sitemap:` declarations, which feed
//! the per-domain sitemap collection.

/// Extracts sitemap URLs declared in a robots.txt body
///
/// Per the robots.txt convention the directive is case-insensitive and
/// may appear anywhere in the file, outside any user-agent group.
/// Declarations are returned in file order; blank values are skipped.
pub fn sitemap_declarations(content: &str) -> Vec<String> {
    let mut sitemaps = Vec::new();

    for line in content.lines() {
        // Strip trailing comments, then whitespace
        let line = match line.find('#') {
            Some(idx) => &line[..idx],
            None => line,
        };
        let line = line.trim();

        let Some((directive, value)) = line.split_once(':') else {
            continue;
        };

        if directive.trim().eq_ignore_ascii_case("sitemap") {
            let value = value.trim();
            if !value.is_empty() {
                sitemaps.push(value.to_string());
            }
        }
    }

    sitemaps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_single_declaration() {
        let content = "User-agent: *\nDisallow: /admin\nSitemap: https://example.com/sitemap.xml";
        assert_eq!(
            sitemap_declarations(content),
            vec!["https://example.com/sitemap.xml"]
        );
    }

    #[test]
    fn test_extracts_multiple_in_file_order() {
        let content = "Sitemap: https://example.com/a.xml\nSitemap: https://example.com/b.xml";
        assert_eq!(
            sitemap_declarations(content),
            vec!["https://example.com/a.xml", "https://example.com/b.xml"]
        );
    }

    #[test]
    fn test_directive_is_case_insensitive() {
        let content = "SITEMAP: https://example.com/sitemap.xml";
        assert_eq!(
            sitemap_declarations(content),
            vec!["https://example.com/sitemap.xml"]
        );
    }

    #[test]
    fn test_ignores_comments_and_blanks() {
        let content = "# Sitemap: https://example.com/commented.xml\n\nSitemap: https://example.com/real.xml # trailing";
        assert_eq!(
            sitemap_declarations(content),
            vec!["https://example.com/real.xml"]
        );
    }

    #[test]
    fn test_empty_value_skipped() {
        assert!(sitemap_declarations("Sitemap:").is_empty());
        assert!(sitemap_declarations("").is_empty());
    }

    #[test]
    fn test_unrelated_directives_ignored() {
        let content = "User-agent: *\nAllow: /\nCrawl-delay: 5";
        assert!(sitemap_declarations(content).is_empty());
    }
}
