/// Normalizes a raw token into its word-table form
///
/// The rule set is fixed and content-independent:
/// 1. Strip non-alphanumeric characters from both ends
/// 2. Lowercase what remains
/// 3. A token that is empty after stripping is dropped entirely
///
/// Every retained token contributes exactly one occurrence to the word
/// frequency table.
pub fn normalize_token(token: &str) -> Option<String> {
    let trimmed = token.trim_matches(|c: char| !c.is_alphanumeric());
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases() {
        assert_eq!(normalize_token("Hello"), Some("hello".to_string()));
        assert_eq!(normalize_token("WORLD"), Some("world".to_string()));
    }

    #[test]
    fn test_strips_boundary_punctuation() {
        assert_eq!(normalize_token("\"quoted\""), Some("quoted".to_string()));
        assert_eq!(normalize_token("end."), Some("end".to_string()));
        assert_eq!(normalize_token("(parens)"), Some("parens".to_string()));
    }

    #[test]
    fn test_keeps_interior_punctuation() {
        assert_eq!(normalize_token("don't"), Some("don't".to_string()));
        assert_eq!(normalize_token("e-mail"), Some("e-mail".to_string()));
    }

    #[test]
    fn test_drops_empty_tokens() {
        assert_eq!(normalize_token(""), None);
        assert_eq!(normalize_token("..."), None);
        assert_eq!(normalize_token("--"), None);
    }

    #[test]
    fn test_keeps_digits() {
        assert_eq!(normalize_token("2024"), Some("2024".to_string()));
    }
}
