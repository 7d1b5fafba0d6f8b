use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating usernames
    /// Unicode letters, digits and `@ . + - _` only
    /// - Valid: "john_doe", "user.name", "a+b@c", "123", "üser"
    /// - Invalid: "user name", "user/name"
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[\w.@+-]+$").unwrap();

    /// Regex for validating category colors as `#RRGGBB`
    pub static ref HEX_COLOR_REGEX: Regex = Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();
}

/// Escape `%`, `_` and `\` so user input matches literally inside ILIKE patterns
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Split a search query into terms on whitespace and commas
pub fn search_terms(query: &str) -> Vec<String> {
    query
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

/// One escaped ILIKE pattern per search term
pub fn like_patterns(query: &str) -> Vec<String> {
    search_terms(query).iter().map(|t| like_pattern(t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_regex_valid() {
        assert!(USERNAME_REGEX.is_match("john_doe"));
        assert!(USERNAME_REGEX.is_match("user.name"));
        assert!(USERNAME_REGEX.is_match("a+b@c"));
        assert!(USERNAME_REGEX.is_match("123"));
        assert!(USERNAME_REGEX.is_match("with-hyphen"));
        assert!(USERNAME_REGEX.is_match("üser"));
    }

    #[test]
    fn test_username_regex_invalid() {
        assert!(!USERNAME_REGEX.is_match("user name")); // space
        assert!(!USERNAME_REGEX.is_match("user/name")); // slash
        assert!(!USERNAME_REGEX.is_match("")); // empty
    }

    #[test]
    fn test_hex_color_regex() {
        assert!(HEX_COLOR_REGEX.is_match("#007bff"));
        assert!(HEX_COLOR_REGEX.is_match("#FFFFFF"));
        assert!(!HEX_COLOR_REGEX.is_match("007bff"));
        assert!(!HEX_COLOR_REGEX.is_match("#fff"));
        assert!(!HEX_COLOR_REGEX.is_match("#gggggg"));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("milk"), "%milk%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }

    #[test]
    fn test_search_terms_split_on_whitespace_and_commas() {
        assert_eq!(search_terms("plumber call"), vec!["plumber", "call"]);
        assert_eq!(search_terms(" buy,milk ,, now "), vec!["buy", "milk", "now"]);
        assert!(search_terms("  , ").is_empty());
        assert_eq!(like_patterns("50% off"), vec!["%50\\%%", "%off%"]);
    }
}
