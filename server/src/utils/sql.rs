//! SQL utility functions

/// Escape SQL LIKE metacharacters (%, _, \) in user input
///
/// Use this when building LIKE patterns from user input to prevent
/// unintended pattern matching. Pair it with `ESCAPE '\'` in the clause.
///
/// # Example
///
/// ```
/// use pagefilter_server::utils::sql::escape_like_pattern;
///
/// let needle = "50% off_sale";
/// let pattern = format!("%{}%", escape_like_pattern(needle));
/// assert_eq!(pattern, "%50\\% off\\_sale%");
/// ```
pub fn escape_like_pattern(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(escape_like_pattern("john"), "john");
    }

    #[test]
    fn test_metacharacters_escaped() {
        assert_eq!(escape_like_pattern("a%b"), "a\\%b");
        assert_eq!(escape_like_pattern("a_b"), "a\\_b");
    }

    #[test]
    fn test_backslash_escaped_first() {
        assert_eq!(escape_like_pattern("a\\%"), "a\\\\\\%");
    }
}
