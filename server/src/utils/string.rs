//! String utility functions

/// Split a camelCase identifier into lowercase words.
///
/// `"firstName"` becomes `"first name"`, `"createdDate"` becomes `"created date"`.
pub fn camel_case_to_words(camel: &str) -> String {
    let mut out = String::with_capacity(camel.len() + 4);
    for (i, c) in camel.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            out.push(' ');
        }
        out.extend(c.to_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_to_words() {
        assert_eq!(camel_case_to_words("firstName"), "first name");
        assert_eq!(camel_case_to_words("createdDate"), "created date");
        assert_eq!(camel_case_to_words("name"), "name");
        assert_eq!(camel_case_to_words("externalId"), "external id");
    }

    #[test]
    fn test_camel_case_to_words_edges() {
        assert_eq!(camel_case_to_words(""), "");
        assert_eq!(camel_case_to_words("Name"), "name");
        assert_eq!(camel_case_to_words("orderCountMax"), "order count max");
    }
}
