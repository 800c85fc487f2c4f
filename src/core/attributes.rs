//! Attribute Parsing
//!
//! Parses the property list of a start tag. No entity decoding happens here:
//! values are kept exactly as written between the quotes so that a tag can
//! be regenerated byte-for-byte.

use indexmap::IndexMap;

use super::scanner::is_whitespace;

/// Ordered attribute map. A valueless property (`<a hidden>`) maps to `None`.
pub type Attributes = IndexMap<String, Option<String>>;

/// Parse attributes from raw tag content (after the element name)
///
/// Input should be the content between the element name and `>` with any
/// trailing self-closing marker already removed. Tokens are separated by
/// whitespace outside double quotes; each token is `key` or `key=value`.
/// A repeated key keeps its first position and takes the later value.
pub fn parse_attributes(input: &str) -> Attributes {
    let mut attrs = Attributes::new();

    for statement in split_unquoted(input) {
        match statement.find('=') {
            Some(sign) => {
                let key = statement[..sign].trim();
                let value = unquote(statement[sign + 1..].trim());
                attrs.insert(key.to_string(), Some(value.to_string()));
            }
            None => {
                attrs.insert(statement.to_string(), None);
            }
        }
    }

    attrs
}

/// Split on whitespace that is not inside double quotes, dropping empty pieces
pub fn split_unquoted(input: &str) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut pieces = Vec::new();
    let mut in_quote = false;
    let mut start = 0;

    for (pos, &b) in bytes.iter().enumerate() {
        if b == b'"' {
            in_quote = !in_quote;
        } else if !in_quote && is_whitespace(b) {
            if pos > start {
                pieces.push(&input[start..pos]);
            }
            start = pos + 1;
        }
    }
    if start < bytes.len() {
        pieces.push(&input[start..]);
    }

    pieces
}

/// Remove one pair of surrounding double quotes
#[inline]
fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_attributes() {
        let attrs = parse_attributes(" XPOS=\"10\" YPOS=\"20.5\"");
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get_index(0), Some((&"XPOS".to_string(), &Some("10".to_string()))));
        assert_eq!(attrs["YPOS"].as_deref(), Some("20.5"));
    }

    #[test]
    fn test_quoted_whitespace_kept() {
        let attrs = parse_attributes(" CH=\"Tali Red seems\" FONT=\"Liberation Serif\"");
        assert_eq!(attrs["CH"].as_deref(), Some("Tali Red seems"));
        assert_eq!(attrs["FONT"].as_deref(), Some("Liberation Serif"));
    }

    #[test]
    fn test_valueless_property() {
        let attrs = parse_attributes(" hidden id=\"a\"");
        assert_eq!(attrs["hidden"], None);
        assert_eq!(attrs.get_index_of("id"), Some(1));
    }

    #[test]
    fn test_unquoted_and_empty_values() {
        let attrs = parse_attributes(" a=1 b=\"\" c=\"x");
        assert_eq!(attrs["a"].as_deref(), Some("1"));
        assert_eq!(attrs["b"].as_deref(), Some(""));
        // A lone quote is not a pair
        assert_eq!(attrs["c"].as_deref(), Some("\"x"));
    }

    #[test]
    fn test_duplicate_key_keeps_position() {
        let attrs = parse_attributes(" a=\"1\" b=\"2\" a=\"3\"");
        let keys: Vec<_> = attrs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(attrs["a"].as_deref(), Some("3"));
    }

    #[test]
    fn test_value_with_equals_sign() {
        let attrs = parse_attributes(" expr=\"a=b\"");
        assert_eq!(attrs["expr"].as_deref(), Some("a=b"));
    }

    #[test]
    fn test_split_unquoted() {
        assert_eq!(split_unquoted("  a=\"1 2\"\n\tb "), vec!["a=\"1 2\"", "b"]);
        assert!(split_unquoted("   ").is_empty());
    }
}
