// Query string parsing

use std::borrow::Cow;
use std::collections::HashMap;

/// Parse a raw query string (without the leading `?`) into key/value pairs.
///
/// Values are percent-decoded; keys are taken verbatim. A key without
/// `=value` maps to an empty string. Later duplicates win.
pub fn parse_query(raw: &str) -> HashMap<String, String> {
    raw.split('&')
        .filter(|piece| !piece.is_empty())
        .map(|piece| match piece.split_once('=') {
            Some((key, value)) => (key.to_string(), decode(value)),
            None => (piece.to_string(), String::new()),
        })
        .collect()
}

/// Percent-decode, keeping the raw text when it does not decode to UTF-8
pub fn decode(value: &str) -> String {
    urlencoding::decode(value).map_or_else(|_| value.to_string(), Cow::into_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query() {
        assert!(parse_query("").is_empty());
        assert!(parse_query("&&").is_empty());
    }

    #[test]
    fn test_decoded_values() {
        let params = parse_query("search=Daft%20Punk&page=2");
        assert_eq!(params.get("search").map(String::as_str), Some("Daft Punk"));
        assert_eq!(params.get("page").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_key_without_value() {
        let params = parse_query("search&flag=");
        assert_eq!(params.get("search").map(String::as_str), Some(""));
        assert_eq!(params.get("flag").map(String::as_str), Some(""));
    }

    #[test]
    fn test_value_keeps_equals_and_plus() {
        let params = parse_query("q=a=b&r=x+y");
        assert_eq!(params["q"], "a=b");
        assert_eq!(params["r"], "x+y");
    }

    #[test]
    fn test_invalid_encoding_kept_raw() {
        let params = parse_query("search=%FF%FE");
        assert_eq!(params["search"], "%FF%FE");
    }

    #[test]
    fn test_cyrillic_value() {
        let params = parse_query("search=%D0%BA%D0%B8%D0%BD%D0%BE");
        assert_eq!(params["search"], "кино");
    }
}
