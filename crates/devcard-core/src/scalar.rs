//! Scalar-level helpers shared by the parser: key lines, quote stripping and
//! inline lists.

use std::borrow::Cow;

use crate::ast::{CowStr, Node};

/// Strip one pair of matching single or double quotes.
///
/// ```rust
/// use devcard_core::scalar::unquote;
///
/// assert_eq!(unquote("\"value\""), "value");
/// assert_eq!(unquote("'value'"), "value");
/// assert_eq!(unquote("\"mismatched'"), "\"mismatched'");
/// ```
#[inline]
pub fn unquote(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' || first == b'\'') && first == last {
            return &s[1..s.len() - 1];
        }
    }
    s
}

#[inline(always)]
fn is_key_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-')
}

/// Split `key: value` into key and (trimmed) value.
///
/// `s` must start at the key. The key is one or more word characters, dots
/// or hyphens, optionally followed by whitespace, then a colon.
pub fn split_key_value(s: &str) -> Option<(&str, &str)> {
    let key_len = s.bytes().take_while(|&b| is_key_byte(b)).count();
    if key_len == 0 {
        return None;
    }
    let rest = s[key_len..].trim_start_matches([' ', '\t']);
    let value = rest.strip_prefix(':')?;
    Some((&s[..key_len], value.trim()))
}

/// Like [`split_key_value`], but the colon must be followed by whitespace or
/// the end of the text. Used to tell `- key: value` items from scalar items
/// such as `- https://example.com`.
pub fn split_item_pair(s: &str) -> Option<(&str, &str)> {
    let (key, value) = split_key_value(s)?;
    let colon = s.find(':')?;
    match s.as_bytes().get(colon + 1) {
        None | Some(b' ') | Some(b'\t') => Some((key, value)),
        _ => None,
    }
}

/// Whether `value` is an inline list `[a, b, c]`.
#[inline]
pub fn is_inline_list(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('[') && value.ends_with(']')
}

/// Parse the inside of `[...]` into scalars. Commas inside quotes do not
/// split; items are trimmed and unquoted, empty items dropped.
pub fn parse_inline_list(value: &str) -> Vec<Node<'_>> {
    let inner = &value[1..value.len() - 1];
    let mut items = Vec::with_capacity(4);
    let mut start = 0;
    let mut quote: Option<u8> = None;

    for (i, b) in inner.bytes().enumerate() {
        match (b, quote) {
            (b'"' | b'\'', None) => quote = Some(b),
            (q, Some(open)) if q == open => quote = None,
            (b',', None) => {
                push_item(&mut items, &inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    push_item(&mut items, &inner[start..]);

    items
}

fn push_item<'a>(items: &mut Vec<Node<'a>>, raw: &'a str) {
    let item = unquote(raw.trim());
    if !item.is_empty() {
        items.push(Node::Scalar(Cow::Borrowed(item)));
    }
}

/// Plain scalar value: trimmed and unquoted, borrowed from the input.
#[inline]
pub fn plain(value: &str) -> CowStr<'_> {
    Cow::Borrowed(unquote(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_key_value() {
        assert_eq!(split_key_value("name: Ada"), Some(("name", "Ada")));
        assert_eq!(split_key_value("name:Ada"), Some(("name", "Ada")));
        assert_eq!(split_key_value("open.source-url :  x "), Some(("open.source-url", "x")));
        assert_eq!(split_key_value("bio:"), Some(("bio", "")));
        assert_eq!(split_key_value("no colon here"), None);
        assert_eq!(split_key_value(": value"), None);
        assert_eq!(split_key_value("two words: value"), None);
    }

    #[test]
    fn test_split_item_pair_requires_space_after_colon() {
        assert_eq!(split_item_pair("name: devcard"), Some(("name", "devcard")));
        assert_eq!(split_item_pair("name:"), Some(("name", "")));
        assert_eq!(split_item_pair("https://example.com"), None);
        assert_eq!(split_item_pair("Rust"), None);
    }

    #[test]
    fn test_inline_list_respects_quotes() {
        let items = parse_inline_list(r#"[rust, "a, b", 'c', , ""]"#);
        let items: Vec<_> = items.iter().filter_map(Node::as_str).collect();
        assert_eq!(items, vec!["rust", "a, b", "c"]);
    }

    #[test]
    fn test_empty_inline_list() {
        assert!(parse_inline_list("[]").is_empty());
        assert!(is_inline_list("[]"));
        assert!(!is_inline_list("["));
    }
}
