//! HTML escaping.
//!
//! Text escapes `&`, `<` and `>`; attribute values escape only `"`.
//! Both are single-pass, so existing entities are escaped exactly once.

use std::borrow::Cow;

const TEXT_CHARS: [char; 3] = ['&', '<', '>'];
const ATTR_CHARS: [char; 1] = ['"'];

#[inline]
fn entity(c: char) -> Option<&'static str> {
    match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        _ => None,
    }
}

/// Escape text content and tag/attribute names.
///
/// # Example
/// ```ignore
/// assert_eq!(escape_text("<b>"), "&lt;b&gt;");
/// assert_eq!(escape_text("plain"), "plain"); // No allocation
/// ```
#[inline]
pub fn escape_text(s: &str) -> Cow<'_, str> {
    escape_with(s, &TEXT_CHARS)
}

/// Escape a double-quoted attribute value.
#[inline]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    escape_with(s, &ATTR_CHARS)
}

#[inline]
fn escape_with<'a>(s: &'a str, chars: &[char]) -> Cow<'a, str> {
    if !s.contains(chars) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match entity(c).filter(|_| chars.contains(&c)) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}
