//! HTML escaping and live-reload script injection.

use std::borrow::Cow;

/// Characters that require HTML escaping.
const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

/// Get the HTML entity for a special character.
#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape HTML special characters in text or attribute content.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
///
/// # Example
/// ```ignore
/// assert_eq!(escape("<script>"), "&lt;script&gt;");
/// assert_eq!(escape("hello"), "hello"); // No allocation
/// ```
#[inline]
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Insert `snippet` right before the last `</body>`, or append it when the
/// document never closes its body.
pub fn inject_before_body_end(html: &[u8], snippet: &[u8]) -> Vec<u8> {
    const BODY_END: &[u8] = b"</body>";

    let pos = html
        .windows(BODY_END.len())
        .rposition(|w| w.eq_ignore_ascii_case(BODY_END))
        .unwrap_or(html.len());

    let mut result = Vec::with_capacity(html.len() + snippet.len());
    result.extend_from_slice(&html[..pos]);
    result.extend_from_slice(snippet);
    result.extend_from_slice(&html[pos..]);
    result
}
