//! Escaping for text placed into XML attribute values.

use std::borrow::Cow;

fn replacement(ch: char) -> Option<&'static str> {
    match ch {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escapes `text` for a double- or single-quoted attribute value. Borrows
/// when nothing needs escaping.
pub fn escape_attribute(text: &str) -> Cow<'_, str> {
    let Some(first) = text.find(|ch| replacement(ch).is_some()) else {
        return Cow::Borrowed(text);
    };
    let mut out = String::with_capacity(text.len() + 8);
    out.push_str(&text[..first]);
    for ch in text[first..].chars() {
        match replacement(ch) {
            Some(entity) => out.push_str(entity),
            None => out.push(ch),
        }
    }
    Cow::Owned(out)
}
