//! CDATA-safe encoding for text embedded in the AJAX envelope.
//!
//! Component markup and scripts are written inside `<![CDATA[ ... ]]>`
//! sections. Any `]` in that text could start a premature `]]>` terminator,
//! so every `]` is followed by a `^`. The client reverses the transform by
//! dropping the `^` that immediately follows each `]`.
//!
//! Invariants:
//! - `needs_encoding(s)` is true iff `s` contains `]`.
//! - `encode(s)` never contains `]]` and therefore never contains `]]>`.
//! - `decode(encode(s)) == s` for every input.
//! - The transform is per character, so encoding fragment by fragment gives
//!   the same result as encoding the concatenation.

use memchr::memchr;
use std::borrow::Cow;

/// Name of the transform, written into the `encoding` attribute.
pub const ENCODING_NAME: &str = "wicket1";

const ESCAPE: char = '^';

pub fn needs_encoding(text: &str) -> bool {
    memchr(b']', text.as_bytes()).is_some()
}

/// Encodes `text` so it is safe to place inside a CDATA section.
pub fn encode(text: &str) -> Cow<'_, str> {
    if !needs_encoding(text) {
        return Cow::Borrowed(text);
    }
    let extra = text.bytes().filter(|&b| b == b']').count();
    let mut out = String::with_capacity(text.len() + extra);
    for ch in text.chars() {
        out.push(ch);
        if ch == ']' {
            out.push(ESCAPE);
        }
    }
    Cow::Owned(out)
}

/// Reverses [`encode`].
pub fn decode(text: &str) -> Cow<'_, str> {
    if !needs_encoding(text) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        out.push(ch);
        if ch == ']' && chars.peek() == Some(&ESCAPE) {
            chars.next();
        }
    }
    Cow::Owned(out)
}

/// Appends `text` to `out`, encoding it when required.
///
/// Returns true when the transform was applied.
pub fn push_encoded(out: &mut String, text: &str) -> bool {
    match encode(text) {
        Cow::Borrowed(plain) => {
            out.push_str(plain);
            false
        }
        Cow::Owned(encoded) => {
            out.push_str(&encoded);
            true
        }
    }
}
