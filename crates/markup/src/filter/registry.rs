//! Process-wide, read-only tag-name registries.
//!
//! Built once on first use and never mutated, so they are safe to share
//! across threads parsing different documents.

use std::collections::HashSet;
use std::sync::LazyLock;

/// HTML elements that conventionally omit their close tag.
static DOES_NOT_REQUIRE_CLOSE_TAG: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["p", "br", "img", "input", "hr", "link", "meta"].into_iter().collect());

/// Elements that must be rendered as open + body + close even when authored
/// self-closing, because later processing fills their body.
static REQUIRES_OPEN_BODY_CLOSE: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["select"].into_iter().collect());

/// Framework tag names with a defined meaning.
static WELL_KNOWN_WICKET_TAGS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "panel",
        "border",
        "body",
        "child",
        "extend",
        "remove",
        "head",
        "message",
        "link",
        "fragment",
        "enclosure",
        "container",
        "label",
        "header-items",
    ]
    .into_iter()
    .collect()
});

fn contains_ignore_ascii_case(set: &HashSet<&'static str>, name: &str) -> bool {
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        set.contains(name.to_ascii_lowercase().as_str())
    } else {
        set.contains(name)
    }
}

pub fn does_not_require_close_tag(name: &str) -> bool {
    contains_ignore_ascii_case(&DOES_NOT_REQUIRE_CLOSE_TAG, name)
}

pub fn requires_close_tag(name: &str) -> bool {
    !does_not_require_close_tag(name)
}

/// `qualified_name` is `name` or `ns:name`.
pub fn requires_open_body_close(qualified_name: &str) -> bool {
    contains_ignore_ascii_case(&REQUIRES_OPEN_BODY_CLOSE, qualified_name)
}

pub fn is_well_known_wicket_tag(name: &str) -> bool {
    contains_ignore_ascii_case(&WELL_KNOWN_WICKET_TAGS, name)
}
