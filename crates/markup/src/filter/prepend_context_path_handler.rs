//! Prefixes relative URLs of plain tags with the application context path.

use super::{BoxedFilter, MarkupFilter};
use crate::error::ParseError;
use crate::tag::TagHandle;

const LOG_TARGET: &str = "markup.prepend_context_path_handler";

const URL_ATTRIBUTES: [&str; 3] = ["href", "src", "background"];

fn is_relative(url: &str) -> bool {
    !url.starts_with('/') && !url.starts_with('#') && !url.contains(':')
}

pub struct PrependContextPathHandler {
    parent: BoxedFilter,
    /// Slash-terminated; `None` disables rewriting.
    context_path: Option<String>,
}

impl PrependContextPathHandler {
    pub fn new(parent: BoxedFilter, context_path: Option<String>) -> Self {
        Self {
            parent,
            context_path,
        }
    }
}

impl MarkupFilter for PrependContextPathHandler {
    fn next_tag(&mut self) -> Result<Option<TagHandle>, ParseError> {
        let Some(tag) = self.parent.next_tag()? else {
            return Ok(None);
        };
        let Some(context_path) = &self.context_path else {
            return Ok(Some(tag));
        };

        let mut t = tag.borrow_mut();
        if t.binding().is_bound() || t.is_wicket_tag() || t.is_close() {
            drop(t);
            return Ok(Some(tag));
        }

        for name in URL_ATTRIBUTES {
            let Some((key, value)) = t
                .attribute_ignore_case(name)
                .map(|(k, v)| (k.to_string(), v.to_string()))
            else {
                continue;
            };
            if is_relative(&value) {
                let rewritten = format!("{context_path}{value}");
                log::trace!(target: LOG_TARGET, "{key}: {value:?} -> {rewritten:?}");
                t.put(key, rewritten);
                t.set_modified(true);
            }
        }
        drop(t);
        Ok(Some(tag))
    }
}
