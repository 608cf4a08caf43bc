//! Expands self-closed tags that must carry a body.
//!
//! `<select/>` becomes `<select>` followed by a synthesized `</select>`, since
//! later processing renders child options into the body.

use super::registry::requires_open_body_close;
use super::{BoxedFilter, MarkupFilter};
use crate::error::ParseError;
use crate::tag::{ComponentTag, TagHandle, TagType};

const LOG_TARGET: &str = "markup.tag_type_handler";

pub struct TagTypeHandler {
    parent: BoxedFilter,
    /// Synthesized close tags, emitted before pulling from the parent again.
    pending: Vec<TagHandle>,
}

impl TagTypeHandler {
    pub fn new(parent: BoxedFilter) -> Self {
        Self {
            parent,
            pending: Vec::new(),
        }
    }
}

impl MarkupFilter for TagTypeHandler {
    fn next_tag(&mut self) -> Result<Option<TagHandle>, ParseError> {
        if let Some(close) = self.pending.pop() {
            return Ok(Some(close));
        }

        let Some(tag) = self.parent.next_tag()? else {
            return Ok(None);
        };

        let expand = {
            let t = tag.borrow();
            t.is_open_close() && requires_open_body_close(&t.qualified_name())
        };
        if expand {
            {
                let mut t = tag.borrow_mut();
                t.set_tag_type(TagType::Open);
                t.set_modified(true);
                log::trace!(
                    target: LOG_TARGET,
                    "expanded {} into open and close tags",
                    t.to_user_debug_string()
                );
            }
            self.pending.push(ComponentTag::synthetic_close(&tag));
        }
        Ok(Some(tag))
    }
}
