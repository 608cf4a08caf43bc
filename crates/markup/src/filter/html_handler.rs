//! Balances open and close tags.
//!
//! Invariants:
//! - Every close tag emitted downstream links to its open tag.
//! - Open-close tags link to themselves.
//! - Tags conventionally left unclosed (`p`, `br`, `img`, ...) are popped
//!   silently and flagged `has_no_close_tag`; any other imbalance is fatal.

use super::registry::requires_close_tag;
use super::{BoxedFilter, MarkupFilter};
use crate::error::{ParseError, ParseErrorCode};
use crate::tag::{ComponentTag, TagHandle, TagType};

const LOG_TARGET: &str = "markup.html_handler";

fn requires_close(tag: &ComponentTag) -> bool {
    tag.namespace().is_some() || requires_close_tag(tag.name())
}

pub struct HtmlHandler {
    parent: BoxedFilter,
    stack: Vec<TagHandle>,
}

impl HtmlHandler {
    pub fn new(parent: BoxedFilter) -> Self {
        Self {
            parent,
            stack: Vec::new(),
        }
    }

    /// Number of open tags still waiting for a close tag.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn balance(&mut self, close: &TagHandle) -> Result<(), ParseError> {
        let Some(mut top) = self.stack.pop() else {
            let c = close.borrow();
            return Err(ParseError::at_tag(
                ParseErrorCode::UnmatchedCloseTag,
                &c,
                format!("Tag does not have a matching open tag: {}", c.to_user_debug_string()),
            ));
        };

        let mut mismatch = !top.borrow().has_equal_name(&close.borrow());
        while mismatch && !requires_close(&top.borrow()) {
            top.borrow_mut().set_has_no_close_tag(true);
            log::trace!(
                target: LOG_TARGET,
                "{} has no close tag",
                top.borrow().to_user_debug_string()
            );
            let Some(next) = self.stack.pop() else {
                break;
            };
            top = next;
            mismatch = !top.borrow().has_equal_name(&close.borrow());
        }

        if mismatch {
            let t = top.borrow();
            return Err(ParseError::at_tag(
                ParseErrorCode::MismatchedCloseTag,
                &t,
                format!(
                    "Tag {} has a mismatched close tag at {}",
                    t.to_user_debug_string(),
                    close.borrow().to_user_debug_string()
                ),
            ));
        }

        close.borrow_mut().set_open_tag(&top);
        Ok(())
    }

    fn drain(&mut self) -> Result<(), ParseError> {
        while let Some(top) = self.stack.pop() {
            let mut t = top.borrow_mut();
            if requires_close(&t) {
                return Err(ParseError::at_tag(
                    ParseErrorCode::UnclosedTag,
                    &t,
                    format!("Tag does not have a close tag: {}", t.to_user_debug_string()),
                ));
            }
            t.set_has_no_close_tag(true);
        }
        Ok(())
    }
}

impl MarkupFilter for HtmlHandler {
    fn next_tag(&mut self) -> Result<Option<TagHandle>, ParseError> {
        let Some(tag) = self.parent.next_tag()? else {
            self.drain()?;
            return Ok(None);
        };

        let tag_type = tag.borrow().tag_type();
        match tag_type {
            TagType::Open => self.stack.push(tag.clone()),
            TagType::Close => self.balance(&tag)?,
            TagType::OpenClose => tag.borrow_mut().set_open_tag(&tag),
        }
        Ok(Some(tag))
    }
}
