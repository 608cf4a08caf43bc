//! Excises `<wicket:remove>` designer-preview regions.
//!
//! The open tag is returned with an ignored binding after its whole region has
//! been consumed from the parent, so consumers drop everything up to the
//! cursor.

use super::{BoxedFilter, MarkupFilter};
use crate::error::{ParseError, ParseErrorCode};
use crate::tag::TagHandle;

const LOG_TARGET: &str = "markup.wicket_remove_tag_handler";

pub struct WicketRemoveTagHandler {
    parent: BoxedFilter,
}

impl WicketRemoveTagHandler {
    pub fn new(parent: BoxedFilter) -> Self {
        Self { parent }
    }
}

impl MarkupFilter for WicketRemoveTagHandler {
    fn next_tag(&mut self) -> Result<Option<TagHandle>, ParseError> {
        let Some(open) = self.parent.next_tag()? else {
            return Ok(None);
        };

        {
            let t = open.borrow();
            if !t.is_wicket_tag() || !t.name().eq_ignore_ascii_case("remove") || t.is_close() {
                return Ok(Some(open.clone()));
            }
            if t.is_open_close() {
                return Err(ParseError::at_tag(
                    ParseErrorCode::RemoveRegionWithoutBody,
                    &t,
                    format!(
                        "Wicket remove tag must not be an open-close tag: {}",
                        t.to_user_debug_string()
                    ),
                ));
            }
        }

        loop {
            let Some(tag) = self.parent.next_tag()? else {
                let t = open.borrow();
                return Err(ParseError::at_tag(
                    ParseErrorCode::UnterminatedRemoveRegion,
                    &t,
                    format!(
                        "Did not find close tag for markup remove region: {}",
                        t.to_user_debug_string()
                    ),
                ));
            };
            let t = tag.borrow();
            if t.closes(&open) {
                break;
            }
            if t.id().is_some() {
                return Err(ParseError::at_tag(
                    ParseErrorCode::ComponentInRemoveRegion,
                    &t,
                    format!(
                        "Markup remove regions must not contain component tags: {}",
                        t.to_user_debug_string()
                    ),
                ));
            }
        }

        log::trace!(
            target: LOG_TARGET,
            "removed region starting at {}",
            open.borrow().to_user_debug_string()
        );
        open.borrow_mut().set_ignore();
        Ok(Some(open))
    }
}
