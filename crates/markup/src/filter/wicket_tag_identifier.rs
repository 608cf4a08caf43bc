//! Binds tags to component ids.
//!
//! A tag carrying `<ns>:id` is bound to that id. Tags in the active framework
//! namespace are flagged as framework tags and, unless they carry an explicit
//! id, bound to an automatic id `_<ns>_<name>`. A close tag never binds
//! through its own attributes; it follows the open tag it closes.

use super::registry::is_well_known_wicket_tag;
use super::{BoxedFilter, MarkupFilter, MarkupParseContext};
use crate::error::{ParseError, ParseErrorCode};
use crate::tag::TagHandle;
use std::rc::Rc;

const LOG_TARGET: &str = "markup.wicket_tag_identifier";

pub struct WicketTagIdentifier {
    parent: BoxedFilter,
    ctx: Rc<MarkupParseContext>,
}

impl WicketTagIdentifier {
    pub fn new(parent: BoxedFilter, ctx: Rc<MarkupParseContext>) -> Self {
        Self { parent, ctx }
    }
}

impl MarkupFilter for WicketTagIdentifier {
    fn next_tag(&mut self) -> Result<Option<TagHandle>, ParseError> {
        let Some(tag) = self.parent.next_tag()? else {
            return Ok(None);
        };

        let namespace = self.ctx.wicket_namespace();
        let mut t = tag.borrow_mut();

        let id_attribute = format!("{namespace}:id");
        let explicit_id = if t.is_close() {
            None
        } else {
            t.attribute_ignore_case(&id_attribute)
                .map(|(_, value)| value.to_string())
        };
        if let Some(id) = explicit_id {
            if id.trim().is_empty() {
                return Err(ParseError::at_tag(
                    ParseErrorCode::EmptyComponentId,
                    &t,
                    format!(
                        "The {id_attribute} attribute value must not be empty. May be unmatched quotes?!? {}",
                        t.to_user_debug_string()
                    ),
                ));
            }
            t.set_id(id);
        }

        if self.ctx.is_wicket_namespace(t.namespace()) {
            t.set_wicket_tag(true);
            if !is_well_known_wicket_tag(t.name()) {
                log::warn!(
                    target: LOG_TARGET,
                    "unknown tag name with wicket namespace: {}",
                    t.to_user_debug_string()
                );
            }
            if t.id().is_none() {
                let id = format!("_{namespace}_{}", t.name());
                t.set_id(id);
            }
        }

        if let Some(id) = t.id() {
            log::trace!(target: LOG_TARGET, "{} bound to {id:?}", t.qualified_name());
        }
        drop(t);
        Ok(Some(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::test_util::{context, drain, tokenizer};

    fn identified(input: &str, namespace: &str) -> Result<Vec<TagHandle>, ParseError> {
        let ctx = context();
        ctx.set_wicket_namespace(namespace);
        let mut filter = WicketTagIdentifier::new(tokenizer(input, &ctx), Rc::clone(&ctx));
        drain(&mut filter)
    }

    #[test]
    fn id_attribute_binds_the_tag() {
        let tags = identified("<span wicket:id=\"label\">x</span><b>", "wicket").expect("parse");
        assert_eq!(tags[0].borrow().id(), Some("label"));
        assert!(!tags[0].borrow().is_wicket_tag());
        assert_eq!(tags[1].borrow().id(), None);
        assert_eq!(tags[2].borrow().id(), None);
    }

    #[test]
    fn framework_tags_get_automatic_ids() {
        let tags = identified("<wicket:panel></wicket:panel><wicket:container wicket:id=\"c\"/>", "wicket")
            .expect("parse");
        assert!(tags[0].borrow().is_wicket_tag());
        assert_eq!(tags[0].borrow().id(), Some("_wicket_panel"));
        assert_eq!(tags[1].borrow().id(), Some("_wicket_panel"));
        assert_eq!(tags[2].borrow().id(), Some("c"));
    }

    #[test]
    fn namespace_follows_the_context() {
        let tags = identified("<wcn:xxx wcn:id=\"a\"></wcn:xxx><wicket:panel/>", "wcn").expect("parse");
        assert_eq!(tags[0].borrow().id(), Some("a"));
        assert!(tags[1].borrow().is_wicket_tag());
        assert_eq!(tags[2].borrow().id(), None);
    }

    #[test]
    fn id_attribute_on_close_tag_is_not_binding() {
        let tags = identified("<span></span wicket:id=\"x\">", "wicket").expect("parse");
        assert!(tags[1].borrow().is_close());
        assert_eq!(tags[1].borrow().id(), None);
    }

    #[test]
    fn empty_id_is_rejected() {
        let err = identified("<p>\n<span wicket:id=\" \"/>", "wicket").expect_err("empty id");
        assert_eq!(err.code, ParseErrorCode::EmptyComponentId);
        assert_eq!(err.line, 2);
    }
}
