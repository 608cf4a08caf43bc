//! Detects the framework namespace prefix declared on `<html>`.
//!
//! `<html xmlns:wicket="http://wicket.apache.org">` (or an empty value)
//! makes `wicket` the prefix used for the rest of the document. Only the first
//! `<html>` open tag is inspected.

use super::{BoxedFilter, MarkupFilter, MarkupParseContext};
use crate::error::ParseError;
use crate::settings::WICKET_NAMESPACE_URI;
use crate::tag::TagHandle;
use std::rc::Rc;

const LOG_TARGET: &str = "markup.wicket_namespace_handler";
const XMLNS: &str = "xmlns:";

pub struct WicketNamespaceHandler {
    parent: BoxedFilter,
    ctx: Rc<MarkupParseContext>,
    strip_declaration: bool,
    html_seen: bool,
}

impl WicketNamespaceHandler {
    pub fn new(parent: BoxedFilter, ctx: Rc<MarkupParseContext>, strip_declaration: bool) -> Self {
        Self {
            parent,
            ctx,
            strip_declaration,
            html_seen: false,
        }
    }
}

impl MarkupFilter for WicketNamespaceHandler {
    fn next_tag(&mut self) -> Result<Option<TagHandle>, ParseError> {
        let Some(tag) = self.parent.next_tag()? else {
            return Ok(None);
        };
        if self.html_seen {
            return Ok(Some(tag));
        }

        let mut t = tag.borrow_mut();
        if !t.is_open() || t.namespace().is_some() || !t.name().eq_ignore_ascii_case("html") {
            drop(t);
            return Ok(Some(tag));
        }
        self.html_seen = true;

        let declaration = t.attributes().iter().find_map(|(key, value)| {
            let prefix = key.get(..XMLNS.len())?;
            let declares = prefix.eq_ignore_ascii_case(XMLNS)
                && (value.is_empty() || value.starts_with(WICKET_NAMESPACE_URI));
            declares.then(|| (key.clone(), key[XMLNS.len()..].to_string()))
        });

        if let Some((key, namespace)) = declaration {
            log::trace!(target: LOG_TARGET, "wicket namespace: {namespace}");
            self.ctx.declare_namespace(&namespace);
            if self.strip_declaration {
                t.remove(&key);
                t.set_modified(true);
            }
        }
        drop(t);
        Ok(Some(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::test_util::{context, drain, names, tokenizer};

    fn run(input: &str, strip: bool) -> (Rc<MarkupParseContext>, Vec<TagHandle>) {
        let ctx = context();
        let mut handler = WicketNamespaceHandler::new(tokenizer(input, &ctx), Rc::clone(&ctx), strip);
        let tags = drain(&mut handler).expect("parse");
        (ctx, tags)
    }

    #[test]
    fn declared_prefix_becomes_active() {
        let (ctx, tags) = run(
            "<html xmlns=\"http://www.w3.org/1999/xhtml\" xmlns:wcn=\"http://wicket.apache.org/dtds.data/wicket-xhtml1.4-strict.dtd\"></html>",
            false,
        );
        assert_eq!(ctx.wicket_namespace(), "wcn");
        assert!(ctx.namespace_declared());
        assert!(!tags[0].borrow().is_modified());
    }

    #[test]
    fn empty_value_declares_too() {
        let (ctx, _) = run("<html xmlns:w=\"\"></html>", false);
        assert_eq!(ctx.wicket_namespace(), "w");
    }

    #[test]
    fn foreign_namespaces_are_ignored() {
        let (ctx, _) = run("<html xmlns:svg=\"http://www.w3.org/2000/svg\"></html>", false);
        assert_eq!(ctx.wicket_namespace(), "wicket");
        assert!(!ctx.namespace_declared());
    }

    #[test]
    fn only_the_first_html_tag_counts() {
        let (ctx, _) = run("<html></html><html xmlns:late=\"\"></html>", false);
        assert_eq!(ctx.wicket_namespace(), "wicket");
    }

    #[test]
    fn declaration_is_stripped_when_configured() {
        let (_, tags) = run("<html lang=\"en\" xmlns:wicket=\"http://wicket.apache.org\"></html>", true);
        assert!(tags[0].borrow().is_modified());
        assert_eq!(names(&tags), vec!["<html lang=\"en\">", "</html>"]);
    }
}
