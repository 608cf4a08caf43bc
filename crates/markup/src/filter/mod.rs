//! The markup filter chain.
//!
//! Each filter pulls tags from its parent, inspects or rewrites them, and
//! hands them on. The chain is a lazy, single-pass, forward-only producer;
//! restarting means parsing again from the tokenizer.
//!
//! Default order, from tokenizer to consumer:
//! `XmlPullParser -> WicketTagIdentifier -> TagTypeHandler -> HtmlHandler ->
//! WicketRemoveTagHandler -> WicketNamespaceHandler -> PrependContextPathHandler`.

use crate::error::ParseError;
use crate::tag::TagHandle;
use std::cell::{Cell, RefCell};

mod html_handler;
mod prepend_context_path_handler;
pub mod registry;
mod tag_type_handler;
mod wicket_namespace_handler;
mod wicket_remove_tag_handler;
mod wicket_tag_identifier;

pub use html_handler::HtmlHandler;
pub use prepend_context_path_handler::PrependContextPathHandler;
pub use tag_type_handler::TagTypeHandler;
pub use wicket_namespace_handler::WicketNamespaceHandler;
pub use wicket_remove_tag_handler::WicketRemoveTagHandler;
pub use wicket_tag_identifier::WicketTagIdentifier;

pub trait MarkupFilter {
    /// Returns the next tag, or `Ok(None)` once the stream is exhausted.
    fn next_tag(&mut self) -> Result<Option<TagHandle>, ParseError>;
}

pub type BoxedFilter = Box<dyn MarkupFilter>;

/// Per-document state shared by the tokenizer, the filters and the parser.
///
/// Created fresh for every parse.
#[derive(Debug)]
pub struct MarkupParseContext {
    wicket_namespace: RefCell<String>,
    namespace_declared: Cell<bool>,
    cursor: Cell<usize>,
    encoding: RefCell<Option<String>>,
    xml_declaration: RefCell<Option<String>>,
}

impl MarkupParseContext {
    pub fn new(wicket_namespace: &str) -> Self {
        Self {
            wicket_namespace: RefCell::new(wicket_namespace.to_string()),
            namespace_declared: Cell::new(false),
            cursor: Cell::new(0),
            encoding: RefCell::new(None),
            xml_declaration: RefCell::new(None),
        }
    }

    pub fn wicket_namespace(&self) -> String {
        self.wicket_namespace.borrow().clone()
    }

    pub fn is_wicket_namespace(&self, namespace: Option<&str>) -> bool {
        namespace.is_some_and(|ns| ns.eq_ignore_ascii_case(&self.wicket_namespace.borrow()))
    }

    pub fn set_wicket_namespace(&self, namespace: &str) {
        *self.wicket_namespace.borrow_mut() = namespace.to_string();
    }

    /// Whether the document declared its own namespace prefix.
    pub fn namespace_declared(&self) -> bool {
        self.namespace_declared.get()
    }

    pub(crate) fn declare_namespace(&self, namespace: &str) {
        self.set_wicket_namespace(namespace);
        self.namespace_declared.set(true);
    }

    /// Byte offset just past the last element the tokenizer consumed.
    pub fn cursor(&self) -> usize {
        self.cursor.get()
    }

    pub(crate) fn set_cursor(&self, pos: usize) {
        self.cursor.set(pos);
    }

    pub fn encoding(&self) -> Option<String> {
        self.encoding.borrow().clone()
    }

    pub(crate) fn set_encoding(&self, encoding: String) {
        *self.encoding.borrow_mut() = Some(encoding);
    }

    pub fn xml_declaration(&self) -> Option<String> {
        self.xml_declaration.borrow().clone()
    }

    pub(crate) fn set_xml_declaration(&self, declaration: String) {
        *self.xml_declaration.borrow_mut() = Some(declaration);
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use crate::xml_pull_parser::XmlPullParser;
    use std::rc::Rc;

    pub(crate) fn context() -> Rc<MarkupParseContext> {
        Rc::new(MarkupParseContext::new("wicket"))
    }

    pub(crate) fn tokenizer(input: &str, ctx: &Rc<MarkupParseContext>) -> BoxedFilter {
        Box::new(XmlPullParser::new(input, Rc::clone(ctx)))
    }

    pub(crate) fn drain(filter: &mut dyn MarkupFilter) -> Result<Vec<TagHandle>, ParseError> {
        let mut out = Vec::new();
        while let Some(tag) = filter.next_tag()? {
            out.push(tag);
        }
        Ok(out)
    }

    pub(crate) fn names(tags: &[TagHandle]) -> Vec<String> {
        tags.iter().map(|t| t.borrow().to_string()).collect()
    }
}
