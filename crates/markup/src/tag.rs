//! Component tags: one parsed start, end or self-closing tag.
//!
//! Tags flow through the filter chain as shared handles because balancing
//! links a close tag back to an open tag that has already been emitted
//! downstream, and may flag that open tag (`has_no_close_tag`) after the fact.
//!
//! Invariants:
//! - A close tag links to its open tag once balancing succeeds; an open-close
//!   tag links to itself.
//! - Back-references are weak; the assembled `Markup` (or the caller pulling
//!   the chain) owns the tags.
//! - `text` is the exact source slice of the tag; synthetic tags have none.

use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub type TagHandle = Rc<RefCell<ComponentTag>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagType {
    Open,
    Close,
    OpenClose,
}

/// Component binding of a tag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TagBinding {
    #[default]
    Unbound,
    Component(String),
    /// Excised from the markup together with everything up to its close tag.
    Ignored,
}

impl TagBinding {
    pub fn is_bound(&self) -> bool {
        !matches!(self, TagBinding::Unbound)
    }
}

#[derive(Debug)]
pub struct ComponentTag {
    name: String,
    namespace: Option<String>,
    attributes: IndexMap<String, String>,
    tag_type: TagType,
    pos: usize,
    length: usize,
    line: usize,
    column: usize,
    text: String,
    binding: TagBinding,
    open_tag: Option<Weak<RefCell<ComponentTag>>>,
    modified: bool,
    no_close_tag: bool,
    wicket_tag: bool,
}

impl ComponentTag {
    pub fn new(name: impl Into<String>, namespace: Option<String>, tag_type: TagType) -> Self {
        Self {
            name: name.into(),
            namespace,
            attributes: IndexMap::new(),
            tag_type,
            pos: 0,
            length: 0,
            line: 0,
            column: 0,
            text: String::new(),
            binding: TagBinding::Unbound,
            open_tag: None,
            modified: false,
            no_close_tag: false,
            wicket_tag: false,
        }
    }

    pub fn into_handle(self) -> TagHandle {
        Rc::new(RefCell::new(self))
    }

    pub(crate) fn set_source(&mut self, pos: usize, text: &str, line: usize, column: usize) {
        self.pos = pos;
        self.length = text.len();
        self.text = text.to_string();
        self.line = line;
        self.column = column;
    }

    /// Builds the close tag for `open`, positioned right after it.
    ///
    /// The result is marked modified so it is serialized even when unbound.
    pub fn synthetic_close(open: &TagHandle) -> TagHandle {
        let source = open.borrow();
        let mut close = ComponentTag::new(
            source.name.clone(),
            source.namespace.clone(),
            TagType::Close,
        );
        close.pos = source.pos + source.length;
        close.line = source.line;
        close.column = source.column;
        close.wicket_tag = source.wicket_tag;
        close.modified = true;
        close.open_tag = Some(Rc::downgrade(open));
        close.into_handle()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// `ns:name` for namespaced tags, `name` otherwise.
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}:{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Case-insensitive comparison of name and namespace.
    pub fn has_equal_name(&self, other: &ComponentTag) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && match (&self.namespace, &other.namespace) {
                (None, None) => true,
                (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
                _ => false,
            }
    }

    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Case-insensitive attribute lookup; returns the stored key and value.
    pub fn attribute_ignore_case(&self, key: &str) -> Option<(&str, &str)> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Inserts or replaces an attribute, returning the previous value.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.attributes.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.attributes.shift_remove(key)
    }

    pub fn tag_type(&self) -> TagType {
        self.tag_type
    }

    pub fn set_tag_type(&mut self, tag_type: TagType) {
        self.tag_type = tag_type;
    }

    pub fn is_open(&self) -> bool {
        self.tag_type == TagType::Open
    }

    pub fn is_close(&self) -> bool {
        self.tag_type == TagType::Close
    }

    pub fn is_open_close(&self) -> bool {
        self.tag_type == TagType::OpenClose
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn source_text(&self) -> &str {
        &self.text
    }

    pub fn binding(&self) -> &TagBinding {
        &self.binding
    }

    /// The bound component id, if any.
    pub fn id(&self) -> Option<&str> {
        match &self.binding {
            TagBinding::Component(id) => Some(id),
            _ => None,
        }
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.binding = TagBinding::Component(id.into());
    }

    pub fn set_ignore(&mut self) {
        self.binding = TagBinding::Ignored;
    }

    pub fn is_ignored(&self) -> bool {
        self.binding == TagBinding::Ignored
    }

    pub fn open_tag(&self) -> Option<TagHandle> {
        self.open_tag.as_ref().and_then(Weak::upgrade)
    }

    pub fn set_open_tag(&mut self, open: &TagHandle) {
        self.open_tag = Some(Rc::downgrade(open));
    }

    /// Whether this tag closes `open`.
    ///
    /// Uses the balancing link when present, otherwise falls back to a name
    /// comparison (chains without an HTML balancer).
    pub fn closes(&self, open: &TagHandle) -> bool {
        if !self.is_close() {
            return false;
        }
        match &self.open_tag {
            Some(link) => std::ptr::eq(link.as_ptr(), Rc::as_ptr(open)),
            None => self.has_equal_name(&open.borrow()),
        }
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    pub fn has_no_close_tag(&self) -> bool {
        self.no_close_tag
    }

    pub fn set_has_no_close_tag(&mut self, no_close_tag: bool) {
        self.no_close_tag = no_close_tag;
    }

    /// Whether the tag lives in the active framework namespace (`wicket:panel`, ...).
    pub fn is_wicket_tag(&self) -> bool {
        self.wicket_tag
    }

    pub fn set_wicket_tag(&mut self, wicket_tag: bool) {
        self.wicket_tag = wicket_tag;
    }

    /// Regenerates the tag from name, namespace and attributes.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::with_capacity(self.name.len() + 16 * (self.attributes.len() + 1));
        out.push('<');
        if self.is_close() {
            out.push('/');
        }
        if let Some(ns) = &self.namespace {
            out.push_str(ns);
            out.push(':');
        }
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            for ch in value.chars() {
                if ch == '"' {
                    out.push_str("&quot;");
                } else {
                    out.push(ch);
                }
            }
            out.push('"');
        }
        if self.is_open_close() {
            out.push('/');
        }
        out.push('>');
        out
    }

    /// Short description for error messages: `'<span wicket:id="x">' (line 3, column 5)`.
    pub fn to_user_debug_string(&self) -> String {
        format!(
            "'{}' (line {}, column {})",
            self,
            self.line,
            self.column
        )
    }
}

impl std::fmt::Display for ComponentTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modified || self.text.is_empty() {
            f.write_str(&self.to_xml_string())
        } else {
            f.write_str(&self.text)
        }
    }
}
