//! Assembled markup: raw text spans interleaved with component tags.

use crate::tag::TagHandle;
use std::fmt;
use std::ops::Range;

/// A span of markup no component binds to, kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawMarkup {
    text: String,
}

impl RawMarkup {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for RawMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Clone, Debug)]
pub enum MarkupElement {
    Raw(RawMarkup),
    Tag(TagHandle),
}

impl MarkupElement {
    pub fn as_tag(&self) -> Option<&TagHandle> {
        match self {
            MarkupElement::Tag(tag) => Some(tag),
            MarkupElement::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            MarkupElement::Raw(raw) => Some(raw.as_str()),
            MarkupElement::Tag(_) => None,
        }
    }
}

impl fmt::Display for MarkupElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkupElement::Raw(raw) => f.write_str(raw.as_str()),
            MarkupElement::Tag(tag) => write!(f, "{}", tag.borrow()),
        }
    }
}

#[derive(Debug)]
pub struct Markup {
    elements: Vec<MarkupElement>,
    wicket_namespace: String,
    encoding: String,
    xml_declaration: Option<String>,
}

impl Markup {
    pub(crate) fn new(
        elements: Vec<MarkupElement>,
        wicket_namespace: String,
        encoding: String,
        xml_declaration: Option<String>,
    ) -> Self {
        Self {
            elements,
            wicket_namespace,
            encoding,
            xml_declaration,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MarkupElement> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MarkupElement> {
        self.elements.iter()
    }

    pub fn elements(&self) -> &[MarkupElement] {
        &self.elements
    }

    /// Namespace prefix in effect at the end of the parse.
    pub fn wicket_namespace(&self) -> &str {
        &self.wicket_namespace
    }

    /// Encoding named by the XML declaration, or the configured default.
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn xml_declaration(&self) -> Option<&str> {
        self.xml_declaration.as_deref()
    }

    /// Index of the open (or open-close) tag bound to `component_id`.
    pub fn find_tag(&self, component_id: &str) -> Option<usize> {
        self.elements.iter().position(|element| {
            element.as_tag().is_some_and(|tag| {
                let t = tag.borrow();
                !t.is_close() && t.id() == Some(component_id)
            })
        })
    }

    /// Elements from the component's open tag through its matching close tag.
    pub fn fragment(&self, component_id: &str) -> Option<MarkupFragment<'_>> {
        let start = self.find_tag(component_id)?;
        let open = self.elements[start].as_tag()?;
        let single = {
            let t = open.borrow();
            t.is_open_close() || t.has_no_close_tag()
        };
        let end = if single {
            start + 1
        } else {
            self.elements[start + 1..]
                .iter()
                .position(|element| element.as_tag().is_some_and(|tag| tag.borrow().closes(open)))
                .map_or(start + 1, |rel| start + rel + 2)
        };
        Some(MarkupFragment {
            markup: self,
            range: start..end,
        })
    }
}

impl<'a> IntoIterator for &'a Markup {
    type Item = &'a MarkupElement;
    type IntoIter = std::slice::Iter<'a, MarkupElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.elements {
            write!(f, "{element}")?;
        }
        Ok(())
    }
}

/// A contiguous slice of a [`Markup`], typically one component's markup.
#[derive(Clone, Debug)]
pub struct MarkupFragment<'a> {
    markup: &'a Markup,
    range: Range<usize>,
}

impl<'a> MarkupFragment<'a> {
    pub fn elements(&self) -> &'a [MarkupElement] {
        &self.markup.elements[self.range.clone()]
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Index of the first element within the whole markup.
    pub fn start(&self) -> usize {
        self.range.start
    }

    pub fn tag(&self) -> Option<&'a TagHandle> {
        self.elements().first().and_then(MarkupElement::as_tag)
    }
}

impl fmt::Display for MarkupFragment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in self.elements() {
            write!(f, "{element}")?;
        }
        Ok(())
    }
}
