//! Drives the filter chain and assembles a [`Markup`].
//!
//! A tag becomes a structured element when it is bound to a component or
//! closes a bound tag. Everything else stays raw text, sliced straight from
//! the input; unbound tags rewritten by a filter are re-serialized instead.
//! Ignored tags are dropped together with everything the chain consumed for
//! them.

use crate::error::ParseError;
use crate::filter::{
    BoxedFilter, HtmlHandler, MarkupFilter, MarkupParseContext, PrependContextPathHandler,
    TagTypeHandler, WicketNamespaceHandler, WicketRemoveTagHandler, WicketTagIdentifier,
};
use crate::markup::{Markup, MarkupElement, RawMarkup};
use crate::settings::MarkupSettings;
use crate::xml_pull_parser::XmlPullParser;
use std::rc::Rc;

const LOG_TARGET: &str = "markup.parser";

type FilterFactory = Box<dyn FnOnce(BoxedFilter, &Rc<MarkupParseContext>) -> BoxedFilter>;

pub struct MarkupParser {
    input: Rc<str>,
    settings: MarkupSettings,
    extra_filters: Vec<FilterFactory>,
}

impl MarkupParser {
    pub fn new(input: impl Into<Rc<str>>) -> Self {
        Self::with_settings(input, MarkupSettings::default())
    }

    pub fn with_settings(input: impl Into<Rc<str>>, settings: MarkupSettings) -> Self {
        Self {
            input: input.into(),
            settings,
            extra_filters: Vec::new(),
        }
    }

    /// Decodes `bytes` as UTF-8, replacing invalid sequences.
    pub fn from_bytes(bytes: &[u8], settings: MarkupSettings) -> Self {
        Self::with_settings(String::from_utf8_lossy(bytes).into_owned(), settings)
    }

    pub fn settings(&self) -> &MarkupSettings {
        &self.settings
    }

    /// Namespace prefix assumed until the document declares its own.
    pub fn set_wicket_namespace(&mut self, namespace: &str) {
        self.settings.wicket_namespace = namespace.to_string();
    }

    /// Inserts a filter after the namespace handler and ahead of the
    /// context-path rewriter. Filters run in the order they were appended.
    pub fn append_filter<F>(&mut self, factory: F)
    where
        F: FnOnce(BoxedFilter, &Rc<MarkupParseContext>) -> BoxedFilter + 'static,
    {
        self.extra_filters.push(Box::new(factory));
    }

    fn build_chain(&mut self, ctx: &Rc<MarkupParseContext>) -> BoxedFilter {
        let mut chain: BoxedFilter = Box::new(XmlPullParser::new(Rc::clone(&self.input), Rc::clone(ctx)));
        chain = Box::new(WicketTagIdentifier::new(chain, Rc::clone(ctx)));
        chain = Box::new(TagTypeHandler::new(chain));
        chain = Box::new(HtmlHandler::new(chain));
        chain = Box::new(WicketRemoveTagHandler::new(chain));
        chain = Box::new(WicketNamespaceHandler::new(
            chain,
            Rc::clone(ctx),
            self.settings.strip_wicket_tags,
        ));
        for factory in self.extra_filters.drain(..) {
            chain = factory(chain, ctx);
        }
        Box::new(PrependContextPathHandler::new(
            chain,
            self.settings.normalized_context_path(),
        ))
    }

    pub fn parse(mut self) -> Result<Markup, ParseError> {
        let ctx = Rc::new(MarkupParseContext::new(&self.settings.wicket_namespace));
        let mut chain = self.build_chain(&ctx);
        let input = Rc::clone(&self.input);

        let mut assembler = Assembler {
            settings: &self.settings,
            elements: Vec::new(),
            pending: String::new(),
        };
        let mut marker = 0;

        while let Some(tag) = chain.next_tag()? {
            let t = tag.borrow();
            let pos = t.pos().max(marker);

            if t.is_ignored() {
                assembler.push_text(&input[marker..pos]);
                assembler.flush();
                marker = ctx.cursor().max(marker);
                continue;
            }

            // a close tag is bound only through a live, bound open tag
            let bound = if t.is_close() {
                t.open_tag()
                    .is_some_and(|open| open.borrow().id().is_some())
            } else {
                t.id().is_some()
            };

            if bound {
                assembler.push_text(&input[marker..pos]);
                assembler.flush();
                assembler.elements.push(MarkupElement::Tag(tag.clone()));
                marker = (t.pos() + t.length()).max(marker);
            } else if t.is_modified() {
                assembler.push_text(&input[marker..pos]);
                assembler.flush();
                assembler.push_text(&t.to_xml_string());
                assembler.flush();
                marker = (t.pos() + t.length()).max(marker);
            }
        }
        assembler.push_text(&input[marker.min(input.len())..]);
        assembler.flush();

        let elements = assembler.elements;
        log::debug!(
            target: LOG_TARGET,
            "parsed {} bytes into {} markup elements",
            input.len(),
            elements.len()
        );
        Ok(Markup::new(
            elements,
            ctx.wicket_namespace(),
            ctx.encoding()
                .unwrap_or_else(|| self.settings.default_markup_encoding.clone()),
            ctx.xml_declaration(),
        ))
    }
}

struct Assembler<'s> {
    settings: &'s MarkupSettings,
    elements: Vec<MarkupElement>,
    pending: String,
}

impl Assembler<'_> {
    fn push_text(&mut self, text: &str) {
        self.pending.push_str(text);
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let mut text = std::mem::take(&mut self.pending);
        if self.settings.strip_comments {
            text = strip_comments(&text);
        }
        if self.settings.compress_whitespace {
            text = compress_whitespace(&text);
        }
        if !text.is_empty() {
            self.elements.push(MarkupElement::Raw(RawMarkup::new(text)));
        }
    }
}

/// Removes `<!-- ... -->` comments; conditional comments are kept.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("<!--") {
        out.push_str(&rest[..start]);
        let comment_start = &rest[start..];
        let Some(end) = comment_start[4..].find("-->").map(|rel| rel + 7) else {
            out.push_str(comment_start);
            return out;
        };
        let comment = &comment_start[..end];
        if comment.starts_with("<!--[if ") || comment.contains("[endif]") {
            out.push_str(comment);
        }
        rest = &comment_start[end..];
    }
    out.push_str(rest);
    out
}

/// Collapses whitespace runs to one space, or one newline when the run spans
/// a line break. `<pre>` blocks are copied unchanged.
fn compress_whitespace(text: &str) -> String {
    let lower = text.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while let Some(rel) = lower[i..].find("<pre") {
        let start = i + rel;
        compress_into(&mut out, &text[i..start]);
        let end = lower[start..]
            .find("</pre>")
            .map_or(text.len(), |rel| start + rel + "</pre>".len());
        out.push_str(&text[start..end]);
        i = end;
    }
    compress_into(&mut out, &text[i..]);
    out
}

fn compress_into(out: &mut String, text: &str) {
    // Some(true) while inside a run that contains a line break
    let mut run: Option<bool> = None;
    for ch in text.chars() {
        if matches!(ch, ' ' | '\t' | '\r' | '\n') {
            let newline = matches!(ch, '\r' | '\n');
            run = Some(run.is_some_and(|seen| seen) || newline);
        } else {
            if let Some(newline) = run.take() {
                out.push(if newline { '\n' } else { ' ' });
            }
            out.push(ch);
        }
    }
    if let Some(newline) = run {
        out.push(if newline { '\n' } else { ' ' });
    }
}
