//! Forward-only markup tokenizer at the root of the filter chain.
//!
//! Only tags are produced. Text, comments, CDATA sections, declarations and
//! the bodies of `<script>`/`<style>` are skipped; consumers slice them out of
//! the input using tag positions and the context cursor.
//!
//! Tag names are ASCII `[A-Za-z0-9:_.-]`, optionally prefixed by a namespace
//! (`wicket:panel`). Attribute values may be double-quoted, single-quoted,
//! unquoted or missing; quotes are stripped and values trimmed.
//!
//! Known limitations:
//! - A `<` followed by ASCII whitespace is treated as text; any other `<`
//!   starts a tag and must be closed by a `>` outside quotes.
//! - Raw-text close-tag scanning accepts only ASCII whitespace before `>`
//!   (see `find_rawtext_close_tag`).

use crate::error::{ParseError, ParseErrorCode};
use crate::filter::{MarkupFilter, MarkupParseContext};
use crate::tag::{ComponentTag, TagHandle, TagType};
use memchr::{memchr, memchr_iter, memmem};
use std::rc::Rc;

const LOG_TARGET: &str = "markup.xml_pull_parser";

const COMMENT_START: &[u8] = b"<!--";
const COMMENT_END: &[u8] = b"-->";
const CDATA_START: &[u8] = b"<![CDATA[";
const CDATA_END: &[u8] = b"]]>";
const CONDITIONAL_COMMENT_END: &[u8] = b"]-->";

// only matched at an ASCII '<', which never occurs inside a UTF-8 sequence
const SCRIPT_CLOSE_TAG: &[u8] = b"</script";
const STYLE_CLOSE_TAG: &[u8] = b"</style";

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack.len() >= start + needle.len()
        && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

fn find_from(haystack: &[u8], start: usize, needle: &[u8]) -> Option<usize> {
    if start > haystack.len() {
        return None;
    }
    memmem::find(&haystack[start..], needle).map(|rel| start + rel)
}

/// Returns the offset of the `<` starting the raw-text close tag.
fn find_rawtext_close_tag(haystack: &[u8], from: usize, close_tag: &[u8]) -> Option<usize> {
    let len = haystack.len();
    let n = close_tag.len();
    debug_assert!(close_tag.eq_ignore_ascii_case(SCRIPT_CLOSE_TAG) || close_tag.eq_ignore_ascii_case(STYLE_CLOSE_TAG));
    let mut i = from;
    while i + n <= len {
        let rel = memchr(b'<', &haystack[i..])?;
        i += rel;
        if i + n > len {
            return None;
        }
        if haystack[i + 1] == b'/' && starts_with_ignore_ascii_case_at(haystack, i, close_tag) {
            let mut k = i + n;
            while k < len && haystack[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < len && haystack[k] == b'>' {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

/// Index of the first `>` at or after `from` that is not inside a quoted value.
fn find_close_bracket_out_of_quotes(bytes: &[u8], from: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate().skip(from) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(i),
            None => {}
        }
    }
    None
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b':' | b'_' | b'-' | b'.')
}

pub struct XmlPullParser {
    input: Rc<str>,
    pos: usize,
    ctx: Rc<MarkupParseContext>,
    rawtext_close: Option<&'static [u8]>,
    rawtext_open: usize,
    line: usize,
    line_start: usize,
    counted_to: usize,
}

impl XmlPullParser {
    pub fn new(input: impl Into<Rc<str>>, ctx: Rc<MarkupParseContext>) -> Self {
        Self {
            input: input.into(),
            pos: 0,
            ctx,
            rawtext_close: None,
            rawtext_open: 0,
            line: 1,
            line_start: 0,
            counted_to: 0,
        }
    }

    /// Decodes `bytes` as UTF-8, replacing invalid sequences.
    pub fn from_bytes(bytes: &[u8], ctx: Rc<MarkupParseContext>) -> Self {
        Self::new(String::from_utf8_lossy(bytes).into_owned(), ctx)
    }

    pub fn input(&self) -> &Rc<str> {
        &self.input
    }

    /// Byte offset of the next unread character.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn line_and_column(&mut self, at: usize) -> (usize, usize) {
        let at = at.min(self.input.len());
        if at > self.counted_to {
            let bytes = &self.input.as_bytes()[self.counted_to..at];
            for nl in memchr_iter(b'\n', bytes) {
                self.line += 1;
                self.line_start = self.counted_to + nl + 1;
            }
            self.counted_to = at;
        }
        (self.line, at.saturating_sub(self.line_start) + 1)
    }

    fn error(&mut self, code: ParseErrorCode, at: usize, message: impl Into<String>) -> ParseError {
        let (line, column) = self.line_and_column(at);
        ParseError::new(code, at, message).with_line(line, column)
    }

    fn advance(&mut self, to: usize) {
        self.pos = to;
        self.ctx.set_cursor(to);
    }

    fn skip_rawtext(&mut self, close_tag: &'static [u8]) -> Result<(), ParseError> {
        let input = Rc::clone(&self.input);
        match find_rawtext_close_tag(input.as_bytes(), self.pos, close_tag) {
            Some(start) => {
                log::trace!(
                    target: LOG_TARGET,
                    "skipped raw text {}..{}",
                    self.pos,
                    start
                );
                self.advance(start);
                Ok(())
            }
            None => {
                let name = String::from_utf8_lossy(&close_tag[2..]).into_owned();
                let at = self.rawtext_open;
                Err(self.error(
                    ParseErrorCode::UnclosedRawText,
                    at,
                    format!("<{name}> tag not closed"),
                ))
            }
        }
    }

    /// Skips `<!...>` constructs starting at `open`.
    fn skip_declaration(&mut self, open: usize) -> Result<(), ParseError> {
        let input = Rc::clone(&self.input);
        let bytes = input.as_bytes();

        if bytes[open..].starts_with(COMMENT_START) {
            let Some(close) = memchr(b'>', &bytes[open..]).map(|rel| open + rel) else {
                return Err(self.error(
                    ParseErrorCode::UnclosedComment,
                    open,
                    "Unclosed comment",
                ));
            };
            let tag_text = &bytes[open + 1..close];

            // `<!--<![endif]-->` and friends close a conditional comment
            if memmem::find(tag_text, b"![endif]--").is_some() {
                self.advance(close + 1);
                return Ok(());
            }

            // `<!--[if IE]>`: the guarded section stays markup
            if tag_text.starts_with(b"!--[if ") && tag_text.ends_with(b"]") {
                if find_from(bytes, open + 1, CONDITIONAL_COMMENT_END).is_none() {
                    return Err(self.error(
                        ParseErrorCode::UnclosedComment,
                        open,
                        "Unclosed conditional comment",
                    ));
                }
                log::trace!(target: LOG_TARGET, "conditional comment at {open}");
                self.advance(close + 1);
                return Ok(());
            }

            // a comment may contain '>', so search for the terminator itself
            let Some(end) = find_from(bytes, open + 2, COMMENT_END) else {
                return Err(self.error(
                    ParseErrorCode::UnclosedComment,
                    open,
                    "Unclosed comment",
                ));
            };
            self.advance(end + COMMENT_END.len());
            return Ok(());
        }

        if starts_with_ignore_ascii_case_at(bytes, open, CDATA_START) {
            let Some(end) = find_from(bytes, open + CDATA_START.len(), CDATA_END) else {
                return Err(self.error(
                    ParseErrorCode::UnclosedCdata,
                    open,
                    "Unclosed CDATA section",
                ));
            };
            self.advance(end + CDATA_END.len());
            return Ok(());
        }

        // `<![endif]-->`, `<!DOCTYPE ...>` and other declarations
        match memchr(b'>', &bytes[open..]) {
            Some(rel) => {
                self.advance(open + rel + 1);
                Ok(())
            }
            None => Err(self.error(
                ParseErrorCode::MalformedTag,
                open,
                "No matching close bracket",
            )),
        }
    }

    /// Skips `<?...?>`, recording the XML declaration and its encoding.
    fn processing_instruction(&mut self, open: usize) -> Result<(), ParseError> {
        let input = Rc::clone(&self.input);
        let bytes = input.as_bytes();
        let end = match find_from(bytes, open, b"?>") {
            Some(end) => end + 2,
            None => match memchr(b'>', &bytes[open..]) {
                Some(rel) => open + rel + 1,
                None => {
                    return Err(self.error(
                        ParseErrorCode::MalformedTag,
                        open,
                        "No matching close bracket",
                    ));
                }
            },
        };
        let text = &input[open..end];

        if starts_with_ignore_ascii_case_at(bytes, open, b"<?xml")
            && bytes.get(open + 5).is_some_and(u8::is_ascii_whitespace)
        {
            let inner_end = if text.ends_with("?>") { text.len() - 2 } else { text.len() - 1 };
            let mut declaration = ComponentTag::new("xml", None, TagType::Open);
            self.parse_attributes(&mut declaration, &text[5..inner_end], open + 5)?;
            if let Some((_, encoding)) = declaration.attribute_ignore_case("encoding") {
                if !encoding.eq_ignore_ascii_case("utf-8") && !encoding.eq_ignore_ascii_case("utf8") {
                    log::warn!(
                        target: LOG_TARGET,
                        "markup declares encoding {encoding:?}; input is decoded as UTF-8"
                    );
                }
                self.ctx.set_encoding(encoding.to_string());
            }
            self.ctx.set_xml_declaration(text.to_string());
        }

        self.advance(end);
        Ok(())
    }

    fn parse_attributes(
        &mut self,
        tag: &mut ComponentTag,
        text: &str,
        base: usize,
    ) -> Result<(), ParseError> {
        let bytes = text.as_bytes();
        let len = bytes.len();
        let mut i = 0;
        loop {
            while i < len && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= len {
                return Ok(());
            }

            let key_start = i;
            while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'=' {
                if matches!(bytes[i], b'"' | b'\'' | b'<') {
                    return Err(self.error(
                        ParseErrorCode::MalformedTag,
                        base + i,
                        "Malformed tag: unexpected character in attribute name",
                    ));
                }
                i += 1;
            }
            let key = &text[key_start..i];
            if key.is_empty() {
                return Err(self.error(
                    ParseErrorCode::MalformedTag,
                    base + i,
                    "Malformed tag: attribute without name",
                ));
            }

            let mut j = i;
            while j < len && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            let value = if j < len && bytes[j] == b'=' {
                j += 1;
                while j < len && bytes[j].is_ascii_whitespace() {
                    j += 1;
                }
                if j >= len {
                    return Err(self.error(
                        ParseErrorCode::MalformedTag,
                        base + j,
                        format!("Malformed tag: attribute '{key}' has no value"),
                    ));
                }
                match bytes[j] {
                    quote @ (b'"' | b'\'') => {
                        let Some(rel) = memchr(quote, &bytes[j + 1..]) else {
                            return Err(self.error(
                                ParseErrorCode::MalformedTag,
                                base + j,
                                format!("Malformed tag: unterminated value of attribute '{key}'"),
                            ));
                        };
                        let value = &text[j + 1..j + 1 + rel];
                        i = j + rel + 2;
                        value
                    }
                    _ => {
                        let start = j;
                        while j < len && !bytes[j].is_ascii_whitespace() {
                            j += 1;
                        }
                        i = j;
                        &text[start..j]
                    }
                }
            } else {
                ""
            };

            if tag.put(key, value.trim()).is_some() {
                return Err(self.error(
                    ParseErrorCode::DuplicateAttribute,
                    base + key_start,
                    format!("Duplicate attribute '{key}' in tag <{}>", tag.qualified_name()),
                ));
            }
        }
    }

    fn read_tag(&mut self, open: usize) -> Result<TagHandle, ParseError> {
        let input = Rc::clone(&self.input);
        let bytes = input.as_bytes();

        let Some(close) = find_close_bracket_out_of_quotes(bytes, open + 1) else {
            return Err(self.error(
                ParseErrorCode::MalformedTag,
                open,
                "No matching close bracket",
            ));
        };
        let text = &input[open..=close];
        let mut inner = &input[open + 1..close];
        let mut inner_start = open + 1;
        if inner.is_empty() {
            return Err(self.error(ParseErrorCode::EmptyTag, open, "Found empty tag: '<>'"));
        }

        let tag_type = if let Some(stripped) = inner.strip_suffix('/') {
            inner = stripped;
            TagType::OpenClose
        } else if let Some(stripped) = inner.strip_prefix('/') {
            inner = stripped;
            inner_start += 1;
            TagType::Close
        } else {
            TagType::Open
        };

        let name_len = inner.bytes().take_while(|&b| is_name_byte(b)).count();
        let qualified = &inner[..name_len];
        let well_formed = qualified
            .bytes()
            .next()
            .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_')
            && inner[name_len..]
                .bytes()
                .next()
                .is_none_or(|b| b.is_ascii_whitespace());
        let (namespace, name) = match qualified.split_once(':') {
            Some((ns, name)) => (Some(ns), name),
            None => (None, qualified),
        };
        if !well_formed || name.is_empty() || namespace.is_some_and(str::is_empty) {
            return Err(self.error(
                ParseErrorCode::MalformedTag,
                open,
                format!("Malformed tag '{text}'"),
            ));
        }

        let (line, column) = self.line_and_column(open);
        let mut tag = ComponentTag::new(name, namespace.map(str::to_string), tag_type);
        tag.set_source(open, text, line, column);
        self.parse_attributes(&mut tag, &inner[name_len..], inner_start + name_len)?;

        if tag_type == TagType::Open && namespace.is_none() {
            if name.eq_ignore_ascii_case("script") {
                // other script types are templates that may contain markup
                let javascript = tag
                    .attribute_ignore_case("type")
                    .is_none_or(|(_, ty)| ty.to_ascii_lowercase().starts_with("text/javascript"));
                if javascript {
                    self.rawtext_close = Some(SCRIPT_CLOSE_TAG);
                }
            } else if name.eq_ignore_ascii_case("style") {
                self.rawtext_close = Some(STYLE_CLOSE_TAG);
            }
            self.rawtext_open = open;
        }

        log::trace!(
            target: LOG_TARGET,
            "tag {:?} {} at {open} (line {line}, column {column})",
            tag_type,
            tag.qualified_name()
        );
        self.advance(close + 1);
        Ok(tag.into_handle())
    }
}

impl MarkupFilter for XmlPullParser {
    fn next_tag(&mut self) -> Result<Option<TagHandle>, ParseError> {
        let input = Rc::clone(&self.input);
        let bytes = input.as_bytes();
        loop {
            if let Some(close_tag) = self.rawtext_close.take() {
                self.skip_rawtext(close_tag)?;
            }
            let Some(open) = memchr(b'<', &bytes[self.pos.min(bytes.len())..]).map(|rel| self.pos + rel) else {
                self.advance(bytes.len());
                return Ok(None);
            };
            match bytes.get(open + 1).copied() {
                Some(b'!') => self.skip_declaration(open)?,
                Some(b'?') => self.processing_instruction(open)?,
                Some(b'>') => {
                    return Err(self.error(ParseErrorCode::EmptyTag, open, "Found empty tag: '<>'"));
                }
                Some(b) if b.is_ascii_whitespace() => self.pos = open + 1,
                _ => return self.read_tag(open).map(Some),
            }
        }
    }
}
