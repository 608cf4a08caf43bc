//! Parse errors for the markup pipeline.
//!
//! Every error is fatal for the parse that raised it; there is no partially
//! parsed markup.

use crate::tag::ComponentTag;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseErrorCode {
    MalformedTag,
    EmptyTag,
    UnclosedComment,
    UnclosedCdata,
    UnclosedRawText,
    DuplicateAttribute,
    MismatchedCloseTag,
    UnmatchedCloseTag,
    UnclosedTag,
    RemoveRegionWithoutBody,
    UnterminatedRemoveRegion,
    ComponentInRemoveRegion,
    EmptyComponentId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub code: ParseErrorCode,
    /// Byte offset into the source document.
    pub position: usize,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(code: ParseErrorCode, position: usize, message: impl Into<String>) -> Self {
        Self {
            code,
            position,
            line: 0,
            column: 0,
            message: message.into(),
        }
    }

    pub(crate) fn at_tag(code: ParseErrorCode, tag: &ComponentTag, message: impl Into<String>) -> Self {
        Self {
            code,
            position: tag.pos(),
            line: tag.line(),
            column: tag.column(),
            message: message.into(),
        }
    }

    pub(crate) fn with_line(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line > 0 {
            write!(
                f,
                "{} (line {}, column {}, offset {})",
                self.message, self.line, self.column, self.position
            )
        } else {
            write!(f, "{} (offset {})", self.message, self.position)
        }
    }
}

impl std::error::Error for ParseError {}
