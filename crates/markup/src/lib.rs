//! Markup parsing for component templates.
//!
//! Raw HTML is tokenized by [`XmlPullParser`] and pulled through a chain of
//! [`MarkupFilter`]s that identify framework tags, balance open/close tags,
//! expand tags that must carry a body, excise designer-preview regions and
//! rewrite relative URLs. [`MarkupParser`] drives the chain and assembles the
//! resulting [`Markup`]: raw text spans interleaved with the component tags
//! the component tree binds to.

mod error;
pub mod filter;
mod markup;
mod parser;
mod settings;
mod tag;
mod xml_pull_parser;

pub use crate::error::{ParseError, ParseErrorCode};
pub use crate::filter::{BoxedFilter, MarkupFilter, MarkupParseContext};
pub use crate::markup::{Markup, MarkupElement, MarkupFragment, RawMarkup};
pub use crate::parser::MarkupParser;
pub use crate::settings::{MarkupSettings, WICKET_NAMESPACE_URI};
pub use crate::tag::{ComponentTag, TagBinding, TagHandle, TagType};
pub use crate::xml_pull_parser::XmlPullParser;
