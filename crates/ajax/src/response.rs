//! Response sinks: the real HTTP response and the capture buffer swapped in
//! while a fragment is rendered.

use crate::error::AjaxError;
use indexmap::IndexMap;
use std::io;
use tools::cdata;

pub trait Response {
    fn write(&mut self, text: &str);
}

/// The HTTP side of a response.
pub trait WebResponse: Response {
    fn set_header(&mut self, name: &str, value: &str);
    fn set_content_type(&mut self, content_type: &str);
    fn set_character_encoding(&mut self, encoding: &str);
}

/// An in-memory [`WebResponse`], used when the caller hands the body to the
/// HTTP layer afterwards.
#[derive(Clone, Debug, Default)]
pub struct BufferedWebResponse {
    headers: IndexMap<String, String>,
    content_type: Option<String>,
    character_encoding: Option<String>,
    body: String,
}

impl BufferedWebResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn character_encoding(&self) -> Option<&str> {
        self.character_encoding.as_deref()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }
}

impl Response for BufferedWebResponse {
    fn write(&mut self, text: &str) {
        self.body.push_str(text);
    }
}

impl WebResponse for BufferedWebResponse {
    fn set_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    fn set_content_type(&mut self, content_type: &str) {
        self.content_type = Some(content_type.to_string());
    }

    fn set_character_encoding(&mut self, encoding: &str) {
        self.character_encoding = Some(encoding.to_string());
    }
}

/// Collects output destined for a CDATA section, encoding it on the way in.
///
/// One buffer is reused for every capture of a response; [`reset`] clears the
/// text and the encoded flag but keeps the allocation.
///
/// [`reset`]: CapturingResponse::reset
#[derive(Clone, Debug, Default)]
pub struct CapturingResponse {
    buffer: String,
    encoded: bool,
}

impl CapturingResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: String::with_capacity(capacity),
            encoded: false,
        }
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.encoded = false;
    }

    /// The captured text, already CDATA-safe.
    pub fn contents(&self) -> &str {
        &self.buffer
    }

    /// Whether any write needed the `wicket1` transform.
    pub fn is_contents_encoded(&self) -> bool {
        self.encoded
    }

    /// Binary output cannot be placed in the envelope.
    pub fn output_stream(&mut self) -> Result<&mut dyn io::Write, AjaxError> {
        Err(AjaxError::ProtocolMisuse(
            "cannot get an output stream on a capturing response; write text instead".to_string(),
        ))
    }
}

impl Response for CapturingResponse {
    fn write(&mut self, text: &str) {
        if cdata::push_encoded(&mut self.buffer, text) {
            self.encoded = true;
        }
    }
}
