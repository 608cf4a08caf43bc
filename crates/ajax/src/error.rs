use std::fmt;

/// Failures of the AJAX response pipeline.
///
/// None of them is retried; each aborts the current response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AjaxError {
    /// A caller passed something the target cannot accept (a page, a
    /// component without a stable markup id, an empty markup id).
    InvalidArgument(String),
    /// The pipeline was driven out of order, e.g. a header-only call outside
    /// header rendering or a second `respond`.
    ProtocolMisuse(String),
    /// The component is not attached to a page.
    PageState(String),
    /// A component failed to render.
    Render(String),
}

impl AjaxError {
    pub fn message(&self) -> &str {
        match self {
            AjaxError::InvalidArgument(msg)
            | AjaxError::ProtocolMisuse(msg)
            | AjaxError::PageState(msg)
            | AjaxError::Render(msg) => msg,
        }
    }
}

impl fmt::Display for AjaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AjaxError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            AjaxError::ProtocolMisuse(msg) => write!(f, "protocol misuse: {msg}"),
            AjaxError::PageState(msg) => write!(f, "page state: {msg}"),
            AjaxError::Render(msg) => write!(f, "render failed: {msg}"),
        }
    }
}

impl std::error::Error for AjaxError {}
