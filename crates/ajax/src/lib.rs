//! Partial page updates over AJAX.
//!
//! An [`AjaxRequestTarget`] collects components to re-render and scripts to
//! evaluate while a request is processed, then writes them as one XML
//! envelope:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?><ajax-response>
//!   <evaluate><![CDATA[ prepend script ]]></evaluate>
//!   <component id="markupId"><![CDATA[ rendered markup ]]></component>
//!   <header-contribution><![CDATA[<head ...> ... </head>]]></header-contribution>
//!   <evaluate><![CDATA[ listener and append scripts ]]></evaluate>
//! </ajax-response>
//! ```
//!
//! CDATA bodies are encoded with [`tools::cdata`] whenever they contain `]`,
//! and the enclosing element then carries `encoding="wicket1"`.

mod component;
mod envelope;
mod error;
mod header_response;
mod listener;
mod request_cycle;
mod response;
mod settings;
mod target;
#[cfg(test)]
mod test_util;
mod timer;

pub use crate::component::{Component, ComponentRef, Feedback, Page, PageRef, Visit, visit_children};
pub use crate::error::AjaxError;
pub use crate::header_response::{AjaxHeaderResponse, HeaderResponse, PageHeaderResponse};
pub use crate::listener::{AjaxListener, JavascriptResponse};
pub use crate::request_cycle::{CaptureScope, RequestCycle};
pub use crate::response::{BufferedWebResponse, CapturingResponse, Response, WebResponse};
pub use crate::settings::RequestCycleSettings;
pub use crate::target::{AjaxRequestTarget, ComponentMap};
pub use crate::timer::{AjaxBehavior, AjaxSelfUpdatingTimerBehavior, AjaxTimerBehavior};
