//! Head contributions: stylesheet and script references, inline scripts and
//! scripts to run once the document is ready or loaded.
//!
//! Two implementations exist. [`PageHeaderResponse`] writes straight into the
//! `<head>` of a full page render. [`AjaxHeaderResponse`] belongs to an
//! [`AjaxRequestTarget`](crate::AjaxRequestTarget): reference and inline
//! renders are only legal while the target is capturing a component's header
//! contribution, and DOM-ready / load scripts become append scripts of the
//! envelope.
//!
//! Every render is de-duplicated per response by a token describing what was
//! rendered.

use crate::error::AjaxError;
use crate::response::Response;
use std::collections::HashSet;
use tools::javascript;

const LOG_TARGET: &str = "ajax.header_response";

pub trait HeaderResponse {
    fn render_css_reference(&mut self, url: &str, media: Option<&str>) -> Result<(), AjaxError>;

    fn render_javascript_reference(&mut self, url: &str, id: Option<&str>) -> Result<(), AjaxError>;

    fn render_javascript(&mut self, script: &str, id: Option<&str>) -> Result<(), AjaxError>;

    /// Writes `text` into the head verbatim.
    fn render_string(&mut self, text: &str) -> Result<(), AjaxError>;

    fn render_on_dom_ready_javascript(&mut self, script: &str) -> Result<(), AjaxError>;

    fn render_on_load_javascript(&mut self, script: &str) -> Result<(), AjaxError>;

    /// Whether the contribution ends up in an AJAX envelope rather than a page.
    fn is_ajax(&self) -> bool;
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Token {
    CssReference { url: String, media: Option<String> },
    JavascriptReference { url: String, id: Option<String> },
    Javascript { script: String, id: Option<String> },
    Text(String),
    DomReady(String),
    Load(String),
}

impl Token {
    fn markup(&self) -> String {
        let mut out = String::new();
        match self {
            Token::CssReference { url, media } => {
                out.push_str("<link rel=\"stylesheet\" type=\"text/css\" href=\"");
                out.push_str(url);
                out.push('"');
                if let Some(media) = media {
                    out.push_str(" media=\"");
                    out.push_str(media);
                    out.push('"');
                }
                out.push_str(" />\n");
            }
            Token::JavascriptReference { url, id } => {
                out.push_str("<script type=\"text/javascript\" ");
                if let Some(id) = id {
                    out.push_str("id=\"");
                    out.push_str(id);
                    out.push_str("\" ");
                }
                out.push_str("src=\"");
                out.push_str(url);
                out.push_str("\"></script>\n");
            }
            Token::Javascript { script, id } => {
                javascript::write_javascript(&mut out, script, id.as_deref());
            }
            Token::Text(text) => out.push_str(text),
            Token::DomReady(script) => {
                javascript::write_javascript(&mut out, &window_event("domready", script), None);
            }
            Token::Load(script) => {
                javascript::write_javascript(&mut out, &window_event("load", script), None);
            }
        }
        out
    }
}

fn window_event(event: &str, script: &str) -> String {
    format!("Wicket.Event.add(window, \"{event}\", function(event) {{ {script};}});")
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum HeaderPhase {
    #[default]
    Idle,
    /// A component's header contribution is being captured.
    Rendering,
}

/// Header bookkeeping owned by the target for the whole response.
#[derive(Debug, Default)]
pub(crate) struct HeaderState {
    pub(crate) phase: HeaderPhase,
    rendered: HashSet<Token>,
}

impl HeaderState {
    /// Records `token`; false if it was already rendered.
    fn mark_rendered(&mut self, token: Token) -> bool {
        self.rendered.insert(token)
    }
}

/// The header response of an AJAX request.
///
/// Outside the header rendering phase it has no sink, and only
/// [`render_on_dom_ready_javascript`] and [`render_on_load_javascript`] are
/// accepted.
///
/// [`render_on_dom_ready_javascript`]: HeaderResponse::render_on_dom_ready_javascript
/// [`render_on_load_javascript`]: HeaderResponse::render_on_load_javascript
pub struct AjaxHeaderResponse<'a> {
    state: &'a mut HeaderState,
    append_javascripts: &'a mut Vec<String>,
    sink: Option<&'a mut dyn Response>,
}

impl<'a> AjaxHeaderResponse<'a> {
    pub(crate) fn new(
        state: &'a mut HeaderState,
        append_javascripts: &'a mut Vec<String>,
        sink: Option<&'a mut dyn Response>,
    ) -> Self {
        Self {
            state,
            append_javascripts,
            sink,
        }
    }

    fn render_restricted(&mut self, token: Token) -> Result<(), AjaxError> {
        let sink = match (self.state.phase, self.sink.as_deref_mut()) {
            (HeaderPhase::Rendering, Some(sink)) => sink,
            _ => {
                return Err(AjaxError::ProtocolMisuse(
                    "Only methods that can be called on a header response outside render_head are \
                     render_on_load_javascript and render_on_dom_ready_javascript"
                        .to_string(),
                ));
            }
        };
        let markup = token.markup();
        if self.state.mark_rendered(token) {
            sink.write(&markup);
        }
        Ok(())
    }
}

impl HeaderResponse for AjaxHeaderResponse<'_> {
    fn render_css_reference(&mut self, url: &str, media: Option<&str>) -> Result<(), AjaxError> {
        self.render_restricted(Token::CssReference {
            url: url.to_string(),
            media: media.map(str::to_string),
        })
    }

    fn render_javascript_reference(&mut self, url: &str, id: Option<&str>) -> Result<(), AjaxError> {
        self.render_restricted(Token::JavascriptReference {
            url: url.to_string(),
            id: id.map(str::to_string),
        })
    }

    fn render_javascript(&mut self, script: &str, id: Option<&str>) -> Result<(), AjaxError> {
        self.render_restricted(Token::Javascript {
            script: script.to_string(),
            id: id.map(str::to_string),
        })
    }

    fn render_string(&mut self, text: &str) -> Result<(), AjaxError> {
        self.render_restricted(Token::Text(text.to_string()))
    }

    fn render_on_dom_ready_javascript(&mut self, script: &str) -> Result<(), AjaxError> {
        if self.state.mark_rendered(Token::DomReady(script.to_string())) {
            // first script to run after the components are replaced
            self.append_javascripts.insert(0, script.to_string());
        } else {
            log::trace!(target: LOG_TARGET, "dom-ready script already queued");
        }
        Ok(())
    }

    fn render_on_load_javascript(&mut self, script: &str) -> Result<(), AjaxError> {
        if self.state.mark_rendered(Token::Load(script.to_string())) {
            self.append_javascripts.push(script.to_string());
        } else {
            log::trace!(target: LOG_TARGET, "load script already queued");
        }
        Ok(())
    }

    fn is_ajax(&self) -> bool {
        true
    }
}

/// Head contributions of a full page render, written directly to `out`.
pub struct PageHeaderResponse<'a> {
    out: &'a mut dyn Response,
    rendered: HashSet<Token>,
}

impl<'a> PageHeaderResponse<'a> {
    pub fn new(out: &'a mut dyn Response) -> Self {
        Self {
            out,
            rendered: HashSet::new(),
        }
    }

    fn render(&mut self, token: Token) -> Result<(), AjaxError> {
        let markup = token.markup();
        if self.rendered.insert(token) {
            self.out.write(&markup);
        }
        Ok(())
    }
}

impl HeaderResponse for PageHeaderResponse<'_> {
    fn render_css_reference(&mut self, url: &str, media: Option<&str>) -> Result<(), AjaxError> {
        self.render(Token::CssReference {
            url: url.to_string(),
            media: media.map(str::to_string),
        })
    }

    fn render_javascript_reference(&mut self, url: &str, id: Option<&str>) -> Result<(), AjaxError> {
        self.render(Token::JavascriptReference {
            url: url.to_string(),
            id: id.map(str::to_string),
        })
    }

    fn render_javascript(&mut self, script: &str, id: Option<&str>) -> Result<(), AjaxError> {
        self.render(Token::Javascript {
            script: script.to_string(),
            id: id.map(str::to_string),
        })
    }

    fn render_string(&mut self, text: &str) -> Result<(), AjaxError> {
        self.render(Token::Text(text.to_string()))
    }

    fn render_on_dom_ready_javascript(&mut self, script: &str) -> Result<(), AjaxError> {
        self.render(Token::DomReady(script.to_string()))
    }

    fn render_on_load_javascript(&mut self, script: &str) -> Result<(), AjaxError> {
        self.render(Token::Load(script.to_string()))
    }

    fn is_ajax(&self) -> bool {
        false
    }
}
