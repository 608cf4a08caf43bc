//! Before/after hooks around [`AjaxRequestTarget::respond`].
//!
//! [`AjaxRequestTarget::respond`]: crate::AjaxRequestTarget::respond

use crate::envelope;
use crate::error::AjaxError;
use crate::response::Response;
use crate::target::{AjaxRequestTarget, ComponentMap};

/// Callbacks around envelope rendering.
///
/// `on_before_respond` runs before anything but the prolog is written and may
/// still add components and scripts. `on_after_respond` runs once every
/// component has been written; it only gets a script sink.
pub trait AjaxListener {
    fn on_before_respond(
        &self,
        _components: &ComponentMap,
        _target: &mut AjaxRequestTarget,
    ) -> Result<(), AjaxError> {
        Ok(())
    }

    fn on_after_respond(
        &self,
        _components: &ComponentMap,
        _response: &mut dyn JavascriptResponse,
    ) -> Result<(), AjaxError> {
        Ok(())
    }
}

pub trait JavascriptResponse {
    fn add_javascript(&mut self, script: &str);
}

/// Writes each script as an `<evaluate>` element as soon as it is added.
pub(crate) struct EvaluateSink<'a> {
    out: &'a mut dyn Response,
    written: usize,
}

impl<'a> EvaluateSink<'a> {
    pub(crate) fn new(out: &'a mut dyn Response) -> Self {
        Self { out, written: 0 }
    }

    pub(crate) fn written(&self) -> usize {
        self.written
    }
}

impl JavascriptResponse for EvaluateSink<'_> {
    fn add_javascript(&mut self, script: &str) {
        envelope::write_evaluate(&mut *self.out, script);
        self.written += 1;
    }
}
