//! The per-request output context.
//!
//! Components write through the cycle, which forwards to the innermost active
//! capture buffer or, when none is active, to the real response. Captures are
//! installed with [`RequestCycle::capture`] and removed when the returned
//! scope ends, on every exit path.

use crate::response::{CapturingResponse, Response, WebResponse};
use crate::settings::RequestCycleSettings;
use std::ops::{Deref, DerefMut};

pub struct RequestCycle<'r> {
    response: &'r mut dyn WebResponse,
    captures: Vec<CapturingResponse>,
    settings: RequestCycleSettings,
}

impl<'r> RequestCycle<'r> {
    pub fn new(response: &'r mut dyn WebResponse) -> Self {
        Self::with_settings(response, RequestCycleSettings::default())
    }

    pub fn with_settings(response: &'r mut dyn WebResponse, settings: RequestCycleSettings) -> Self {
        Self {
            response,
            captures: Vec::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &RequestCycleSettings {
        &self.settings
    }

    /// The real response, bypassing any active capture.
    pub fn web_response(&mut self) -> &mut dyn WebResponse {
        &mut *self.response
    }

    pub fn is_capturing(&self) -> bool {
        !self.captures.is_empty()
    }

    /// Routes output into `buffer` until the returned scope ends.
    pub fn capture(&mut self, buffer: CapturingResponse) -> CaptureScope<'_, 'r> {
        let depth = self.captures.len();
        self.captures.push(buffer);
        CaptureScope { cycle: self, depth }
    }
}

impl Response for RequestCycle<'_> {
    fn write(&mut self, text: &str) {
        match self.captures.last_mut() {
            Some(capture) => capture.write(text),
            None => self.response.write(text),
        }
    }
}

/// An active capture. Dereferences to the cycle so rendering continues
/// through it; dropping it restores the previous sink.
pub struct CaptureScope<'c, 'r> {
    cycle: &'c mut RequestCycle<'r>,
    depth: usize,
}

impl CaptureScope<'_, '_> {
    /// Ends the capture and hands back the filled buffer.
    pub fn finish(mut self) -> CapturingResponse {
        self.cycle.captures.truncate(self.depth + 1);
        self.cycle.captures.pop().unwrap_or_default()
    }
}

impl<'r> Deref for CaptureScope<'_, 'r> {
    type Target = RequestCycle<'r>;

    fn deref(&self) -> &Self::Target {
        &*self.cycle
    }
}

impl DerefMut for CaptureScope<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.cycle
    }
}

impl Drop for CaptureScope<'_, '_> {
    fn drop(&mut self) {
        self.cycle.captures.truncate(self.depth);
    }
}
