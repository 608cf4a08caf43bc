//! Client-side polling driven by AJAX callbacks.
//!
//! The timer script schedules exactly one callback. Every callback therefore
//! has to queue the script again, or polling stops after the first round
//! trip. A full page render contributes it as a load script instead.

use crate::component::{Component, ComponentRef};
use crate::error::AjaxError;
use crate::header_response::HeaderResponse;
use crate::target::AjaxRequestTarget;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tools::javascript::escape_quotes;

const LOG_TARGET: &str = "ajax.timer";

/// Server side of an AJAX callback attached to a component.
pub trait AjaxBehavior {
    /// Contributes to the head of the host component's render.
    fn render_head(&mut self, response: &mut dyn HeaderResponse) -> Result<(), AjaxError>;

    /// Handles the callback request.
    fn respond(&mut self, target: &mut AjaxRequestTarget) -> Result<(), AjaxError>;
}

type TimerHandler = Box<dyn FnMut(&mut AjaxRequestTarget) -> Result<(), AjaxError>>;

pub struct AjaxTimerBehavior {
    callback_url: String,
    interval: Duration,
    stopped: bool,
    on_timer: TimerHandler,
}

impl AjaxTimerBehavior {
    pub fn new<F>(callback_url: impl Into<String>, interval: Duration, on_timer: F) -> Self
    where
        F: FnMut(&mut AjaxRequestTarget) -> Result<(), AjaxError> + 'static,
    {
        Self {
            callback_url: callback_url.into(),
            interval,
            stopped: false,
            on_timer: Box::new(on_timer),
        }
    }

    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// No further callbacks are scheduled after the current one.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn timeout_script(&self) -> String {
        // the url sits in a single-quoted literal inside a double-quoted one
        format!(
            "setTimeout(\"wicketAjaxGet('{}', function() {{ }}, function() {{ }});\", {});",
            escape_quotes(&escape_quotes(&self.callback_url)),
            self.interval.as_millis()
        )
    }
}

impl AjaxBehavior for AjaxTimerBehavior {
    fn render_head(&mut self, response: &mut dyn HeaderResponse) -> Result<(), AjaxError> {
        // an AJAX render already has the script queued by `respond`
        if self.stopped || response.is_ajax() {
            return Ok(());
        }
        response.render_on_load_javascript(&self.timeout_script())
    }

    fn respond(&mut self, target: &mut AjaxRequestTarget) -> Result<(), AjaxError> {
        (self.on_timer)(target)?;
        if self.stopped {
            log::debug!(target: LOG_TARGET, "timer for {} stopped", self.callback_url);
            return Ok(());
        }
        let script = self.timeout_script();
        target.header_response().render_on_load_javascript(&script)
    }
}

/// Re-renders its host component on every tick.
pub struct AjaxSelfUpdatingTimerBehavior {
    timer: AjaxTimerBehavior,
    host: Weak<RefCell<dyn Component>>,
}

impl AjaxSelfUpdatingTimerBehavior {
    pub fn new(host: &ComponentRef, callback_url: impl Into<String>, interval: Duration) -> Self {
        Self {
            timer: AjaxTimerBehavior::new(callback_url, interval, |_| Ok(())),
            host: Rc::downgrade(host),
        }
    }

    pub fn timer(&self) -> &AjaxTimerBehavior {
        &self.timer
    }

    pub fn stop(&mut self) {
        self.timer.stop();
    }
}

impl AjaxBehavior for AjaxSelfUpdatingTimerBehavior {
    fn render_head(&mut self, response: &mut dyn HeaderResponse) -> Result<(), AjaxError> {
        self.timer.render_head(response)
    }

    fn respond(&mut self, target: &mut AjaxRequestTarget) -> Result<(), AjaxError> {
        match self.host.upgrade() {
            Some(host) => target.add_component(&host)?,
            None => log::trace!(target: LOG_TARGET, "host of {} is gone", self.timer.callback_url),
        }
        self.timer.respond(target)
    }
}
