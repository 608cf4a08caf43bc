//! The request-scoped collector behind an AJAX partial update.
//!
//! Invariants:
//! - Components render in the insertion order of their markup ids; re-adding
//!   an id replaces the component in place.
//! - Prepend scripts precede every component, append scripts follow every
//!   component and every after-respond listener script.
//! - `respond` writes at most one envelope per target.
//! - The cycle's response is restored after every capture, including when a
//!   render fails.

use crate::component::{Component, ComponentRef, PageRef, Visit, visit_children};
use crate::envelope;
use crate::error::AjaxError;
use crate::header_response::{AjaxHeaderResponse, HeaderPhase, HeaderResponse, HeaderState};
use crate::listener::{AjaxListener, EvaluateSink};
use crate::request_cycle::RequestCycle;
use crate::response::{CapturingResponse, Response};
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;
use tools::javascript::escape_quotes;

const LOG_TARGET: &str = "ajax.target";

const EXPIRES_IN_THE_PAST: &str = "Mon, 26 Jul 1997 05:00:00 GMT";

/// Markup id to component, in insertion order.
pub type ComponentMap = IndexMap<String, ComponentRef>;

pub struct AjaxRequestTarget {
    components: ComponentMap,
    prepend_javascripts: Vec<String>,
    append_javascripts: Vec<String>,
    listeners: Vec<Rc<dyn AjaxListener>>,
    header_state: HeaderState,
    body_buffer: CapturingResponse,
    header_buffer: CapturingResponse,
    responded: bool,
}

impl Default for AjaxRequestTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl AjaxRequestTarget {
    pub fn new() -> Self {
        Self {
            components: ComponentMap::new(),
            prepend_javascripts: Vec::new(),
            append_javascripts: Vec::new(),
            listeners: Vec::new(),
            header_state: HeaderState::default(),
            body_buffer: CapturingResponse::with_capacity(4096),
            header_buffer: CapturingResponse::with_capacity(4096),
            responded: false,
        }
    }

    /// Schedules `component` for re-rendering under its own markup id.
    ///
    /// The component must emit its markup id, otherwise the client has no
    /// element to replace.
    pub fn add_component(&mut self, component: &ComponentRef) -> Result<(), AjaxError> {
        let markup_id = checked_markup_id(component)?;
        self.add_component_with_markup_id(component, &markup_id)
    }

    /// Schedules `component` for re-rendering into the element `markup_id`.
    pub fn add_component_with_markup_id(
        &mut self,
        component: &ComponentRef,
        markup_id: &str,
    ) -> Result<(), AjaxError> {
        if markup_id.is_empty() {
            return Err(AjaxError::InvalidArgument(
                "markup id of a component added to an AJAX target must not be empty".to_string(),
            ));
        }
        if component.borrow().is_page() {
            return Err(AjaxError::InvalidArgument(
                "a page cannot be added to an AJAX target; use a full page request instead"
                    .to_string(),
            ));
        }
        if self
            .components
            .insert(markup_id.to_string(), Rc::clone(component))
            .is_some()
        {
            log::trace!(target: LOG_TARGET, "replaced component for markup id {markup_id}");
        }
        Ok(())
    }

    pub fn add_components(&mut self, components: &[ComponentRef]) -> Result<(), AjaxError> {
        components.iter().try_for_each(|component| self.add_component(component))
    }

    /// Queues a script to run after the components are replaced.
    pub fn append_javascript(&mut self, script: impl Into<String>) {
        self.append_javascripts.push(script.into());
    }

    /// Queues a script to run before the components are replaced.
    pub fn prepend_javascript(&mut self, script: impl Into<String>) {
        self.prepend_javascripts.push(script.into());
    }

    /// Registers `listener`; registering the same instance again does nothing.
    pub fn add_listener(&mut self, listener: Rc<dyn AjaxListener>) {
        let known = self
            .listeners
            .iter()
            .any(|existing| std::ptr::addr_eq(Rc::as_ptr(existing), Rc::as_ptr(&listener)));
        if !known {
            self.listeners.push(listener);
        }
    }

    /// Moves the browser focus to `component`, or clears it for `None`.
    pub fn focus_component(&mut self, component: Option<&ComponentRef>) -> Result<(), AjaxError> {
        let target = match component {
            Some(component) => format!("'{}'", escape_quotes(&checked_markup_id(component)?)),
            None => "null".to_string(),
        };
        self.append_javascript(format!("Wicket.Focus.setFocusOnId({target});"));
        Ok(())
    }

    /// Header response usable while the target is being built. Only DOM-ready
    /// and load scripts are accepted outside header rendering.
    pub fn header_response(&mut self) -> AjaxHeaderResponse<'_> {
        AjaxHeaderResponse::new(&mut self.header_state, &mut self.append_javascripts, None)
    }

    pub fn components(&self) -> &ComponentMap {
        &self.components
    }

    pub fn prepend_javascripts(&self) -> &[String] {
        &self.prepend_javascripts
    }

    pub fn append_javascripts(&self) -> &[String] {
        &self.append_javascripts
    }

    pub fn is_responded(&self) -> bool {
        self.responded
    }

    /// Writes the envelope for everything collected so far.
    ///
    /// May be called once; a second call fails without writing anything.
    pub fn respond(&mut self, cycle: &mut RequestCycle<'_>) -> Result<(), AjaxError> {
        if self.responded {
            return Err(AjaxError::ProtocolMisuse(
                "respond may only be called once per AJAX request target".to_string(),
            ));
        }
        self.responded = true;
        let result = self.respond_envelope(cycle);
        if let Err(err) = &result {
            log::error!(target: LOG_TARGET, "AJAX response aborted: {err}");
        }
        result
    }

    /// Releases per-request state of the page the components belong to.
    pub fn detach(&self) {
        let page: Option<PageRef> = self
            .components
            .values()
            .next()
            .and_then(|component| component.borrow().page());
        if let Some(page) = page {
            page.borrow_mut().detach();
        }
    }

    fn respond_envelope(&mut self, cycle: &mut RequestCycle<'_>) -> Result<(), AjaxError> {
        let encoding = cycle.settings().response_request_encoding.clone();
        {
            let web = cycle.web_response();
            web.set_content_type(&format!("text/xml; charset={encoding}"));
            web.set_character_encoding(&encoding);
            web.set_header("Expires", EXPIRES_IN_THE_PAST);
            web.set_header("Cache-Control", "no-cache, must-revalidate");
            web.set_header("Pragma", "no-cache");
        }
        envelope::write_prolog(&mut *cycle, &encoding);

        let listeners = self.listeners.clone();
        for listener in &listeners {
            let components = self.components.clone();
            listener.on_before_respond(&components, self)?;
        }

        for script in &self.prepend_javascripts {
            envelope::write_evaluate(&mut *cycle, script);
        }

        self.respond_components(cycle)?;

        let mut listener_scripts = 0;
        let listeners = self.listeners.clone();
        if !listeners.is_empty() {
            let components = self.components.clone();
            let mut sink = EvaluateSink::new(&mut *cycle);
            for listener in &listeners {
                listener.on_after_respond(&components, &mut sink)?;
            }
            listener_scripts = sink.written();
        }

        for script in &self.append_javascripts {
            envelope::write_evaluate(&mut *cycle, script);
        }
        envelope::write_epilog(&mut *cycle);

        log::debug!(
            target: LOG_TARGET,
            "responded with {} components, {} prepend, {} listener and {} append scripts",
            self.components.len(),
            self.prepend_javascripts.len(),
            listener_scripts,
            self.append_javascripts.len()
        );
        Ok(())
    }

    fn respond_components(&mut self, cycle: &mut RequestCycle<'_>) -> Result<(), AjaxError> {
        let components: Vec<(String, ComponentRef)> = self
            .components
            .iter()
            .map(|(markup_id, component)| (markup_id.clone(), Rc::clone(component)))
            .collect();

        for (_, component) in &components {
            with_feedback(component, &mut |feedback| {
                if let Some(feedback) = feedback.as_feedback() {
                    feedback.update_feedback();
                }
            });
        }
        // feedback components are not attached by their containers
        for (_, component) in &components {
            with_feedback(component, &mut |feedback| {
                if feedback.as_feedback().is_some() {
                    feedback.attach();
                }
            });
        }
        for (_, component) in &components {
            component.borrow_mut().attach();
        }

        for (markup_id, component) in &components {
            self.respond_component(cycle, markup_id, component)?;
        }
        Ok(())
    }

    fn respond_component(
        &mut self,
        cycle: &mut RequestCycle<'_>,
        markup_id: &str,
        component: &ComponentRef,
    ) -> Result<(), AjaxError> {
        let page = {
            let mut c = component.borrow_mut();
            if c.render_body_only() {
                return Err(AjaxError::ProtocolMisuse(format!(
                    "component '{}' renders its body only and cannot be updated through an AJAX target",
                    c.id()
                )));
            }
            c.set_output_markup_id(true);
            c.page()
        };
        let page = page.ok_or_else(|| {
            AjaxError::PageState(format!(
                "component '{markup_id}' is not associated with a page"
            ))
        })?;

        let mut body = std::mem::take(&mut self.body_buffer);
        body.reset();
        let mut scope = cycle.capture(body);
        page.borrow_mut().start_component_render(component);
        let rendered = component.borrow_mut().render_component(&mut scope);
        let head = match rendered {
            Ok(()) => self.capture_header_contribution(&mut scope, component),
            Err(err) => Err(err),
        };
        page.borrow_mut().end_component_render(component);
        let head = head?;
        let body = scope.finish();

        envelope::write_component(&mut *cycle, markup_id, &body);
        envelope::write_header_contribution(&mut *cycle, &head);
        log::trace!(
            target: LOG_TARGET,
            "rendered {markup_id}: {} bytes body, {} bytes head",
            body.contents().len(),
            head.contents().len()
        );
        self.body_buffer = body;
        self.header_buffer = head;
        Ok(())
    }

    fn capture_header_contribution(
        &mut self,
        cycle: &mut RequestCycle<'_>,
        component: &ComponentRef,
    ) -> Result<CapturingResponse, AjaxError> {
        let mut head = std::mem::take(&mut self.header_buffer);
        head.reset();
        let mut scope = cycle.capture(head);
        self.header_state.phase = HeaderPhase::Rendering;
        let rendered = {
            let sink: &mut dyn Response = &mut *scope;
            let mut response = AjaxHeaderResponse::new(
                &mut self.header_state,
                &mut self.append_javascripts,
                Some(sink),
            );
            render_heads(component, &mut response)
        };
        self.header_state.phase = HeaderPhase::Idle;
        rendered?;
        Ok(scope.finish())
    }
}

fn checked_markup_id(component: &ComponentRef) -> Result<String, AjaxError> {
    let c = component.borrow();
    if c.is_page() {
        return Err(AjaxError::InvalidArgument(
            "a page cannot be added to an AJAX target; use a full page request instead".to_string(),
        ));
    }
    if !c.output_markup_id() {
        return Err(AjaxError::InvalidArgument(format!(
            "cannot update component '{}' because it does not output its markup id; \
             call set_output_markup_id(true) first",
            c.id()
        )));
    }
    Ok(c.markup_id())
}

/// Runs `f` on the component and every descendant of it.
fn with_feedback(component: &ComponentRef, f: &mut dyn FnMut(&mut dyn Component)) {
    visit_children(component, &mut |child| {
        f(&mut *child.borrow_mut());
        Visit::Continue
    });
    f(&mut *component.borrow_mut());
}

/// Head contributions of `component` and its visible descendants. An
/// invisible descendant hides its whole subtree.
fn render_heads(component: &ComponentRef, response: &mut dyn HeaderResponse) -> Result<(), AjaxError> {
    component.borrow_mut().render_head(response)?;
    let mut result = Ok(());
    visit_children(component, &mut |child| {
        let mut child = child.borrow_mut();
        if !child.is_visible() {
            return Visit::ContinueButDontGoDeeper;
        }
        match child.render_head(response) {
            Ok(()) => Visit::Continue,
            Err(err) => {
                result = Err(err);
                Visit::Stop
            }
        }
    });
    result
}

impl fmt::Display for AjaxRequestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self.components.keys().map(String::as_str).collect();
        write!(
            f,
            "[AjaxRequestTarget markup ids [{}], prepend javascript [{}], append javascript [{}]]",
            ids.join(", "),
            self.prepend_javascripts.join(", "),
            self.append_javascripts.join(", ")
        )
    }
}

#[cfg(test)]
mod tests;
