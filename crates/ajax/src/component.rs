//! What the AJAX pipeline needs from the component tree.
//!
//! The tree itself lives elsewhere; components are shared handles so the
//! target, the page and listeners can all refer to the same instance.

use crate::error::AjaxError;
use crate::header_response::HeaderResponse;
use crate::request_cycle::RequestCycle;
use std::cell::RefCell;
use std::rc::Rc;

pub type ComponentRef = Rc<RefCell<dyn Component>>;
pub type PageRef = Rc<RefCell<dyn Page>>;

/// Components that refresh their state from feedback messages before render.
pub trait Feedback {
    fn update_feedback(&mut self);
}

pub trait Component {
    /// Id of the component within its parent.
    fn id(&self) -> &str;

    /// Id of the rendered DOM element.
    fn markup_id(&self) -> String;

    /// Whether the rendered element carries `id="<markup id>"`, which client
    /// script needs to find and replace it.
    fn output_markup_id(&self) -> bool;

    fn set_output_markup_id(&mut self, output: bool);

    fn page(&self) -> Option<PageRef>;

    fn is_page(&self) -> bool {
        false
    }

    fn is_visible(&self) -> bool {
        true
    }

    /// Render only the body, without the component's own tag.
    fn render_body_only(&self) -> bool {
        false
    }

    fn attach(&mut self) {}

    fn detach(&mut self) {}

    fn render_component(&mut self, cycle: &mut RequestCycle<'_>) -> Result<(), AjaxError>;

    fn render_head(&mut self, _response: &mut dyn HeaderResponse) -> Result<(), AjaxError> {
        Ok(())
    }

    /// Direct children; empty for components that are not containers.
    fn children(&self) -> Vec<ComponentRef> {
        Vec::new()
    }

    fn as_feedback(&mut self) -> Option<&mut dyn Feedback> {
        None
    }
}

pub trait Page {
    fn start_component_render(&mut self, _component: &ComponentRef) {}

    fn end_component_render(&mut self, _component: &ComponentRef) {}

    /// Releases per-request state.
    fn detach(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    Continue,
    ContinueButDontGoDeeper,
    Stop,
}

/// Depth-first, pre-order walk over the descendants of `parent`.
///
/// Returns [`Visit::Stop`] if the visitor stopped the walk.
pub fn visit_children<F>(parent: &ComponentRef, visitor: &mut F) -> Visit
where
    F: FnMut(&ComponentRef) -> Visit,
{
    let children = parent.borrow().children();
    for child in &children {
        match visitor(child) {
            Visit::Stop => return Visit::Stop,
            Visit::ContinueButDontGoDeeper => {}
            Visit::Continue => {
                if visit_children(child, visitor) == Visit::Stop {
                    return Visit::Stop;
                }
            }
        }
    }
    Visit::Continue
}
