use crate::component::{Component, ComponentRef, Feedback, Page, PageRef};
use crate::error::AjaxError;
use crate::header_response::HeaderResponse;
use crate::request_cycle::RequestCycle;
use crate::response::Response;
use std::cell::RefCell;
use std::rc::Rc;

pub(crate) type Log = Rc<RefCell<Vec<String>>>;

pub(crate) fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub(crate) fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

pub(crate) struct TestPage {
    log: Log,
}

pub(crate) fn page(log: &Log) -> PageRef {
    Rc::new(RefCell::new(TestPage { log: Rc::clone(log) }))
}

impl Page for TestPage {
    fn start_component_render(&mut self, component: &ComponentRef) {
        let id = component.borrow().id().to_string();
        self.log.borrow_mut().push(format!("start {id}"));
    }

    fn end_component_render(&mut self, component: &ComponentRef) {
        let id = component.borrow().id().to_string();
        self.log.borrow_mut().push(format!("end {id}"));
    }

    fn detach(&mut self) {
        self.log.borrow_mut().push("detach page".to_string());
    }
}

#[derive(Clone, Debug)]
pub(crate) enum Head {
    Css(String),
    DomReady(String),
    Load(String),
}

pub(crate) struct TestComponent {
    pub(crate) id: String,
    pub(crate) markup: String,
    pub(crate) output_markup_id: bool,
    pub(crate) visible: bool,
    pub(crate) body_only: bool,
    pub(crate) is_page: bool,
    pub(crate) feedback: bool,
    pub(crate) fail_render: bool,
    pub(crate) head: Vec<Head>,
    pub(crate) page: Option<PageRef>,
    pub(crate) children: Vec<ComponentRef>,
    log: Log,
}

impl TestComponent {
    pub(crate) fn new(id: &str, markup: &str, log: &Log) -> Self {
        Self {
            id: id.to_string(),
            markup: markup.to_string(),
            output_markup_id: true,
            visible: true,
            body_only: false,
            is_page: false,
            feedback: false,
            fail_render: false,
            head: Vec::new(),
            page: None,
            children: Vec::new(),
            log: Rc::clone(log),
        }
    }

    pub(crate) fn on_page(mut self, page: &PageRef) -> Self {
        self.page = Some(Rc::clone(page));
        self
    }

    pub(crate) fn with_head(mut self, head: Head) -> Self {
        self.head.push(head);
        self
    }

    pub(crate) fn with_child(mut self, child: ComponentRef) -> Self {
        self.children.push(child);
        self
    }

    pub(crate) fn into_ref(self) -> ComponentRef {
        Rc::new(RefCell::new(self))
    }

    fn record(&self, event: &str) {
        self.log.borrow_mut().push(format!("{event} {}", self.id));
    }
}

impl Component for TestComponent {
    fn id(&self) -> &str {
        &self.id
    }

    fn markup_id(&self) -> String {
        self.id.clone()
    }

    fn output_markup_id(&self) -> bool {
        self.output_markup_id
    }

    fn set_output_markup_id(&mut self, output: bool) {
        self.output_markup_id = output;
    }

    fn page(&self) -> Option<PageRef> {
        self.page.clone()
    }

    fn is_page(&self) -> bool {
        self.is_page
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn render_body_only(&self) -> bool {
        self.body_only
    }

    fn attach(&mut self) {
        self.record("attach");
    }

    fn detach(&mut self) {
        self.record("detach");
    }

    fn render_component(&mut self, cycle: &mut RequestCycle<'_>) -> Result<(), AjaxError> {
        self.record("render");
        cycle.write(&self.markup);
        if self.fail_render {
            return Err(AjaxError::Render(format!("{} failed", self.id)));
        }
        Ok(())
    }

    fn render_head(&mut self, response: &mut dyn HeaderResponse) -> Result<(), AjaxError> {
        for head in &self.head {
            match head {
                Head::Css(url) => response.render_css_reference(url, None)?,
                Head::DomReady(script) => response.render_on_dom_ready_javascript(script)?,
                Head::Load(script) => response.render_on_load_javascript(script)?,
            }
        }
        Ok(())
    }

    fn children(&self) -> Vec<ComponentRef> {
        self.children.clone()
    }

    fn as_feedback(&mut self) -> Option<&mut dyn Feedback> {
        if self.feedback {
            Some(self as &mut dyn Feedback)
        } else {
            None
        }
    }
}

impl Feedback for TestComponent {
    fn update_feedback(&mut self) {
        self.record("feedback");
    }
}
