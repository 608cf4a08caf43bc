use super::*;
use crate::listener::JavascriptResponse;
use crate::response::BufferedWebResponse;
use crate::settings::RequestCycleSettings;
use crate::test_util::{Head, TestComponent, entries, log, page};
use std::cell::RefCell;

const PROLOG: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?><ajax-response>";

fn respond(target: &mut AjaxRequestTarget) -> (Result<(), AjaxError>, BufferedWebResponse) {
    let mut response = BufferedWebResponse::new();
    let result = {
        let mut cycle = RequestCycle::new(&mut response);
        let result = target.respond(&mut cycle);
        assert!(!cycle.is_capturing(), "response must be restored");
        result
    };
    (result, response)
}

#[test]
fn envelope_orders_prepend_components_append() {
    let log = log();
    let page = page(&log);
    let a = TestComponent::new("a", "<div id=\"a\">A</div>", &log).on_page(&page).into_ref();
    let b = TestComponent::new("b", "<div id=\"b\">B</div>", &log).on_page(&page).into_ref();

    let mut target = AjaxRequestTarget::new();
    target.append_javascript("S();");
    target.add_component(&a).unwrap();
    target.prepend_javascript("P();");
    target.add_component(&b).unwrap();

    let (result, response) = respond(&mut target);
    result.unwrap();
    assert_eq!(
        response.body(),
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><ajax-response>",
            "<evaluate><![CDATA[P();]]></evaluate>",
            "<component id=\"a\"><![CDATA[<div id=\"a\">A</div>]]></component>",
            "<component id=\"b\"><![CDATA[<div id=\"b\">B</div>]]></component>",
            "<evaluate><![CDATA[S();]]></evaluate>",
            "</ajax-response>"
        )
    );
}

#[test]
fn sets_no_cache_headers_and_encoding() {
    let mut target = AjaxRequestTarget::new();
    let mut response = BufferedWebResponse::new();
    {
        let settings = RequestCycleSettings {
            response_request_encoding: "ISO-8859-1".to_string(),
        };
        let mut cycle = RequestCycle::with_settings(&mut response, settings);
        target.respond(&mut cycle).unwrap();
    }
    assert_eq!(response.content_type(), Some("text/xml; charset=ISO-8859-1"));
    assert_eq!(response.character_encoding(), Some("ISO-8859-1"));
    assert_eq!(response.header("Expires"), Some("Mon, 26 Jul 1997 05:00:00 GMT"));
    assert_eq!(response.header("Cache-Control"), Some("no-cache, must-revalidate"));
    assert_eq!(response.header("Pragma"), Some("no-cache"));
    assert_eq!(
        response.body(),
        "<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><ajax-response></ajax-response>"
    );
}

#[test]
fn unsafe_cdata_is_encoded_and_marked() {
    let log = log();
    let page = page(&log);
    let markup = "<div id=\"e\">items[1]]]></div>";
    let e = TestComponent::new("e", markup, &log).on_page(&page).into_ref();
    let mut target = AjaxRequestTarget::new();
    target.add_component(&e).unwrap();
    target.append_javascript("plain();");

    let (result, response) = respond(&mut target);
    result.unwrap();
    let encoded = "<div id=\"e\">items[1]^]^]^></div>";
    assert_eq!(
        response.body(),
        format!(
            "{PROLOG}<component id=\"e\" encoding=\"wicket1\"><![CDATA[{encoded}]]></component>\
             <evaluate><![CDATA[plain();]]></evaluate></ajax-response>"
        )
    );
    assert_eq!(tools::cdata::decode(encoded), markup);
}

#[test]
fn rejects_invalid_components() {
    let log = log();
    let page = page(&log);

    let mut as_page = TestComponent::new("p", "", &log).on_page(&page);
    as_page.is_page = true;
    let as_page = as_page.into_ref();

    let mut hidden_id = TestComponent::new("h", "", &log).on_page(&page);
    hidden_id.output_markup_id = false;
    let hidden_id = hidden_id.into_ref();

    let ok = TestComponent::new("ok", "", &log).on_page(&page).into_ref();

    let mut target = AjaxRequestTarget::new();
    assert!(matches!(target.add_component(&as_page), Err(AjaxError::InvalidArgument(_))));
    assert!(matches!(
        target.add_component_with_markup_id(&as_page, "p"),
        Err(AjaxError::InvalidArgument(_))
    ));
    assert!(matches!(target.add_component(&hidden_id), Err(AjaxError::InvalidArgument(_))));
    assert!(matches!(
        target.add_component_with_markup_id(&ok, ""),
        Err(AjaxError::InvalidArgument(_))
    ));
    assert!(target.components().is_empty());

    // an explicit markup id does not need the component to output one
    target.add_component_with_markup_id(&hidden_id, "elsewhere").unwrap();
    assert_eq!(target.components().len(), 1);
}

#[test]
fn focus_scripts() {
    let log = log();
    let a = TestComponent::new("a", "", &log).into_ref();
    let mut no_id = TestComponent::new("n", "", &log);
    no_id.output_markup_id = false;
    let no_id = no_id.into_ref();

    let mut target = AjaxRequestTarget::new();
    target.focus_component(Some(&a)).unwrap();
    target.focus_component(None).unwrap();
    assert!(target.focus_component(Some(&no_id)).is_err());
    assert_eq!(
        target.append_javascripts(),
        ["Wicket.Focus.setFocusOnId('a');", "Wicket.Focus.setFocusOnId(null);"]
    );
}

#[test]
fn readding_a_markup_id_replaces_in_place() {
    let log = log();
    let page = page(&log);
    let a = TestComponent::new("a", "old", &log).on_page(&page).into_ref();
    let b = TestComponent::new("b", "b", &log).on_page(&page).into_ref();
    let c = TestComponent::new("c", "new", &log).on_page(&page).into_ref();

    let mut target = AjaxRequestTarget::new();
    target.add_components(&[Rc::clone(&a), Rc::clone(&b)]).unwrap();
    target.add_component_with_markup_id(&c, "a").unwrap();
    let ids: Vec<&str> = target.components().keys().map(String::as_str).collect();
    assert_eq!(ids, ["a", "b"]);

    let (result, response) = respond(&mut target);
    result.unwrap();
    assert_eq!(
        response.body(),
        format!(
            "{PROLOG}<component id=\"a\"><![CDATA[new]]></component>\
             <component id=\"b\"><![CDATA[b]]></component></ajax-response>"
        )
    );
}

struct AddOnBefore {
    late: ComponentRef,
}

impl AjaxListener for AddOnBefore {
    fn on_before_respond(
        &self,
        components: &ComponentMap,
        target: &mut AjaxRequestTarget,
    ) -> Result<(), AjaxError> {
        assert!(!components.contains_key("late"));
        target.add_component(&self.late)?;
        target.append_javascript("before();");
        Ok(())
    }
}

struct ScriptOnAfter {
    script: &'static str,
    seen: Rc<RefCell<Vec<String>>>,
}

impl AjaxListener for ScriptOnAfter {
    fn on_after_respond(
        &self,
        components: &ComponentMap,
        response: &mut dyn JavascriptResponse,
    ) -> Result<(), AjaxError> {
        self.seen.borrow_mut().extend(components.keys().cloned());
        response.add_javascript(self.script);
        Ok(())
    }
}

#[test]
fn listeners_run_before_and_after_components() {
    let log = log();
    let page = page(&log);
    let a = TestComponent::new("a", "A", &log).on_page(&page).into_ref();
    let late = TestComponent::new("late", "L", &log).on_page(&page).into_ref();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let mut target = AjaxRequestTarget::new();
    target.add_component(&a).unwrap();
    target.append_javascript("S();");
    target.add_listener(Rc::new(AddOnBefore { late }));
    let after: Rc<dyn AjaxListener> = Rc::new(ScriptOnAfter {
        script: "after[0]();",
        seen: Rc::clone(&seen),
    });
    target.add_listener(Rc::clone(&after));
    target.add_listener(after);

    let (result, response) = respond(&mut target);
    result.unwrap();
    assert_eq!(
        response.body(),
        format!(
            "{PROLOG}<component id=\"a\"><![CDATA[A]]></component>\
             <component id=\"late\"><![CDATA[L]]></component>\
             <evaluate encoding=\"wicket1\"><![CDATA[after[0]^();]]></evaluate>\
             <evaluate><![CDATA[S();]]></evaluate>\
             <evaluate><![CDATA[before();]]></evaluate></ajax-response>"
        )
    );
    assert_eq!(*seen.borrow(), ["a", "late"]);
}

#[test]
fn attaches_feedback_before_rendering() {
    let log = log();
    let page = page(&log);
    let mut feedback = TestComponent::new("f", "", &log);
    feedback.feedback = true;
    let c = TestComponent::new("c", "C", &log)
        .on_page(&page)
        .with_child(feedback.into_ref())
        .into_ref();

    let mut target = AjaxRequestTarget::new();
    target.add_component(&c).unwrap();
    let (result, _) = respond(&mut target);
    result.unwrap();
    assert_eq!(
        entries(&log),
        ["feedback f", "attach f", "attach c", "start c", "render c", "end c"]
    );
}

#[test]
fn header_contribution_follows_its_component() {
    let log = log();
    let page = page(&log);
    let hidden_grandchild = TestComponent::new("hv", "", &log)
        .with_head(Head::Css("hv.css".to_string()))
        .into_ref();
    let mut hidden = TestComponent::new("h", "", &log)
        .with_head(Head::Css("h.css".to_string()))
        .with_child(hidden_grandchild);
    hidden.visible = false;
    let visible = TestComponent::new("v", "", &log)
        .with_head(Head::Css("v.css".to_string()))
        .with_head(Head::Css("a.css".to_string()))
        .into_ref();
    let a = TestComponent::new("a", "A", &log)
        .on_page(&page)
        .with_head(Head::Css("a.css".to_string()))
        .with_head(Head::DomReady("ready();".to_string()))
        .with_head(Head::Load("load();".to_string()))
        .with_child(visible)
        .with_child(hidden.into_ref())
        .into_ref();

    let mut target = AjaxRequestTarget::new();
    target.add_component(&a).unwrap();
    target.append_javascript("S();");

    let (result, response) = respond(&mut target);
    result.unwrap();
    assert_eq!(
        response.body(),
        format!(
            "{PROLOG}<component id=\"a\"><![CDATA[A]]></component>\
             <header-contribution><![CDATA[<head xmlns:wicket=\"http://wicket.apache.org\">\
             <link rel=\"stylesheet\" type=\"text/css\" href=\"a.css\" />\n\
             <link rel=\"stylesheet\" type=\"text/css\" href=\"v.css\" />\n\
             </head>]]></header-contribution>\
             <evaluate><![CDATA[ready();]]></evaluate>\
             <evaluate><![CDATA[S();]]></evaluate>\
             <evaluate><![CDATA[load();]]></evaluate></ajax-response>"
        )
    );
}

#[test]
fn header_response_outside_render_head_is_restricted() {
    let mut target = AjaxRequestTarget::new();
    {
        let mut head = target.header_response();
        let err = head.render_css_reference("x.css", None).unwrap_err();
        assert!(matches!(err, AjaxError::ProtocolMisuse(_)));
        head.render_on_load_javascript("load();").unwrap();
        head.render_on_load_javascript("load();").unwrap();
    }
    assert_eq!(target.append_javascripts(), ["load();"]);
}

#[test]
fn second_respond_is_rejected() {
    let mut target = AjaxRequestTarget::new();
    target.append_javascript("once();");
    let mut response = BufferedWebResponse::new();
    {
        let mut cycle = RequestCycle::new(&mut response);
        target.respond(&mut cycle).unwrap();
        assert!(target.is_responded());
        assert!(matches!(target.respond(&mut cycle), Err(AjaxError::ProtocolMisuse(_))));
    }
    assert_eq!(
        response.body(),
        format!("{PROLOG}<evaluate><![CDATA[once();]]></evaluate></ajax-response>")
    );
}

#[test]
fn component_without_page_fails() {
    let log = log();
    let orphan = TestComponent::new("o", "O", &log).into_ref();
    let mut target = AjaxRequestTarget::new();
    target.add_component(&orphan).unwrap();
    let (result, response) = respond(&mut target);
    assert!(matches!(result, Err(AjaxError::PageState(_))));
    assert_eq!(response.body(), PROLOG);
}

#[test]
fn failed_render_does_not_leak_into_the_response() {
    let log = log();
    let page = page(&log);
    let mut broken = TestComponent::new("x", "partial", &log).on_page(&page);
    broken.fail_render = true;
    let broken = broken.into_ref();

    let mut target = AjaxRequestTarget::new();
    target.add_component(&broken).unwrap();
    let (result, response) = respond(&mut target);
    assert!(matches!(result, Err(AjaxError::Render(_))));
    assert_eq!(response.body(), PROLOG);
    assert_eq!(entries(&log), ["attach x", "start x", "render x", "end x"]);
}

#[test]
fn body_only_components_cannot_be_updated() {
    let log = log();
    let page = page(&log);
    let mut body_only = TestComponent::new("b", "B", &log).on_page(&page);
    body_only.body_only = true;
    let body_only = body_only.into_ref();

    let mut target = AjaxRequestTarget::new();
    target.add_component(&body_only).unwrap();
    let (result, _) = respond(&mut target);
    assert!(matches!(result, Err(AjaxError::ProtocolMisuse(_))));
}

#[test]
fn render_enables_output_markup_id() {
    let log = log();
    let page = page(&log);
    let mut c = TestComponent::new("c", "C", &log).on_page(&page);
    c.output_markup_id = false;
    let c = c.into_ref();

    let mut target = AjaxRequestTarget::new();
    target.add_component_with_markup_id(&c, "c").unwrap();
    let (result, _) = respond(&mut target);
    result.unwrap();
    assert!(c.borrow().output_markup_id());
}

#[test]
fn detach_reaches_the_page() {
    let log = log();
    let page = page(&log);
    let mut target = AjaxRequestTarget::new();
    target.detach();
    assert!(entries(&log).is_empty());

    let a = TestComponent::new("a", "", &log).on_page(&page).into_ref();
    target.add_component(&a).unwrap();
    target.detach();
    target.detach();
    assert_eq!(entries(&log), ["detach page", "detach page"]);
}

#[test]
fn display_lists_ids_and_scripts() {
    let log = log();
    let a = TestComponent::new("a", "", &log).into_ref();
    let mut target = AjaxRequestTarget::new();
    target.add_component(&a).unwrap();
    target.prepend_javascript("P();");
    target.append_javascript("S();");
    assert_eq!(
        target.to_string(),
        "[AjaxRequestTarget markup ids [a], prepend javascript [P();], append javascript [S();]]"
    );
}
