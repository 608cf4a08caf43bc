//! Writers for the elements of the `<ajax-response>` envelope.

use crate::response::{CapturingResponse, Response};
use std::borrow::Cow;
use tools::cdata;
use tools::xml::escape_attribute;

pub(crate) const HEAD_NAMESPACE: &str = "http://wicket.apache.org";

pub(crate) fn write_prolog(out: &mut dyn Response, encoding: &str) {
    out.write("<?xml version=\"1.0\" encoding=\"");
    out.write(encoding);
    out.write("\"?><ajax-response>");
}

pub(crate) fn write_epilog(out: &mut dyn Response) {
    out.write("</ajax-response>");
}

fn write_encoding_attribute(out: &mut dyn Response, encoded: bool) {
    if encoded {
        out.write(" encoding=\"");
        out.write(cdata::ENCODING_NAME);
        out.write("\"");
    }
}

/// `<evaluate>` wrapping one script.
pub(crate) fn write_evaluate(out: &mut dyn Response, script: &str) {
    let encoded = cdata::encode(script);
    out.write("<evaluate");
    write_encoding_attribute(out, matches!(encoded, Cow::Owned(_)));
    out.write("><![CDATA[");
    out.write(&encoded);
    out.write("]]></evaluate>");
}

/// `<component>` wrapping a captured body.
pub(crate) fn write_component(out: &mut dyn Response, markup_id: &str, body: &CapturingResponse) {
    out.write("<component id=\"");
    out.write(&escape_attribute(markup_id));
    out.write("\"");
    write_encoding_attribute(out, body.is_contents_encoded());
    out.write("><![CDATA[");
    out.write(body.contents());
    out.write("]]></component>");
}

/// `<header-contribution>` wrapping captured head output; nothing when the
/// capture is empty.
pub(crate) fn write_header_contribution(out: &mut dyn Response, head: &CapturingResponse) {
    if head.contents().is_empty() {
        return;
    }
    out.write("<header-contribution");
    write_encoding_attribute(out, head.is_contents_encoded());
    out.write("><![CDATA[<head xmlns:wicket=\"");
    out.write(HEAD_NAMESPACE);
    out.write("\">");
    out.write(head.contents());
    out.write("</head>]]></header-contribution>");
}
