//! Small helpers for emitting JavaScript from server-side code.

/// Escapes `text` for use inside a single- or double-quoted JavaScript string.
pub fn escape_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}

pub const SCRIPT_CONTENT_PREFIX: &str = "<!--/*--><![CDATA[/*><!--*/\n";
pub const SCRIPT_CONTENT_SUFFIX: &str = "\n/*-->]]>*/";

/// Wraps inline script in a `<script>` element whose body survives both HTML
/// and XHTML parsers.
pub fn write_javascript(out: &mut String, script: &str, id: Option<&str>) {
    out.push_str("<script type=\"text/javascript\"");
    if let Some(id) = id {
        out.push_str(" id=\"");
        out.push_str(id);
        out.push('"');
    }
    out.push('>');
    out.push_str(SCRIPT_CONTENT_PREFIX);
    out.push_str(script);
    out.push_str(SCRIPT_CONTENT_SUFFIX);
    out.push_str("</script>\n");
}
