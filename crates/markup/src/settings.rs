/// URI prefix identifying the framework namespace in `xmlns:` declarations.
pub const WICKET_NAMESPACE_URI: &str = "http://wicket.apache.org";

pub const DEFAULT_WICKET_NAMESPACE: &str = "wicket";

#[derive(Clone, Debug)]
pub struct MarkupSettings {
    /// Namespace prefix used until an `<html xmlns:...>` declaration says otherwise.
    pub wicket_namespace: String,
    /// Remove framework-only attributes (such as the `xmlns:` declaration) from output.
    pub strip_wicket_tags: bool,
    /// Remove HTML comments from raw text. Conditional comments are kept.
    pub strip_comments: bool,
    /// Collapse runs of whitespace in raw text outside `<pre>` blocks.
    pub compress_whitespace: bool,
    /// Prefix for relative `href`/`src`/`background` values of plain tags.
    pub context_path: Option<String>,
    pub default_markup_encoding: String,
}

impl Default for MarkupSettings {
    fn default() -> Self {
        Self {
            wicket_namespace: DEFAULT_WICKET_NAMESPACE.to_string(),
            strip_wicket_tags: false,
            strip_comments: false,
            compress_whitespace: false,
            context_path: None,
            default_markup_encoding: "UTF-8".to_string(),
        }
    }
}

impl MarkupSettings {
    /// The configured context path, slash-terminated, or `None` when unset or blank.
    pub fn normalized_context_path(&self) -> Option<String> {
        let path = self.context_path.as_deref()?.trim();
        if path.is_empty() {
            return None;
        }
        let mut path = path.to_string();
        if !path.ends_with('/') {
            path.push('/');
        }
        Some(path)
    }
}
