use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub const MARKUP_CASES_FORMAT_V1: &str = "markup-cases-v1";

#[derive(Debug, Deserialize)]
struct MarkupCaseFile {
    format: String,
    #[serde(rename = "case", default)]
    cases: Vec<MarkupCase>,
}

/// One parse scenario. Exactly one of `elements`, `output` or `error` is the
/// primary expectation; `components` may accompany any successful parse.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MarkupCase {
    pub id: String,
    pub input: String,
    #[serde(default)]
    pub wicket_namespace: Option<String>,
    #[serde(default)]
    pub strip_wicket_tags: bool,
    #[serde(default)]
    pub strip_comments: bool,
    #[serde(default)]
    pub compress_whitespace: bool,
    #[serde(default)]
    pub context_path: Option<String>,
    /// Snapshot lines: `raw "<escaped text>"` or `tag <source>`.
    #[serde(default)]
    pub elements: Option<Vec<String>>,
    /// Expected re-serialized markup.
    #[serde(default)]
    pub output: Option<String>,
    /// Expected error code, by variant name.
    #[serde(default)]
    pub error: Option<String>,
    /// Component ids bound by open tags, in document order.
    #[serde(default)]
    pub components: Option<Vec<String>>,
}

pub fn load_markup_cases(path: &Path) -> Vec<MarkupCase> {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read markup cases {path:?}: {err}"));
    let file: MarkupCaseFile = toml::from_str(&content)
        .unwrap_or_else(|err| panic!("failed to parse markup cases {path:?}: {err}"));
    assert_eq!(
        file.format, MARKUP_CASES_FORMAT_V1,
        "unsupported format in {path:?}"
    );
    assert!(!file.cases.is_empty(), "markup cases {path:?} define no case");

    let mut ids = BTreeSet::new();
    for case in &file.cases {
        assert!(ids.insert(case.id.as_str()), "duplicate case id in {path:?}: {}", case.id);
        let expectations = [case.elements.is_some(), case.output.is_some(), case.error.is_some()]
            .into_iter()
            .filter(|&set| set)
            .count();
        assert_eq!(
            expectations, 1,
            "case '{}' in {path:?} must set exactly one of elements/output/error",
            case.id
        );
        assert!(
            case.error.is_none() || case.components.is_none(),
            "case '{}' in {path:?} expects an error and components",
            case.id
        );
    }
    file.cases
}
