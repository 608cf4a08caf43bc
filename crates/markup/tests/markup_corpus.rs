use markup::{Markup, MarkupElement, MarkupParser, MarkupSettings};
use markup_test_support::{MarkupCase, diff_lines, escape_text, load_markup_cases};
use std::path::Path;

fn settings_for(case: &MarkupCase) -> MarkupSettings {
    let mut settings = MarkupSettings {
        strip_wicket_tags: case.strip_wicket_tags,
        strip_comments: case.strip_comments,
        compress_whitespace: case.compress_whitespace,
        context_path: case.context_path.clone(),
        ..MarkupSettings::default()
    };
    if let Some(namespace) = &case.wicket_namespace {
        settings.wicket_namespace = namespace.clone();
    }
    settings
}

fn element_lines(markup: &Markup) -> Vec<String> {
    markup
        .iter()
        .map(|element| match element {
            MarkupElement::Raw(raw) => format!("raw \"{}\"", escape_text(raw.as_str())),
            MarkupElement::Tag(tag) => format!("tag {}", tag.borrow()),
        })
        .collect()
}

fn component_ids(markup: &Markup) -> Vec<String> {
    markup
        .iter()
        .filter_map(MarkupElement::as_tag)
        .filter_map(|tag| {
            let t = tag.borrow();
            if t.is_close() {
                None
            } else {
                t.id().map(str::to_string)
            }
        })
        .collect()
}

fn run_case(case: &MarkupCase) -> Result<(), String> {
    let result = MarkupParser::with_settings(case.input.as_str(), settings_for(case)).parse();

    if let Some(expected) = &case.error {
        return match result {
            Ok(markup) => Err(format!("expected {expected}, parsed {:?}", element_lines(&markup))),
            Err(err) if format!("{:?}", err.code) == *expected => Ok(()),
            Err(err) => Err(format!("expected {expected}, got {:?}: {err}", err.code)),
        };
    }

    let markup = result.map_err(|err| format!("unexpected error {:?}: {err}", err.code))?;

    if let Some(expected) = &case.elements {
        let actual = element_lines(&markup);
        if &actual != expected {
            return Err(diff_lines(expected, &actual));
        }
    }
    if let Some(expected) = &case.output {
        let actual = markup.to_string();
        if &actual != expected {
            return Err(format!("output mismatch\n  expected: {expected}\n    actual: {actual}"));
        }
    }
    if let Some(expected) = &case.components {
        let actual = component_ids(&markup);
        if &actual != expected {
            return Err(format!("component ids mismatch: expected {expected:?}, actual {actual:?}"));
        }
    }
    Ok(())
}

#[test]
fn markup_corpus() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/markup_cases.toml");
    let cases = load_markup_cases(&path);
    let failures: Vec<String> = cases
        .iter()
        .filter_map(|case| {
            run_case(case)
                .err()
                .map(|reason| format!("[{}] {}", case.id, reason))
        })
        .collect();
    assert!(
        failures.is_empty(),
        "{} of {} markup cases failed:\n{}",
        failures.len(),
        cases.len(),
        failures.join("\n")
    );
}
