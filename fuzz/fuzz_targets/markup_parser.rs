#![no_main]

use libfuzzer_sys::fuzz_target;
use markup::{MarkupElement, MarkupParser, MarkupSettings};

fuzz_target!(|data: &[u8]| {
    let Some((&flags, input)) = data.split_first() else {
        return;
    };
    let settings = MarkupSettings {
        strip_wicket_tags: flags & 1 != 0,
        strip_comments: flags & 2 != 0,
        compress_whitespace: flags & 4 != 0,
        context_path: (flags & 8 != 0).then(|| "/app".to_string()),
        ..MarkupSettings::default()
    };

    let Ok(markup) = MarkupParser::from_bytes(input, settings).parse() else {
        return;
    };

    for element in &markup {
        let MarkupElement::Tag(tag) = element else {
            continue;
        };
        let tag = tag.borrow();
        assert!(!tag.is_ignored(), "ignored tags never reach the markup");
        if tag.is_close() {
            let open = tag.open_tag().expect("close tag is linked to its open tag");
            assert!(tag.closes(&open));
        }
    }
    let _ = markup.to_string();
});
