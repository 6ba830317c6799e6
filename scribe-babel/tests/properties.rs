//! Properties that hold for every registered dialect and any input.

use proptest::prelude::*;
use scribe_babel::formats::builtin_parsers;
use scribe_babel::{FormatRegistry, ParseOptions};

/// Text biased towards the punctuation the dialects treat as markup
fn markup_text() -> impl Strategy<Value = String> {
    proptest::string::string_regex(
        "[-*#=|!\\[\\](){}<>`'\":_~^+@.,;/\\\\%a-zA-Z0-9 \t\n\u{e9}\u{4e2d}\u{1f642}\0]{0,160}",
    )
    .expect("valid strategy")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn parse_echoes_raw_content(content in markup_text()) {
        for parser in builtin_parsers() {
            let doc = parser.parse(&content, &ParseOptions::new());
            prop_assert_eq!(&doc.raw_content, &content);
            prop_assert_eq!(doc.format.id, parser.descriptor().id);
        }
    }

    #[test]
    fn arbitrary_text_never_panics(content in "\\PC{0,120}") {
        for parser in builtin_parsers() {
            let doc = parser.parse(&content, &ParseOptions::new());
            let _ = parser.validate(&content);
            let _ = parser.to_html(&doc, false);
        }
    }

    #[test]
    fn to_html_is_deterministic(content in markup_text(), light in any::<bool>()) {
        for parser in builtin_parsers() {
            let doc = parser.parse(&content, &ParseOptions::new());
            prop_assert_eq!(parser.to_html(&doc, light), parser.to_html(&doc, light));
        }
    }

    #[test]
    fn detection_always_resolves(content in markup_text(), name in "[a-z]{1,8}(\\.[a-z]{1,5})?") {
        let registry = FormatRegistry::with_defaults();
        let format = registry.detect(&content, Some(name.as_str()));
        prop_assert!(registry.has(format.id));
    }
}
