use crate::common::registry;
use scribe_babel::formats::MarkdownParser;
use scribe_babel::{ids, FormatError, FormatRegistry};

#[test]
fn sniffs_dialects_from_content() {
    let registry = registry();
    let cases = [
        ("# Title\n\nBody", ids::MARKDOWN),
        ("(A) Call mom +Family", ids::TODOTXT),
        ("\\documentclass{article}\n\\begin{document}", ids::LATEX),
        ("* TODO Write report", ids::ORGMODE),
        ("{\n  \"nbformat\": 4\n}", ids::JUPYTER),
        ("Home:\n\t- Buy milk", ids::TASKPAPER),
        ("h1. Title", ids::TEXTILE),
    ];
    for (content, id) in cases {
        let found = registry.detect_by_content(content).map(|format| format.id);
        assert_eq!(found, Some(id), "content {content:?}");
    }
}

#[test]
fn plain_sentence_is_not_sniffed() {
    let registry = registry();
    assert_eq!(
        registry.detect_by_content("The quick brown fox jumps over the lazy dog."),
        None
    );
    assert_eq!(
        registry
            .detect("The quick brown fox jumps over the lazy dog.", None)
            .id,
        ids::PLAINTEXT
    );
}

#[test]
fn sentence_punctuation_can_still_sniff() {
    // Two commas read as a delimited row, a trailing colon as an outline project.
    let registry = registry();
    assert_eq!(
        registry
            .detect_by_content("We need eggs, milk, and bread.")
            .map(|format| format.id),
        Some(ids::CSV)
    );
    assert_eq!(
        registry
            .detect_by_content("Remember this:")
            .map(|format| format.id),
        Some(ids::TASKPAPER)
    );
    assert_eq!(
        registry.detect_by_content("Meet me at noon, by the station."),
        None
    );
}

#[test]
fn blank_content_is_not_sniffed() {
    let registry = registry();
    assert_eq!(registry.detect_by_content(""), None);
    assert_eq!(registry.detect_by_content("  \n\t\n"), None);
    assert_eq!(registry.detect("", None).id, ids::PLAINTEXT);
}

#[test]
fn filename_wins_over_content() {
    let registry = registry();
    let format = registry.detect("# Looks like markdown", Some("notes.org"));
    assert_eq!(format.id, ids::ORGMODE);
}

#[test]
fn blank_filename_falls_back_to_content() {
    let registry = registry();
    assert_eq!(registry.detect("# Title", Some("  ")).id, ids::MARKDOWN);
}

#[test]
fn sniff_window_is_configurable() {
    let content = "plain first line\n# Heading";
    assert_eq!(
        registry().detect_by_content(content).map(|f| f.id),
        Some(ids::MARKDOWN)
    );
    let narrow = FormatRegistry::with_defaults().with_sniff_lines(1);
    assert_eq!(narrow.detect_by_content(content), None);
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut registry = FormatRegistry::with_defaults();
    let result = registry.register(MarkdownParser);
    assert_eq!(
        result,
        Err(FormatError::DuplicateFormat(ids::MARKDOWN.to_string()))
    );
    assert_eq!(registry.formats().count(), 17);
}

#[test]
fn unknown_id_is_an_error() {
    let registry = registry();
    assert!(matches!(
        registry.parse_as("nope", "x", &Default::default()),
        Err(FormatError::FormatNotFound(id)) if id == "nope"
    ));
}

#[test]
fn registry_is_shareable_across_threads() {
    let registry = std::sync::Arc::new(registry());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = registry.clone();
            std::thread::spawn(move || {
                registry
                    .parse(&format!("# Heading {i}"), &Default::default())
                    .map(|doc| doc.format.id)
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Ok(ids::MARKDOWN));
    }
}
