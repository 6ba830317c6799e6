use crate::common::parse_as;
use scribe_babel::formats::TaskpaperParser;
use scribe_babel::Parser;

#[test]
fn single_task() {
    let doc = parse_as("taskpaper", "- Buy milk");
    assert_eq!(doc.meta("tasks"), Some("1"));
    assert_eq!(doc.meta("projects"), Some("0"));
}

#[test]
fn single_project() {
    let doc = parse_as("taskpaper", "Home:");
    assert_eq!(doc.meta("tasks"), Some("0"));
    assert_eq!(doc.meta("projects"), Some("1"));
}

#[test]
fn missing_space_after_hyphen_is_one_finding() {
    let findings = TaskpaperParser.validate("-Task");
    assert_eq!(findings.len(), 1);
    assert!(findings[0].contains("Task marker"));
}
