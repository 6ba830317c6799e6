//! Shared helpers for the integration tests.

use scribe_babel::{FormatRegistry, ParseOptions, ParsedDocument};

pub fn registry() -> FormatRegistry {
    FormatRegistry::with_defaults()
}

/// Parse `content` with the parser registered for `id`
pub fn parse_as(id: &str, content: &str) -> ParsedDocument {
    registry()
        .parse_as(id, content, &ParseOptions::new())
        .expect("built-in format")
}

/// Parse `content` as if it were read from `filename`
pub fn parse_file(filename: &str, content: &str) -> ParsedDocument {
    registry()
        .parse(content, &ParseOptions::new().with_filename(filename))
        .expect("detected format is registered")
}

/// One small, typical document per built-in dialect
pub const SAMPLES: &[(&str, &str)] = &[
    ("markdown", "# Title\n\nSome *text* with a [link](https://example.com).\n\n- one\n- two\n"),
    ("todotxt", "(A) 2023-01-01 Call mom +Family @phone due:2023-01-15\nx 2023-01-02 Pay rent\n"),
    ("csv", "name,age\nAda,36\n\"Doe, Jr.\",40\n"),
    ("wikitext", "== Heading ==\n'''bold''' and ''italic''\n* item\n"),
    ("orgmode", "#+TITLE: Plan\n* TODO Write report\n  - draft\n"),
    ("creole", "= Title =\n**bold** //italic//\n* item\n"),
    ("tiddlywiki", "title: Note\ntags: a\n\n! Heading\n''bold''\n"),
    ("latex", "\\documentclass{article}\n\\begin{document}\n\\section{Intro}\nText\n\\end{document}\n"),
    ("asciidoc", "= Document\n\n== Section\n\n*bold* text\n"),
    ("restructuredtext", "Title\n=====\n\nBody with **bold**.\n\n.. note::\n\n   Careful.\n"),
    ("keyvalue", "[server]\nhost = localhost\nport = 8080\n"),
    ("taskpaper", "Home:\n\t- Buy milk @today\n"),
    ("textile", "h1. Title\n\nSome *strong* text.\n"),
    ("jupyter", "{\"cells\": [{\"cell_type\": \"code\", \"source\": \"1 + 1\", \"outputs\": []}], \"nbformat\": 4, \"nbformat_minor\": 5}"),
    ("rmarkdown", "---\ntitle: Report\n---\n\n```{r}\nsummary(x)\n```\n"),
    ("binary", "\u{89}PNG"),
    ("plaintext", "Just some words.\n"),
];
