//! Shared helpers for the line-scanning converters
//!
//! - [`inline`]: HTML escaping and the protected inline span table.
//! - [`lists`]: nested list containers driven by marker depth.
//! - [`styles`]: per-dialect stylesheets with light/dark variants.
//!
//! The free functions below cover the bits every converter repeats: splitting lines the same
//! way everywhere and formatting line-numbered findings.

pub mod inline;
pub mod lists;
pub mod styles;

pub use inline::{escape_html, InlineSpans, Span};
pub use lists::{ListKind, NestedList};
pub use styles::{stylesheet, stylesheet_or_empty, theme_class};

/// Split on `\n`, dropping one trailing `\r` per line. Empty input yields one empty line,
/// and a trailing newline yields a trailing empty line.
pub fn split_lines(content: &str) -> Vec<&str> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// A validation finding tied to a zero-based line index
pub fn line_finding(index: usize, message: impl AsRef<str>) -> String {
    format!("Line {}: {}", index + 1, message.as_ref())
}

/// Count occurrences of `ch` in `text`
pub fn count_char(text: &str, ch: char) -> usize {
    text.chars().filter(|c| *c == ch).count()
}
