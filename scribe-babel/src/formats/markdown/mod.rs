//! Markdown format implementation
//!
//! A single-pass line scanner covering the subset of Markdown that matters for previews. It is
//! not CommonMark: there is no nesting of block containers and no lazy continuation.
//!
//! # Element Mapping Table
//!
//! | Markdown                  | HTML                                         | Notes                                  |
//! |---------------------------|----------------------------------------------|----------------------------------------|
//! | `# ` .. `###### `         | `<h1>` .. `<h6>`                             | `#` without a following space is text  |
//! | ```` ```lang ````         | `<pre><code class='language-lang'>`          | Closed at end of input if unterminated |
//! | `> quote`                 | `<blockquote>` with `<br>` per line          |                                        |
//! | `- `, `* `, `+ `          | `<ul><li>`                                   |                                        |
//! | `1. `                     | `<ol><li>`                                   |                                        |
//! | `\| a \| b \|`            | `<table><tr><td>`                            | A following `\|---\|` row makes `<th>` |
//! | `---`, `***`, `___`       | `<hr>`                                       |                                        |
//! | other text                | `<p>`                                        | Consecutive lines join with a space    |
//! | Inline:                   |                                              |                                        |
//! |   `` `code` ``            | `<code>`                                     | Protected from other inline rules      |
//! |   `![alt](src)`           | `<img src alt/>`                             | Protected                              |
//! |   `[text](href)`          | `<a href>`                                   | Protected                              |
//! |   `[ ]`, `[x]`            | disabled checkbox                            | Protected                              |
//! |   `**b**`, `__b__`        | `<strong>`                                   |                                        |
//! |   `~~s~~`                 | `<s>`                                        |                                        |
//! |   `*i*`, `_i_`            | `<em>`                                       |                                        |
//!
//! # Metadata
//!
//! `extension` (from the filename, may be empty), `lines`, `headings`.
//!
//! # Validation
//!
//! Outside code fences, after removing well-formed links and images, a line with unbalanced
//! `[`/`]` or `(`/`)` produces a finding.

mod render;

use crate::descriptor::{self, FormatDescriptor};
use crate::document::{Metadata, ParseOptions, ParsedDocument};
use crate::format::Parser;
use crate::formats::common::{count_char, line_finding, split_lines};
use once_cell::sync::Lazy;
use regex::Regex;

pub use render::render_inline;

/// Render Markdown blocks without the `markdown` container and stylesheet
pub fn render_fragment(content: &str) -> String {
    render::render_blocks(content).html
}

static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap());

/// Parser implementation for Markdown
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownParser;

impl Parser for MarkdownParser {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &descriptor::MARKDOWN
    }

    fn parse(&self, content: &str, options: &ParseOptions) -> ParsedDocument {
        let rendered = render::render(content);

        let mut metadata = Metadata::new();
        metadata.insert("extension".into(), options.extension_or_empty());
        metadata.insert("lines".into(), split_lines(content).len().to_string());
        metadata.insert("headings".into(), rendered.headings.to_string());

        ParsedDocument::new(self.descriptor(), content, rendered.html).with_metadata(metadata)
    }

    fn validate(&self, content: &str) -> Vec<String> {
        let mut findings = Vec::new();
        let mut in_code = false;

        for (index, line) in split_lines(content).into_iter().enumerate() {
            let trimmed = line.trim();
            if trimmed.starts_with("```") {
                in_code = !in_code;
            }
            if in_code {
                continue;
            }

            let stripped = IMAGE.replace_all(trimmed, "");
            let stripped = LINK.replace_all(&stripped, "");
            if count_char(&stripped, '[') != count_char(&stripped, ']') {
                findings.push(line_finding(index, "Unclosed brackets"));
            }
            if count_char(&stripped, '(') != count_char(&stripped, ')') {
                findings.push(line_finding(index, "Unclosed parentheses"));
            }
        }

        findings
    }
}
