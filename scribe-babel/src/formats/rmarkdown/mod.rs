//! R Markdown documents
//!
//! An optional front matter block between `---` lines carries `key: value` pairs. Code chunks
//! open with ```` ```{lang label, option=value} ```` and close with a bare ```` ``` ````. Everything
//! else is Markdown and goes through the Markdown block renderer, plain fences included.

use crate::descriptor::{self, FormatDescriptor};
use crate::document::{Metadata, ParseOptions, ParsedDocument};
use crate::format::Parser;
use crate::formats::common::{escape_html, split_lines, stylesheet_or_empty};
use crate::formats::markdown;
use once_cell::sync::Lazy;
use regex::Regex;

static CHUNK_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^```\s*\{([^}]*)\}\s*$").unwrap());

/// Executable code chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeChunk {
    /// Lowercased engine name, `r` when the header is empty
    pub language: String,
    pub label: Option<String>,
    /// Header text between the braces
    pub options: String,
    pub code: String,
    pub closed: bool,
}

impl CodeChunk {
    fn from_header(header: &str) -> Self {
        let mut parts = header
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty());
        let language = parts.next().unwrap_or("r").to_lowercase();
        let label = parts
            .next()
            .filter(|part| !part.contains('='))
            .map(str::to_string);
        CodeChunk {
            language,
            label,
            options: header.trim().to_string(),
            code: String::new(),
            closed: false,
        }
    }

    fn class(&self) -> &'static str {
        match self.language.as_str() {
            "r" => "r-chunk",
            "python" => "python-chunk",
            "bash" | "sh" => "bash-chunk",
            "sql" => "sql-chunk",
            _ => "other-chunk",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    Markdown(String),
    Chunk(CodeChunk),
}

/// Front matter and body of a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RMarkdownDocument {
    pub front_matter: Metadata,
    pub has_front_matter: bool,
    /// Opening `---` without a closing one; the block is then treated as body text
    pub unclosed_front_matter: bool,
    pub sections: Vec<Section>,
}

impl RMarkdownDocument {
    pub fn chunks(&self) -> impl Iterator<Item = &CodeChunk> {
        self.sections.iter().filter_map(|section| match section {
            Section::Chunk(chunk) => Some(chunk),
            Section::Markdown(_) => None,
        })
    }
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Front matter pairs and the index of the first body line
fn front_matter(lines: &[&str]) -> Option<(Metadata, usize)> {
    if lines.first().map(|line| line.trim_end()) != Some("---") {
        return None;
    }
    let close = lines
        .iter()
        .skip(1)
        .position(|line| matches!(line.trim_end(), "---" | "..."))?
        + 1;

    let mut pairs = Metadata::new();
    for line in &lines[1..close] {
        // Nested YAML values stay out of the flat map
        if line.starts_with(char::is_whitespace) {
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            if !key.is_empty() && !key.starts_with('#') {
                pairs
                    .entry(key.to_string())
                    .or_insert_with(|| unquote(value).to_string());
            }
        }
    }
    Some((pairs, close + 1))
}

pub fn parse_document(content: &str) -> RMarkdownDocument {
    let lines = split_lines(content);
    let mut document = RMarkdownDocument::default();

    let mut start = 0;
    match front_matter(&lines) {
        Some((pairs, body)) => {
            document.front_matter = pairs;
            document.has_front_matter = true;
            start = body;
        }
        None => document.unclosed_front_matter = lines.first().map(|l| l.trim_end()) == Some("---"),
    }

    let mut text: Vec<&str> = Vec::new();
    let mut chunk: Option<(CodeChunk, Vec<&str>)> = None;
    let mut in_fence = false;

    for &line in lines.iter().skip(start) {
        if let Some((current, code)) = chunk.as_mut() {
            if line.trim_end() == "```" {
                current.closed = true;
                current.code = code.join("\n");
                if let Some((done, _)) = chunk.take() {
                    document.sections.push(Section::Chunk(done));
                }
            } else {
                code.push(line);
            }
            continue;
        }

        if !in_fence {
            if let Some(caps) = CHUNK_OPEN.captures(line.trim_end()) {
                if !text.is_empty() {
                    document.sections.push(Section::Markdown(text.join("\n")));
                    text.clear();
                }
                chunk = Some((CodeChunk::from_header(&caps[1]), Vec::new()));
                continue;
            }
        }
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        }
        text.push(line);
    }

    if let Some((mut current, code)) = chunk {
        current.code = code.join("\n");
        document.sections.push(Section::Chunk(current));
    }
    if !text.is_empty() {
        document.sections.push(Section::Markdown(text.join("\n")));
    }
    document
}

/// Parser implementation for R Markdown
#[derive(Debug, Default, Clone, Copy)]
pub struct RMarkdownParser;

impl Parser for RMarkdownParser {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &descriptor::RMARKDOWN
    }

    fn parse(&self, content: &str, _options: &ParseOptions) -> ParsedDocument {
        let document = parse_document(content);

        let mut metadata = document.front_matter.clone();
        metadata.insert(
            "has_frontmatter".into(),
            document.has_front_matter.to_string(),
        );
        metadata.insert("code_chunks".into(), document.chunks().count().to_string());
        metadata.insert(
            "r_chunks".into(),
            document
                .chunks()
                .filter(|chunk| chunk.language == "r")
                .count()
                .to_string(),
        );

        ParsedDocument::new(self.descriptor(), content, render(&document)).with_metadata(metadata)
    }

    fn validate(&self, content: &str) -> Vec<String> {
        let document = parse_document(content);
        let mut findings = Vec::new();
        if document.unclosed_front_matter {
            findings.push("Unclosed YAML front matter".to_string());
        }
        if document.chunks().any(|chunk| !chunk.closed) {
            findings.push("Mismatched code chunk delimiters".to_string());
        }
        findings
    }
}

fn render(document: &RMarkdownDocument) -> String {
    let mut html = String::from("<div class='rmarkdown'>");
    html.push_str(&stylesheet_or_empty(descriptor::RMARKDOWN.id, true));

    if document.has_front_matter {
        html.push_str("<div class='rmd-header'>");
        if let Some(title) = document.front_matter.get("title") {
            html.push_str(&format!("<h1>{}</h1>", escape_html(title)));
        }
        let info: Vec<String> = ["author", "date", "output"]
            .iter()
            .filter_map(|key| {
                document
                    .front_matter
                    .get(*key)
                    .filter(|value| !value.is_empty())
                    .map(|value| format!("<span>{}</span>", escape_html(value)))
            })
            .collect();
        if !info.is_empty() {
            html.push_str(&format!("<div class='rmd-info'>{}</div>", info.concat()));
        }
        html.push_str("</div>");
    }

    for section in &document.sections {
        match section {
            Section::Markdown(text) => html.push_str(&markdown::render_fragment(text)),
            Section::Chunk(chunk) => {
                let label = match &chunk.label {
                    Some(label) => format!("{}: {}", chunk.language, label),
                    None => chunk.language.clone(),
                };
                html.push_str(&format!(
                    "<div class='code-chunk {}'><div class='chunk-label'>{}</div><pre><code class='language-{}'>{}</code></pre></div>",
                    chunk.class(),
                    escape_html(&label),
                    escape_html(&chunk.language),
                    escape_html(&chunk.code)
                ));
            }
        }
    }

    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "---\ntitle: \"Sales Report\"\nauthor: Ana\noutput: html_document\n---\n\n# Intro\n\n```{r setup, include=FALSE}\nlibrary(dplyr)\n```\n\nSome text.\n\n```{python}\nprint(1 < 2)\n```\n";

    #[test]
    fn test_metadata() {
        let doc = RMarkdownParser.parse(DOC, &ParseOptions::new());
        assert_eq!(doc.meta("has_frontmatter"), Some("true"));
        assert_eq!(doc.meta("code_chunks"), Some("2"));
        assert_eq!(doc.meta("r_chunks"), Some("1"));
        assert_eq!(doc.meta("title"), Some("Sales Report"));
        assert_eq!(doc.meta("author"), Some("Ana"));
    }

    #[test]
    fn test_chunk_headers() {
        let document = parse_document(DOC);
        let chunks: Vec<&CodeChunk> = document.chunks().collect();
        assert_eq!(chunks[0].language, "r");
        assert_eq!(chunks[0].label.as_deref(), Some("setup"));
        assert_eq!(chunks[0].options, "r setup, include=FALSE");
        assert_eq!(chunks[0].code, "library(dplyr)");
        assert_eq!(chunks[1].language, "python");
        assert_eq!(chunks[1].label, None);
        assert!(chunks.iter().all(|chunk| chunk.closed));
    }

    #[test]
    fn test_render() {
        let html = RMarkdownParser.parse(DOC, &ParseOptions::new()).parsed_content;
        assert!(html.starts_with("<div class='rmarkdown'><style>"));
        assert!(html.contains("<div class='rmd-header'><h1>Sales Report</h1>"));
        assert!(html.contains("<span>Ana</span><span>html_document</span>"));
        assert!(html.contains("<h1>Intro</h1>"));
        assert!(html.contains(
            "<div class='code-chunk r-chunk'><div class='chunk-label'>r: setup</div><pre><code class='language-r'>library(dplyr)</code></pre></div>"
        ));
        assert!(html.contains("<code class='language-python'>print(1 &lt; 2)</code>"));
        assert!(html.ends_with("</div>"));
    }

    #[test]
    fn test_without_front_matter() {
        let doc = RMarkdownParser.parse("Plain *text*", &ParseOptions::new());
        assert_eq!(doc.meta("has_frontmatter"), Some("false"));
        assert_eq!(doc.meta("code_chunks"), Some("0"));
        assert!(!doc.parsed_content.contains("<div class='rmd-header'>"));
    }

    #[test]
    fn test_plain_fence_is_not_a_chunk() {
        let document = parse_document("```\n```{r}\n```\n");
        assert_eq!(document.chunks().count(), 0);
    }

    #[test]
    fn test_validate() {
        assert!(RMarkdownParser.validate(DOC).is_empty());
        assert_eq!(
            RMarkdownParser.validate("---\ntitle: x\n\nbody"),
            vec!["Unclosed YAML front matter".to_string()]
        );
        assert_eq!(
            RMarkdownParser.validate("```{r}\nx <- 1\n"),
            vec!["Mismatched code chunk delimiters".to_string()]
        );
    }

    #[test]
    fn test_unclosed_front_matter_is_body() {
        let doc = RMarkdownParser.parse("---\ntitle: x", &ParseOptions::new());
        assert_eq!(doc.meta("has_frontmatter"), Some("false"));
        assert_eq!(doc.meta("title"), None);
    }
}
