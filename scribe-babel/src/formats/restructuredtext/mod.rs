//! reStructuredText documents
//!
//! The scanner groups lines into [`Block`]s first; metadata and rendering both read that list.
//! Section levels come from the adornment character, not from the order adornments appear in:
//! `= - ~ ^ " '` map to levels 1 through 6 and any other punctuation ranks 6.
//!
//! Directive bodies are rendered once, without nested directive parsing.

use std::collections::BTreeMap;

use crate::descriptor::{self, FormatDescriptor};
use crate::document::{Metadata, ParseOptions, ParsedDocument};
use crate::format::Parser;
use crate::formats::common::{
    escape_html, line_finding, split_lines, stylesheet_or_empty, theme_class, InlineSpans,
    ListKind, NestedList,
};
use once_cell::sync::Lazy;
use regex::Regex;

const ADORNMENT_RANKS: [char; 6] = ['=', '-', '~', '^', '"', '\''];
const ADMONITIONS: [&str; 9] = [
    "attention", "caution", "danger", "error", "hint", "important", "note", "tip", "warning",
];

static DIRECTIVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\.\.\s+([\w+-]+)::\s*(.*)$").unwrap());
static FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:([^:`\s][^:`]*):(?:\s+(.*))?$").unwrap());
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)[-*+]\s+(.+)$").unwrap());
static ENUMERATED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)(?:\d+|#)[.)]\s+(.+)$").unwrap());

static LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"``([^`]+)``").unwrap());
static ROLE: Lazy<Regex> = Lazy::new(|| Regex::new(r":([\w-]+):`([^`]+)`").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`<]+?)\s*<([^>`]+)>`__?").unwrap());
static REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`__?").unwrap());
static INTERPRETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s<>`]+").unwrap());
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*\s][^*]*)\*").unwrap());

/// A titled section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RstSection {
    pub level: usize,
    pub title: String,
    pub underline: String,
    pub overline: bool,
}

/// `.. name:: argument` with its `:option: value` lines and dedented body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RstDirective {
    pub name: String,
    pub argument: String,
    pub options: BTreeMap<String, String>,
    pub body: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Section(RstSection),
    Directive(RstDirective),
    Field { name: String, value: String },
    Item { kind: ListKind, level: usize, text: String },
    Paragraph(String),
    Literal(Vec<String>),
    Quote(Vec<String>),
    Transition,
}

/// Level of a section adorned with `adornment`
pub fn section_level(adornment: char) -> usize {
    ADORNMENT_RANKS
        .iter()
        .position(|c| *c == adornment)
        .map_or(6, |rank| rank + 1)
}

/// The repeated punctuation character of an adornment line
fn adornment_char(line: &str) -> Option<char> {
    let line = line.trim_end();
    let first = line.chars().next()?;
    let uniform = first.is_ascii_punctuation() && line.chars().all(|c| c == first);
    (uniform && line.len() >= 2).then_some(first)
}

fn is_indented(line: &str) -> bool {
    line.starts_with([' ', '\t'])
}

/// Consume the indented lines starting at `index`, removing their common margin
///
/// Blank lines belong to the block only when more indented text follows them.
fn indented_block(lines: &[&str], index: &mut usize) -> Vec<String> {
    let mut raw: Vec<&str> = Vec::new();
    while let Some(&line) = lines.get(*index) {
        if line.trim().is_empty() {
            let continues = lines[*index..]
                .iter()
                .find(|l| !l.trim().is_empty())
                .map_or(false, |l| is_indented(l));
            if !continues {
                break;
            }
        } else if !is_indented(line) {
            break;
        }
        raw.push(line);
        *index += 1;
    }

    let margin = raw
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);
    let mut body: Vec<String> = raw
        .iter()
        .map(|l| {
            if l.trim().is_empty() {
                String::new()
            } else {
                l[margin..].trim_end().to_string()
            }
        })
        .collect();
    trim_blank_lines(&mut body);
    body
}

fn trim_blank_lines(lines: &mut Vec<String>) {
    while lines.last().map_or(false, String::is_empty) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|l| l.is_empty()).count();
    lines.drain(..leading);
}

/// Text of a paragraph ending in `::`, with the marker reduced the way reST shows it
fn literal_intro(paragraph: &str) -> Option<String> {
    let head = paragraph.strip_suffix("::")?;
    if head.is_empty() || head.ends_with(char::is_whitespace) {
        Some(head.trim_end().to_string())
    } else {
        Some(format!("{head}:"))
    }
}

fn directive(caps: &regex::Captures<'_>, lines: &[&str], index: &mut usize) -> RstDirective {
    let mut body = indented_block(lines, index);
    let option_lines = body.iter().take_while(|l| FIELD.is_match(l)).count();
    let options = body
        .drain(..option_lines)
        .filter_map(|line| {
            FIELD.captures(&line).map(|field| {
                let value = field.get(2).map_or("", |m| m.as_str());
                (field[1].to_string(), value.trim().to_string())
            })
        })
        .collect();
    trim_blank_lines(&mut body);

    RstDirective {
        name: caps[1].to_string(),
        argument: caps[2].trim().to_string(),
        options,
        body,
    }
}

/// Group `content` into blocks
pub fn blocks(content: &str) -> Vec<Block> {
    let lines = split_lines(content);
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if line.trim().is_empty() {
            i += 1;
            continue;
        }

        if line.trim_end() == ".." || line.starts_with(".. ") {
            i += 1;
            match DIRECTIVE.captures(line) {
                Some(caps) => blocks.push(Block::Directive(directive(&caps, &lines, &mut i))),
                None => {
                    indented_block(&lines, &mut i);
                }
            }
            continue;
        }

        if let Some(ch) = adornment_char(line) {
            let title = lines.get(i + 1).copied().unwrap_or("");
            let underline = lines.get(i + 2).copied().unwrap_or("");
            if !title.trim().is_empty()
                && adornment_char(title).is_none()
                && underline.trim_end() == line.trim_end()
            {
                blocks.push(Block::Section(RstSection {
                    level: section_level(ch),
                    title: title.trim().to_string(),
                    underline: underline.trim_end().to_string(),
                    overline: true,
                }));
                i += 3;
                continue;
            }
            if line.trim_end().len() >= 4 {
                blocks.push(Block::Transition);
                i += 1;
                continue;
            }
        }

        if !is_indented(line) {
            if let Some(ch) = lines.get(i + 1).and_then(|next| adornment_char(next)) {
                blocks.push(Block::Section(RstSection {
                    level: section_level(ch),
                    title: line.trim().to_string(),
                    underline: lines[i + 1].trim_end().to_string(),
                    overline: false,
                }));
                i += 2;
                continue;
            }
        }

        let item = BULLET
            .captures(line)
            .map(|caps| (ListKind::Unordered, caps))
            .or_else(|| ENUMERATED.captures(line).map(|caps| (ListKind::Ordered, caps)));
        if let Some((kind, caps)) = item {
            blocks.push(Block::Item {
                kind,
                level: caps[1].len() / 2 + 1,
                text: caps[2].trim().to_string(),
            });
            i += 1;
            continue;
        }

        if let Some(caps) = FIELD.captures(line) {
            blocks.push(Block::Field {
                name: caps[1].trim().to_string(),
                value: caps.get(2).map_or("", |m| m.as_str()).trim().to_string(),
            });
            i += 1;
            continue;
        }

        if is_indented(line) {
            blocks.push(Block::Quote(indented_block(&lines, &mut i)));
            continue;
        }

        let mut text: Vec<&str> = Vec::new();
        while i < lines.len() && !lines[i].trim().is_empty() {
            let title_follows = lines.get(i + 1).map_or(false, |next| adornment_char(next).is_some());
            if !text.is_empty() && title_follows {
                break;
            }
            text.push(lines[i].trim());
            i += 1;
        }
        let paragraph = text.join(" ");
        match literal_intro(&paragraph) {
            Some(intro) => {
                if !intro.is_empty() {
                    blocks.push(Block::Paragraph(intro));
                }
                let body = indented_block(&lines, &mut i);
                if !body.is_empty() {
                    blocks.push(Block::Literal(body));
                }
            }
            None => blocks.push(Block::Paragraph(paragraph)),
        }
    }
    blocks
}

/// Parser implementation for reStructuredText
#[derive(Debug, Default, Clone, Copy)]
pub struct RestructuredTextParser;

impl Parser for RestructuredTextParser {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &descriptor::RESTRUCTUREDTEXT
    }

    fn parse(&self, content: &str, _options: &ParseOptions) -> ParsedDocument {
        let blocks = blocks(content);

        let mut metadata = Metadata::new();
        let mut sections = Vec::new();
        let mut directives = 0;
        for block in &blocks {
            match block {
                Block::Section(section) => sections.push(section),
                Block::Directive(_) => directives += 1,
                Block::Field { name, value } => {
                    metadata
                        .entry(name.to_lowercase())
                        .or_insert_with(|| value.clone());
                }
                _ => {}
            }
        }
        if let Some(first) = sections.first() {
            metadata.insert("title".into(), first.title.clone());
        }
        let max_level = sections.iter().map(|s| s.level).max().unwrap_or(0);
        metadata.insert("sections".into(), sections.len().to_string());
        metadata.insert("directives".into(), directives.to_string());
        metadata.insert("max_level".into(), max_level.to_string());

        ParsedDocument::new(self.descriptor(), content, render(&blocks, true)).with_metadata(metadata)
    }

    fn to_html(&self, document: &ParsedDocument, light_mode: bool) -> String {
        render(&blocks(&document.raw_content), light_mode)
    }

    fn validate(&self, content: &str) -> Vec<String> {
        let mut findings = Vec::new();
        for block in blocks(content) {
            if let Block::Section(section) = block {
                if section.underline.chars().count() < section.title.chars().count() {
                    findings.push(format!("Section underline too short for '{}'", section.title));
                }
            }
        }
        for (index, line) in split_lines(content).into_iter().enumerate() {
            if !is_indented(line) && line.matches("``").count() % 2 == 1 {
                findings.push(line_finding(index, "Unclosed inline literal"));
            }
        }
        findings
    }
}

fn render(blocks: &[Block], light_mode: bool) -> String {
    let mut html = format!("<div class='rst-document {}'>", theme_class(light_mode));
    html.push_str(&stylesheet_or_empty(descriptor::RESTRUCTUREDTEXT.id, light_mode));

    let mut list = NestedList::default();
    for block in blocks {
        if let Block::Item { kind, level, text } = block {
            list.nest(&mut html, *kind, *level);
            html.push_str(&format!("<li>{}</li>", render_inline(text)));
            continue;
        }
        list.close(&mut html);

        match block {
            Block::Section(section) => html.push_str(&format!(
                "<div class='rst-section rst-section-{}'>{}</div>\n",
                section.level,
                render_inline(&section.title)
            )),
            Block::Directive(directive) => html.push_str(&directive_html(directive)),
            Block::Field { name, value } => html.push_str(&format!(
                "<div class='rst-field'><span class='rst-field-name'>{}:</span> {}</div>\n",
                escape_html(name),
                render_inline(value)
            )),
            Block::Paragraph(text) => {
                html.push_str(&format!("<p>{}</p>\n", render_inline(text)))
            }
            Block::Literal(lines) => html.push_str(&format!(
                "<pre class='rst-block'>{}</pre>\n",
                escape_html(&lines.join("\n"))
            )),
            Block::Quote(lines) => {
                html.push_str("<blockquote>");
                for paragraph in paragraphs(lines.iter().map(String::as_str)) {
                    html.push_str(&format!("<p>{}</p>", render_inline(&paragraph)));
                }
                html.push_str("</blockquote>\n");
            }
            Block::Transition => html.push_str("<hr>\n"),
            Block::Item { .. } => {}
        }
    }
    list.close(&mut html);
    html.push_str("</div>");
    html
}

/// Join runs of non-blank lines
fn paragraphs<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line.trim());
        }
    }
    if !current.is_empty() {
        out.push(current.join(" "));
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn directive_html(directive: &RstDirective) -> String {
    let name = directive.name.to_lowercase();
    let body = directive.body.iter().map(String::as_str);

    if ADMONITIONS.contains(&name.as_str()) {
        let text = std::iter::once(directive.argument.as_str())
            .chain(std::iter::once(""))
            .chain(body);
        let content: String = paragraphs(text)
            .iter()
            .map(|p| format!("<p>{}</p>", render_inline(p)))
            .collect();
        return format!(
            "<div class='rst-admonition {name}'><div class='rst-admonition-title'>{}</div>{content}</div>\n",
            capitalize(&name)
        );
    }

    match name.as_str() {
        "code" | "code-block" | "sourcecode" => {
            let class = match directive.argument.as_str() {
                "" => String::new(),
                language => format!(" class='language-{}'", escape_html(language)),
            };
            format!(
                "<pre class='rst-code'><code{class}>{}</code></pre>\n",
                escape_html(&directive.body.join("\n"))
            )
        }
        "image" | "figure" => {
            let alt = directive
                .options
                .get("alt")
                .unwrap_or(&directive.argument);
            let caption: String = paragraphs(body)
                .iter()
                .map(|p| format!("<p class='rst-caption'>{}</p>", render_inline(p)))
                .collect();
            format!(
                "<div class='rst-figure'><img src='{}' alt='{}'/>{caption}</div>\n",
                escape_html(&directive.argument),
                escape_html(alt)
            )
        }
        _ => {
            let header = format!(".. {}:: {}", directive.name, directive.argument);
            format!(
                "<div class='rst-directive'><div class='rst-directive-header'>{}</div><div class='rst-directive-content'>{}</div></div>\n",
                escape_html(header.trim_end()),
                escape_html(&directive.body.join("\n"))
            )
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Inline {
    Literal,
    Role,
    Link,
    Reference,
    Interpreted,
    Url,
}

/// Convert inline reST markup in one paragraph
pub fn render_inline(text: &str) -> String {
    let (mut spans, text) = InlineSpans::protect(text);
    let text = spans.extract(&text, &LITERAL, Inline::Literal);
    let text = spans.extract(&text, &ROLE, Inline::Role);
    let text = spans.extract(&text, &LINK, Inline::Link);
    let text = spans.extract(&text, &REFERENCE, Inline::Reference);
    let text = spans.extract(&text, &INTERPRETED, Inline::Interpreted);
    let text = spans.extract(&text, &URL, Inline::Url);

    let text = escape_html(&text);
    let text = BOLD.replace_all(&text, "<span class='rst-bold'>$1</span>");
    let text = ITALIC.replace_all(&text, "<span class='rst-italic'>$1</span>");

    spans.restore(&text, |span| match span.kind {
        Inline::Literal => format!("<code class='rst-literal'>{}</code>", escape_html(span.group(1))),
        Inline::Role => match span.group(1) {
            "code" | "literal" | "file" | "kbd" | "samp" => {
                format!("<code class='rst-literal'>{}</code>", escape_html(span.group(2)))
            }
            "strong" => format!("<span class='rst-bold'>{}</span>", escape_html(span.group(2))),
            "emphasis" => format!("<span class='rst-italic'>{}</span>", escape_html(span.group(2))),
            _ => escape_html(span.group(2)),
        },
        Inline::Link => format!(
            "<a class='rst-link' href='{}'>{}</a>",
            escape_html(span.group(2)),
            escape_html(span.group(1))
        ),
        Inline::Reference => format!("<span class='rst-reference'>{}</span>", escape_html(span.group(1))),
        Inline::Interpreted => format!("<cite>{}</cite>", escape_html(span.group(1))),
        Inline::Url => {
            let url = escape_html(span.group(0));
            format!("<a class='rst-link' href='{url}'>{url}</a>")
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "=====
Guide
=====

:Author: Kim
:Version: 2

Intro with **bold**, *soft* and ``x<y`` text
continues here.

Setup
-----

- first
- second

.. note:: Back up first.

   Really.

.. code-block:: python

   print(\"hi\")

Example::

   raw <text>

Details
~~~~~~~

See `Docs <https://docs.io>`_.

.. this is a comment

----

.. toctree::
   :maxdepth: 2

   intro";

    fn html() -> String {
        RestructuredTextParser
            .parse(DOC, &ParseOptions::new())
            .parsed_content
    }

    #[test]
    fn test_metadata() {
        let doc = RestructuredTextParser.parse(DOC, &ParseOptions::new());
        assert_eq!(doc.meta("sections"), Some("3"));
        assert_eq!(doc.meta("directives"), Some("3"));
        assert_eq!(doc.meta("max_level"), Some("3"));
        assert_eq!(doc.meta("title"), Some("Guide"));
        assert_eq!(doc.meta("author"), Some("Kim"));
        assert_eq!(doc.meta("version"), Some("2"));
    }

    #[test]
    fn test_sections_and_fields() {
        let html = html();
        assert!(html.starts_with("<div class='rst-document light'><style>"));
        assert!(html.contains("<div class='rst-section rst-section-1'>Guide</div>"));
        assert!(html.contains("<div class='rst-section rst-section-2'>Setup</div>"));
        assert!(html.contains("<div class='rst-section rst-section-3'>Details</div>"));
        assert!(html.contains("<div class='rst-field'><span class='rst-field-name'>Author:</span> Kim</div>"));
    }

    #[test]
    fn test_paragraph_inline() {
        assert!(html().contains(
            "<p>Intro with <span class='rst-bold'>bold</span>, <span class='rst-italic'>soft</span> and <code class='rst-literal'>x&lt;y</code> text continues here.</p>"
        ));
        assert!(html().contains("See <a class='rst-link' href='https://docs.io'>Docs</a>."));
    }

    #[test]
    fn test_directives() {
        let html = html();
        assert!(html.contains(
            "<div class='rst-admonition note'><div class='rst-admonition-title'>Note</div><p>Back up first.</p><p>Really.</p></div>"
        ));
        assert!(html.contains(
            "<pre class='rst-code'><code class='language-python'>print(&quot;hi&quot;)</code></pre>"
        ));
        assert!(html.contains(
            "<div class='rst-directive'><div class='rst-directive-header'>.. toctree::</div><div class='rst-directive-content'>intro</div></div>"
        ));
        assert!(!html.contains("comment"));
    }

    #[test]
    fn test_literal_list_and_transition() {
        let html = html();
        assert!(html.contains("<p>Example:</p>\n<pre class='rst-block'>raw &lt;text&gt;</pre>"));
        assert!(html.contains("<ul><li>first</li><li>second</li></ul>"));
        assert!(html.contains("<hr>"));
    }

    #[test]
    fn test_directive_options() {
        let blocks = blocks(".. image:: logo.png\n   :alt: Logo\n");
        let Some(Block::Directive(directive)) = blocks.first() else {
            panic!("expected a directive, got {blocks:?}");
        };
        assert_eq!(directive.argument, "logo.png");
        assert_eq!(directive.options.get("alt").map(String::as_str), Some("Logo"));
        assert!(directive.body.is_empty());
    }

    #[test]
    fn test_section_levels() {
        assert_eq!(section_level('='), 1);
        assert_eq!(section_level('"'), 5);
        assert_eq!(section_level('\''), 6);
        assert_eq!(section_level('#'), 6);
    }

    #[test]
    fn test_dark_mode() {
        let doc = RestructuredTextParser.parse(DOC, &ParseOptions::new());
        let html = RestructuredTextParser.to_html(&doc, false);
        assert!(html.contains("rst-document dark"));
        assert!(html.contains(".rst-document.dark"));
    }

    #[test]
    fn test_validate() {
        assert_eq!(
            RestructuredTextParser.validate("Title\n==="),
            vec!["Section underline too short for 'Title'"]
        );
        assert_eq!(
            RestructuredTextParser.validate("Use ``code"),
            vec!["Line 1: Unclosed inline literal"]
        );
        assert!(RestructuredTextParser.validate(DOC).is_empty());
    }
}
