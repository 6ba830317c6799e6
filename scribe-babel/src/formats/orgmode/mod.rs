//! Org Mode outlines
//!
//! Headings are `*` runs with an optional `TODO`/`DONE` keyword. `:PROPERTIES:` drawers list
//! `:KEY: value` pairs, `:LOGBOOK:` drawers are hidden, and `#+BEGIN_x`/`#+END_x` blocks are
//! shown verbatim under their header line. Other `#+KEYWORD: value` lines only feed metadata.
//!
//! Blocks left open at the end of input are closed in the output and reported by `validate`.

use std::collections::BTreeMap;

use crate::descriptor::{self, FormatDescriptor};
use crate::document::{Metadata, ParseOptions, ParsedDocument};
use crate::format::Parser;
use crate::formats::common::{
    escape_html, split_lines, stylesheet_or_empty, theme_class, InlineSpans, ListKind,
    NestedList,
};
use once_cell::sync::Lazy;
use regex::Regex;

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\*+)\s+(.*)$").unwrap());
static TODO_KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(TODO|DONE)(?:\s+|$)(.*)$").unwrap());
static PROPERTY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:([^:\s]+):\s*(.*)$").unwrap());
static KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*#\+(\w+):\s*(.*)$").unwrap());
static BEGIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*#\+begin_\w+").unwrap());
static END: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*#\+end_\w+\s*$").unwrap());
static RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-{5,}$").unwrap());
static UNORDERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)[-+]\s+(.+)$").unwrap());
static ORDERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)\d+[.)]\s+(.+)$").unwrap());

static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]\[]+)\](?:\[([^\]]+)\])?\]").unwrap());
static VERBATIM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[\s(])=([^=\s](?:[^=]*[^=\s])?)=($|[\s.,;:!?)])").unwrap());
static CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[\s(])~([^~\s](?:[^~]*[^~\s])?)~($|[\s.,;:!?)])").unwrap());
static BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[\s(])\*([^*\s](?:[^*]*[^*\s])?)\*($|[\s.,;:!?)])").unwrap());
static ITALIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[\s(])/([^/\s](?:[^/]*[^/\s])?)/($|[\s.,;:!?)])").unwrap());
static UNDERLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[\s(])_([^_\s](?:[^_]*[^_\s])?)_($|[\s.,;:!?)])").unwrap());
static STRIKETHROUGH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[\s(])\+([^+\s](?:[^+]*[^+\s])?)\+($|[\s.,;:!?)])").unwrap());

/// One outline heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgHeading {
    pub level: usize,
    /// `TODO` or `DONE`
    pub keyword: Option<String>,
    pub title: String,
}

pub fn parse_heading(line: &str) -> Option<OrgHeading> {
    let caps = HEADING.captures(line)?;
    let title = caps[2].trim();
    let (keyword, title) = match TODO_KEYWORD.captures(title) {
        Some(todo) => (Some(todo[1].to_string()), todo[2].trim().to_string()),
        None => (None, title.to_string()),
    };
    Some(OrgHeading {
        level: caps[1].len(),
        keyword,
        title,
    })
}

/// Headings, drawer properties and `#+KEYWORD:` values of a document
#[derive(Debug, Clone, Default)]
pub struct Outline {
    pub headings: Vec<OrgHeading>,
    pub properties: BTreeMap<String, String>,
    /// Keyword names are lowercased; the first occurrence wins
    pub keywords: Metadata,
}

impl Outline {
    pub fn todo_count(&self) -> usize {
        self.headings.iter().filter(|h| h.keyword.is_some()).count()
    }

    pub fn max_level(&self) -> usize {
        self.headings.iter().map(|h| h.level).max().unwrap_or(0)
    }
}

pub fn outline(content: &str) -> Outline {
    let mut outline = Outline::default();
    let mut in_block = false;
    let mut in_properties = false;

    for line in split_lines(content) {
        if in_block {
            in_block = !END.is_match(line);
            continue;
        }
        if BEGIN.is_match(line) {
            in_block = true;
            continue;
        }
        let trimmed = line.trim();
        if in_properties {
            if trimmed.eq_ignore_ascii_case(":END:") {
                in_properties = false;
            } else if let Some(caps) = PROPERTY.captures(trimmed) {
                outline
                    .properties
                    .insert(caps[1].to_string(), caps[2].trim().to_string());
            }
            continue;
        }

        if drawer(trimmed) == Some(true) {
            in_properties = true;
        } else if let Some(heading) = parse_heading(line) {
            outline.headings.push(heading);
        } else if let Some(caps) = KEYWORD.captures(line) {
            outline
                .keywords
                .entry(caps[1].to_lowercase())
                .or_insert_with(|| caps[2].trim().to_string());
        }
    }
    outline
}

/// `Some(true)` for a property drawer, `Some(false)` for a hidden one
fn drawer(trimmed: &str) -> Option<bool> {
    let name = trimmed.strip_prefix(':')?.strip_suffix(':')?;
    match name.to_ascii_uppercase().as_str() {
        "PROPERTIES" => Some(true),
        "LOGBOOK" => Some(false),
        _ => None,
    }
}

/// Parser implementation for Org Mode
#[derive(Debug, Default, Clone, Copy)]
pub struct OrgModeParser;

impl Parser for OrgModeParser {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &descriptor::ORGMODE
    }

    fn parse(&self, content: &str, _options: &ParseOptions) -> ParsedDocument {
        let outline = outline(content);

        let mut metadata = outline.keywords.clone();
        metadata.insert("headings".into(), outline.headings.len().to_string());
        metadata.insert("todos".into(), outline.todo_count().to_string());
        metadata.insert("properties".into(), outline.properties.len().to_string());
        metadata.insert("max_level".into(), outline.max_level().to_string());

        ParsedDocument::new(self.descriptor(), content, render(content, true)).with_metadata(metadata)
    }

    fn to_html(&self, document: &ParsedDocument, light_mode: bool) -> String {
        render(&document.raw_content, light_mode)
    }

    fn validate(&self, content: &str) -> Vec<String> {
        let mut findings = Vec::new();

        let lines = split_lines(content);
        let begins = lines.iter().filter(|line| BEGIN.is_match(line)).count();
        let ends = lines.iter().filter(|line| END.is_match(line)).count();
        if begins != ends {
            findings.push("Mismatched block delimiters".to_string());
        }

        for heading in outline(content).headings {
            if heading.level > 6 {
                findings.push(format!("Heading level {} exceeds maximum of 6", heading.level));
            }
        }
        findings
    }
}

struct Writer {
    html: String,
    list: NestedList,
    paragraph: Vec<String>,
}

impl Writer {
    fn flush_paragraph(&mut self) {
        if !self.paragraph.is_empty() {
            self.html
                .push_str(&format!("<p>{}</p>\n", self.paragraph.join(" ")));
            self.paragraph.clear();
        }
    }

    fn close_blocks(&mut self) {
        self.flush_paragraph();
        self.list.close(&mut self.html);
    }

    fn item(&mut self, kind: ListKind, indent: usize, text: &str) {
        self.flush_paragraph();
        self.list.nest(&mut self.html, kind, indent / 2 + 1);
        self.html.push_str(&format!("<li>{}</li>", render_inline(text)));
    }
}

fn render(content: &str, light_mode: bool) -> String {
    let mut out = Writer {
        html: format!("<div class='org-mode-document {}'>", theme_class(light_mode)),
        list: NestedList::default(),
        paragraph: Vec::new(),
    };
    out.html
        .push_str(&stylesheet_or_empty(descriptor::ORGMODE.id, light_mode));

    let mut block: Option<Vec<String>> = None;
    let mut open_drawer: Option<bool> = None;

    for line in split_lines(content) {
        if let Some(lines) = &mut block {
            if END.is_match(line) {
                out.html.push_str(&lines.join("\n"));
                out.html.push_str("</div></div>\n");
                block = None;
            } else {
                lines.push(escape_html(line));
            }
            continue;
        }

        let trimmed = line.trim();
        if let Some(properties) = open_drawer {
            if trimmed.eq_ignore_ascii_case(":END:") {
                if properties {
                    out.html.push_str("</div>\n");
                }
                open_drawer = None;
            } else if let Some(caps) = PROPERTY.captures(trimmed).filter(|_| properties) {
                out.html.push_str(&format!(
                    "<div class='org-property'><span class='org-property-key'>{}:</span> <span class='org-property-value'>{}</span></div>",
                    escape_html(&caps[1]),
                    escape_html(caps[2].trim())
                ));
            }
            continue;
        }

        if BEGIN.is_match(line) {
            out.close_blocks();
            out.html.push_str(&format!(
                "<div class='org-block'><div class='org-block-header'>{}</div><div class='org-block-content'>",
                escape_html(trimmed)
            ));
            block = Some(Vec::new());
        } else if let Some(properties) = drawer(trimmed) {
            out.close_blocks();
            if properties {
                out.html.push_str("<div class='org-properties'>");
            }
            open_drawer = Some(properties);
        } else if let Some(heading) = parse_heading(line) {
            out.close_blocks();
            out.html.push_str(&heading_html(&heading));
        } else if trimmed.is_empty() {
            out.close_blocks();
        } else if KEYWORD.is_match(line) || trimmed == "#" || trimmed.starts_with("# ") {
            continue;
        } else if RULE.is_match(trimmed) {
            out.close_blocks();
            out.html.push_str("<hr>\n");
        } else if let Some(caps) = UNORDERED.captures(line) {
            out.item(ListKind::Unordered, caps[1].len(), &caps[2]);
        } else if let Some(caps) = ORDERED.captures(line) {
            out.item(ListKind::Ordered, caps[1].len(), &caps[2]);
        } else {
            out.list.close(&mut out.html);
            out.paragraph.push(render_inline(trimmed));
        }
    }

    if let Some(lines) = block {
        out.html.push_str(&lines.join("\n"));
        out.html.push_str("</div></div>\n");
    }
    if open_drawer == Some(true) {
        out.html.push_str("</div>\n");
    }
    out.close_blocks();
    out.html.push_str("</div>");
    out.html
}

fn heading_html(heading: &OrgHeading) -> String {
    let level = heading.level.min(6);
    let keyword = match &heading.keyword {
        Some(keyword) => format!(
            "<span class='org-todo org-todo-{}'>{keyword}</span> ",
            keyword.to_lowercase()
        ),
        None => String::new(),
    };
    format!(
        "<div class='org-heading org-heading-{level}'>{keyword}{}</div>\n",
        render_inline(&heading.title)
    )
}

#[derive(Debug, Clone, Copy)]
enum Inline {
    Link,
    Verbatim,
    Code,
}

/// Convert inline Org markup in one line
pub fn render_inline(text: &str) -> String {
    let (mut spans, text) = InlineSpans::protect(text);
    let text = spans.extract(&text, &LINK, Inline::Link);
    let text = spans.extract(&text, &VERBATIM, Inline::Verbatim);
    let text = spans.extract(&text, &CODE, Inline::Code);

    let text = escape_html(&text);
    let text = BOLD.replace_all(&text, "$1<span class='org-bold'>$2</span>$3");
    let text = ITALIC.replace_all(&text, "$1<span class='org-italic'>$2</span>$3");
    let text = UNDERLINE.replace_all(&text, "$1<span class='org-underline'>$2</span>$3");
    let text = STRIKETHROUGH.replace_all(&text, "$1<span class='org-strikethrough'>$2</span>$3");

    spans.restore(&text, |span| match span.kind {
        Inline::Link => {
            let target = span.group(1);
            let label = match span.group(2) {
                "" => target,
                label => label,
            };
            format!(
                "<a href='{}' class='org-link'>{}</a>",
                escape_html(target),
                escape_html(label)
            )
        }
        Inline::Verbatim | Inline::Code => {
            let class = match span.kind {
                Inline::Code => "org-code",
                _ => "org-verbatim",
            };
            format!(
                "{}<span class='{class}'>{}</span>{}",
                escape_html(span.group(1)),
                escape_html(span.group(2)),
                escape_html(span.group(3))
            )
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "#+TITLE: Plans
* TODO Write report
:PROPERTIES:
:OWNER: sam
:EFFORT: 2h
:END:
** DONE Draft outline
*** Notes
Some *bold* and /italic/ text.";

    #[test]
    fn test_metadata() {
        let doc = OrgModeParser.parse(DOC, &ParseOptions::new());
        assert_eq!(doc.meta("headings"), Some("3"));
        assert_eq!(doc.meta("todos"), Some("2"));
        assert_eq!(doc.meta("properties"), Some("2"));
        assert_eq!(doc.meta("max_level"), Some("3"));
        assert_eq!(doc.meta("title"), Some("Plans"));
    }

    #[test]
    fn test_render_outline() {
        let html = OrgModeParser.parse(DOC, &ParseOptions::new()).parsed_content;
        assert!(html.starts_with("<div class='org-mode-document light'><style>"));
        assert!(html.contains(
            "<div class='org-heading org-heading-1'><span class='org-todo org-todo-todo'>TODO</span> Write report</div>"
        ));
        assert!(html.contains(
            "<div class='org-property'><span class='org-property-key'>OWNER:</span> <span class='org-property-value'>sam</span></div>"
        ));
        assert!(html.contains("<span class='org-todo org-todo-done'>DONE</span> Draft outline"));
        assert!(html.contains(
            "<p>Some <span class='org-bold'>bold</span> and <span class='org-italic'>italic</span> text.</p>"
        ));
        assert!(!html.contains("#+TITLE"));
    }

    #[test]
    fn test_dark_mode() {
        let doc = OrgModeParser.parse(DOC, &ParseOptions::new());
        let html = OrgModeParser.to_html(&doc, false);
        assert!(html.contains("org-mode-document dark"));
        assert!(html.contains(".org-mode-document.dark"));
    }

    #[test]
    fn test_lists() {
        let html = OrgModeParser
            .parse("- one\n  - two\n1. first", &ParseOptions::new())
            .parsed_content;
        assert!(html.contains("<ul><li>one</li><ul><li>two</li></ul></ul><ol><li>first</li></ol>"));
    }

    #[test]
    fn test_block_is_verbatim() {
        let html = OrgModeParser
            .parse("#+BEGIN_SRC python\nprint('<hi>')\n#+END_SRC", &ParseOptions::new())
            .parsed_content;
        assert!(html.contains(
            "<div class='org-block'><div class='org-block-header'>#+BEGIN_SRC python</div><div class='org-block-content'>print(&#39;&lt;hi&gt;&#39;)</div></div>"
        ));
    }

    #[test]
    fn test_unclosed_block() {
        let html = OrgModeParser
            .parse("#+BEGIN_QUOTE\ntext", &ParseOptions::new())
            .parsed_content;
        assert!(html.ends_with("<div class='org-block-content'>text</div></div>\n</div>"));
        assert_eq!(
            OrgModeParser.validate("#+BEGIN_QUOTE\ntext"),
            vec!["Mismatched block delimiters"]
        );
    }

    #[test]
    fn test_deep_heading() {
        let doc = OrgModeParser.parse("******* deep", &ParseOptions::new());
        assert!(doc.parsed_content.contains("org-heading-6"));
        assert_eq!(
            OrgModeParser.validate("******* deep"),
            vec!["Heading level 7 exceeds maximum of 6"]
        );
    }

    #[test]
    fn test_inline_links_and_code() {
        assert_eq!(
            render_inline("see [[https://orgmode.org][Org]] or [[file.org]] and ~a<b~ or =x_y_z="),
            "see <a href='https://orgmode.org' class='org-link'>Org</a> or <a href='file.org' class='org-link'>file.org</a> and <span class='org-code'>a&lt;b</span> or <span class='org-verbatim'>x_y_z</span>"
        );
    }

    #[test]
    fn test_bold_line_is_not_heading() {
        assert_eq!(parse_heading("*bold* start"), None);
        assert_eq!(
            parse_heading("** TODO  Ship it"),
            Some(OrgHeading {
                level: 2,
                keyword: Some("TODO".into()),
                title: "Ship it".into()
            })
        );
    }
}
