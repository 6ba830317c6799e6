//! Textile markup
//!
//! Block signatures start a line: `h1.`..`h6.`, `p.`, `bq.`, `bc.` and `pre.`. A signature
//! with one dot covers its paragraph up to the next blank line; `bc..` and `pre..` run on until
//! the next signature. Lists nest by repeating `*` or `#`, and `|` rows form tables with
//! `_.` header cells. Plain lines within a paragraph are kept apart with `<br>`.

use crate::descriptor::{self, FormatDescriptor};
use crate::document::{Metadata, ParseOptions, ParsedDocument};
use crate::format::Parser;
use crate::formats::common::{
    escape_html, line_finding, split_lines, stylesheet_or_empty, InlineSpans, ListKind,
    NestedList,
};
use once_cell::sync::Lazy;
use regex::Regex;

static BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(h[1-6]|bq|bc|pre|p)(\.\.?)(?:\s+(.*))?$").unwrap());
static HEADING_LEVEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^h([0-9])\.\.?\s+").unwrap());
static LIST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([*#]+)\s+(.+)$").unwrap());

static CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@([^@]+)@").unwrap());
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]+)":([^\s<>"]*[^\s<>".,;:!?)])"#).unwrap());
static IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!([^!\s(][^!(]*?)(?:\(([^)]*)\))?!").unwrap());
static UNCLOSED_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(^|\s)@\S").unwrap());
static UNCLOSED_IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"![^\s!]").unwrap());

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static STRONG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[\s(])\*([^*\s](?:[^*]*[^*\s])?)\*($|[\s.,;:!?)])").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"__([^_]+)__").unwrap());
static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[\s(])_([^_\s](?:[^_]*[^_\s])?)_($|[\s.,;:!?)])").unwrap());
static CITATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\?\?([^?]+)\?\?").unwrap());
static DELETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[\s(])-([^-\s](?:[^-]*[^-\s])?)-($|[\s.,;:!?)])").unwrap());
static INSERTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[\s(])\+([^+\s](?:[^+]*[^+\s])?)\+($|[\s.,;:!?)])").unwrap());
static SUPERSCRIPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\^([^^\s]+)\^").unwrap());
static SUBSCRIPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"~([^~\s]+)~").unwrap());

/// Parser implementation for Textile
#[derive(Debug, Default, Clone, Copy)]
pub struct TextileParser;

impl Parser for TextileParser {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &descriptor::TEXTILE
    }

    fn parse(&self, content: &str, options: &ParseOptions) -> ParsedDocument {
        let lines = split_lines(content);
        let headings = lines
            .iter()
            .filter_map(|line| BLOCK.captures(line.trim()))
            .filter(|caps| caps[1].starts_with('h'))
            .count();

        let mut metadata = Metadata::new();
        metadata.insert("extension".into(), options.extension_or_empty());
        metadata.insert("lines".into(), lines.len().to_string());
        metadata.insert("headings".into(), headings.to_string());

        ParsedDocument::new(self.descriptor(), content, render(content)).with_metadata(metadata)
    }

    fn validate(&self, content: &str) -> Vec<String> {
        let mut findings = Vec::new();
        for (index, line) in split_lines(content).into_iter().enumerate() {
            let trimmed = line.trim();

            if let Some(caps) = HEADING_LEVEL.captures(trimmed) {
                let level: usize = caps[1].parse().unwrap_or(0);
                if !(1..=6).contains(&level) {
                    findings.push(line_finding(
                        index,
                        format!("Invalid heading level {level} (must be 1-6)"),
                    ));
                }
            }
            if UNCLOSED_CODE.is_match(&CODE.replace_all(trimmed, "")) {
                findings.push(line_finding(index, "Unclosed inline code marker (@)"));
            }
            if UNCLOSED_IMAGE.is_match(&IMAGE.replace_all(trimmed, "")) {
                findings.push(line_finding(index, "Unclosed image marker (!)"));
            }
        }
        findings
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Text {
    Closed,
    Paragraph,
    Quote,
    Pre { code: bool, extended: bool },
}

struct Writer {
    html: String,
    text: Text,
    list: NestedList,
    table: bool,
}

impl Writer {
    fn close_text(&mut self) {
        self.html.push_str(match self.text {
            Text::Closed => "",
            Text::Paragraph => "</p>",
            Text::Quote => "</p></blockquote>",
            Text::Pre { code: true, .. } => "</code></pre>",
            Text::Pre { code: false, .. } => "</pre>",
        });
        self.text = Text::Closed;
    }

    fn close_table(&mut self) {
        if self.table {
            self.html.push_str("</table>");
            self.table = false;
        }
    }

    fn close_all(&mut self) {
        self.close_text();
        self.list.close(&mut self.html);
        self.close_table();
    }

    fn pre_line(&mut self, line: &str) {
        self.html.push_str(&escape_html(line));
        self.html.push('\n');
    }
}

fn render(content: &str) -> String {
    let mut out = Writer {
        html: String::from("<div class='textile'>"),
        text: Text::Closed,
        list: NestedList::default(),
        table: false,
    };
    out.html
        .push_str(&stylesheet_or_empty(descriptor::TEXTILE.id, true));

    for line in split_lines(content) {
        let trimmed = line.trim();

        if let Text::Pre { extended, .. } = out.text {
            let ends = if extended {
                BLOCK.is_match(trimmed)
            } else {
                trimmed.is_empty()
            };
            if !ends {
                out.pre_line(line);
                continue;
            }
            out.close_text();
        }

        if trimmed.is_empty() {
            out.close_all();
            continue;
        }

        if let Some(caps) = BLOCK.captures(trimmed) {
            out.close_all();
            let rest = caps.get(3).map_or("", |m| m.as_str());
            match &caps[1] {
                tag @ ("bc" | "pre") => {
                    let code = tag == "bc";
                    out.html
                        .push_str(if code { "<pre><code>" } else { "<pre>" });
                    out.text = Text::Pre {
                        code,
                        extended: &caps[2] == "..",
                    };
                    if !rest.is_empty() {
                        out.pre_line(rest);
                    }
                }
                "bq" => {
                    out.html
                        .push_str(&format!("<blockquote><p>{}", render_inline(rest)));
                    out.text = Text::Quote;
                }
                "p" => {
                    out.html.push_str(&format!("<p>{}", render_inline(rest)));
                    out.text = Text::Paragraph;
                }
                heading => {
                    let level = &heading[1..];
                    out.html
                        .push_str(&format!("<h{level}>{}</h{level}>", render_inline(rest)));
                }
            }
            continue;
        }

        if trimmed.len() >= 2 && trimmed.starts_with('|') && trimmed.ends_with('|') {
            out.close_text();
            out.list.close(&mut out.html);
            if !out.table {
                out.html.push_str("<table>");
                out.table = true;
            }
            out.html.push_str(&table_row(trimmed));
        } else if let Some(caps) = LIST.captures(trimmed) {
            out.close_text();
            out.close_table();
            let marker = &caps[1];
            let kind = if marker.ends_with('#') {
                ListKind::Ordered
            } else {
                ListKind::Unordered
            };
            out.list.nest(&mut out.html, kind, marker.len());
            out.html
                .push_str(&format!("<li>{}</li>", render_inline(&caps[2])));
        } else {
            match out.text {
                Text::Paragraph | Text::Quote => out.html.push_str("<br>"),
                _ => {
                    out.close_all();
                    out.html.push_str("<p>");
                    out.text = Text::Paragraph;
                }
            }
            out.html.push_str(&render_inline(trimmed));
        }
    }

    out.close_all();
    out.html.push_str("</div>");
    out.html
}

fn table_row(trimmed: &str) -> String {
    let mut html = String::from("<tr>");
    for cell in trimmed[1..trimmed.len() - 1].split('|') {
        match cell.trim().strip_prefix("_.") {
            Some(header) => html.push_str(&format!("<th>{}</th>", render_inline(header.trim()))),
            None => html.push_str(&format!("<td>{}</td>", render_inline(cell.trim()))),
        }
    }
    html.push_str("</tr>");
    html
}

#[derive(Debug, Clone, Copy)]
enum Inline {
    Code,
    Link,
    Image,
}

/// Convert inline Textile markup in one line
pub fn render_inline(text: &str) -> String {
    let (mut spans, text) = InlineSpans::protect(text);
    let text = spans.extract(&text, &CODE, Inline::Code);
    let text = spans.extract(&text, &LINK, Inline::Link);
    let text = spans.extract(&text, &IMAGE, Inline::Image);

    let text = escape_html(&text);
    let text = BOLD.replace_all(&text, "<b>$1</b>");
    let text = STRONG.replace_all(&text, "$1<strong>$2</strong>$3");
    let text = ITALIC.replace_all(&text, "<i>$1</i>");
    let text = EMPHASIS.replace_all(&text, "$1<em>$2</em>$3");
    let text = CITATION.replace_all(&text, "<cite>$1</cite>");
    let text = DELETED.replace_all(&text, "$1<del>$2</del>$3");
    let text = INSERTED.replace_all(&text, "$1<ins>$2</ins>$3");
    let text = SUPERSCRIPT.replace_all(&text, "<sup>$1</sup>");
    let text = SUBSCRIPT.replace_all(&text, "<sub>$1</sub>");

    spans.restore(&text, |span| match span.kind {
        Inline::Code => format!("<code>{}</code>", escape_html(span.group(1))),
        Inline::Link => format!(
            "<a href='{}'>{}</a>",
            escape_html(span.group(2)),
            escape_html(span.group(1))
        ),
        Inline::Image => {
            let alt = match span.group(2) {
                "" => span.group(1),
                alt => alt,
            };
            format!(
                "<img src='{}' alt='{}'/>",
                escape_html(span.group(1)),
                escape_html(alt)
            )
        }
    })
}
