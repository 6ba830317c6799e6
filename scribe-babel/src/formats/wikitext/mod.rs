//! Zim-flavoured wiki text
//!
//! | Source                  | HTML                                     |
//! |-------------------------|------------------------------------------|
//! | `====== Title ======`   | `<h1>` (six `=`) down to `<h5>` (two)     |
//! | `'''` fence             | `<pre>`                                  |
//! | `[ ]`, `[*]`, `[x]` ... | `<ul class='checklist'>` items           |
//! | `* item`                | `<ul>`                                   |
//! | `1. item`, `a. item`    | `<ol>`                                   |
//! | `''code''`              | `<code>`                                 |
//! | `[[target\|label]]`     | `<a>`                                    |
//! | `{{image.png}}`         | `<img>`                                  |
//! | `**b**` `//i//` `__h__` `~~s~~` `^{sup}` `_{sub}` | inline markup   |
//!
//! A leading Zim page header (`Content-Type: text/x-zim-wiki` lines, or a
//! `[DocumentAttributes]` block) is dropped before rendering.

use crate::descriptor::{self, FormatDescriptor};
use crate::document::{Metadata, ParseOptions, ParsedDocument};
use crate::format::Parser;
use crate::formats::common::{
    count_char, escape_html, line_finding, split_lines, stylesheet_or_empty, InlineSpans,
};
use once_cell::sync::Lazy;
use regex::Regex;

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(={2,6})\s+(.+?)\s+(={2,6})\s*$").unwrap());
static CHECKLIST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\[([ x*<>])\]\s+(.*)$").unwrap());
static UNORDERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\*\s+(.*)$").unwrap());
static ORDERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[0-9a-zA-Z]\.\s+(.*)$").unwrap());
static ZIM_HEADER_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z-]+:\s").unwrap());

static CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"''([^']+)''").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[([^|\]]+)(?:\|([^\]]+))?\]\]").unwrap());
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{([^}]+)\}\}").unwrap());
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"//([^/]+)//").unwrap());
static HIGHLIGHT: Lazy<Regex> = Lazy::new(|| Regex::new(r"__([^_]+)__").unwrap());
static STRIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"~~([^~]+)~~").unwrap());
static SUPERSCRIPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\^\{([^}]+)\}").unwrap());
static SUBSCRIPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"_\{([^}]+)\}").unwrap());

/// Strip a leading Zim page header, returning the body
pub fn strip_zim_header(content: &str) -> &str {
    let is_header = content.starts_with("Content-Type: text/x-zim-wiki")
        || content.starts_with("[DocumentAttributes]");
    if !is_header {
        return content;
    }
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let bare = line.trim_end_matches(['\r', '\n']);
        if bare.trim().is_empty() {
            return &content[offset + line.len()..];
        }
        if offset > 0 && !ZIM_HEADER_LINE.is_match(bare) && !content.starts_with('[') {
            return &content[offset..];
        }
        offset += line.len();
    }
    ""
}

/// Parser implementation for wiki text
#[derive(Debug, Default, Clone, Copy)]
pub struct WikitextParser;

impl Parser for WikitextParser {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &descriptor::WIKITEXT
    }

    fn parse(&self, content: &str, options: &ParseOptions) -> ParsedDocument {
        let body = strip_zim_header(content);
        let (html, headings) = render(body);

        let mut metadata = Metadata::new();
        metadata.insert("extension".into(), options.extension_or_empty());
        metadata.insert("lines".into(), split_lines(content).len().to_string());
        metadata.insert("hasZimHeader".into(), (body.len() != content.len()).to_string());
        metadata.insert("headings".into(), headings.to_string());

        ParsedDocument::new(self.descriptor(), content, html).with_metadata(metadata)
    }

    fn validate(&self, content: &str) -> Vec<String> {
        let mut findings = Vec::new();
        for (index, line) in split_lines(content).into_iter().enumerate() {
            if let Some(caps) = HEADING.captures(line) {
                let (left, right) = (caps[1].len(), caps[3].len());
                if left != right {
                    findings.push(line_finding(
                        index,
                        format!("Unbalanced heading markers (left={left}, right={right})"),
                    ));
                }
            }
            if count_char(line, '[') != count_char(line, ']') {
                findings.push(line_finding(index, "Unclosed brackets in links"));
            }
            if count_char(line, '{') != count_char(line, '}') {
                findings.push(line_finding(index, "Unclosed braces in images"));
            }
        }
        findings
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum List {
    Check,
    Unordered,
    Ordered,
}

fn close_list(html: &mut String, open: &mut Option<List>) {
    match open.take() {
        Some(List::Ordered) => html.push_str("</ol>"),
        Some(_) => html.push_str("</ul>"),
        None => {}
    }
}

fn enter_list(html: &mut String, open: &mut Option<List>, list: List) {
    if *open == Some(list) {
        return;
    }
    close_list(html, open);
    html.push_str(match list {
        List::Check => "<ul class='checklist'>",
        List::Unordered => "<ul>",
        List::Ordered => "<ol>",
    });
    *open = Some(list);
}

fn render(content: &str) -> (String, usize) {
    let mut html = String::from("<div class='wikitext'>");
    html.push_str(&stylesheet_or_empty(descriptor::WIKITEXT.id, true));

    let mut in_code = false;
    let mut open: Option<List> = None;
    let mut headings = 0;

    for line in split_lines(content) {
        if line.trim() == "'''" {
            if in_code {
                html.push_str("</pre>");
            } else {
                close_list(&mut html, &mut open);
                html.push_str("<pre>");
            }
            in_code = !in_code;
            continue;
        }
        if in_code {
            html.push_str(&escape_html(line));
            html.push('\n');
            continue;
        }

        if let Some(caps) = CHECKLIST.captures(line) {
            enter_list(&mut html, &mut open, List::Check);
            let class = match &caps[1] {
                "*" => " class='checked'",
                "x" => " class='crossed'",
                _ => "",
            };
            html.push_str(&format!("<li{class}>{}</li>", render_inline(&caps[2])));
        } else if let Some(caps) = UNORDERED.captures(line) {
            enter_list(&mut html, &mut open, List::Unordered);
            html.push_str(&format!("<li>{}</li>", render_inline(&caps[1])));
        } else if let Some(caps) = ORDERED.captures(line) {
            enter_list(&mut html, &mut open, List::Ordered);
            html.push_str(&format!("<li>{}</li>", render_inline(&caps[1])));
        } else {
            close_list(&mut html, &mut open);
            if line.trim().is_empty() {
                continue;
            }
            match HEADING.captures(line) {
                Some(caps) => {
                    let level = 7 - caps[1].len();
                    headings += 1;
                    html.push_str(&format!(
                        "<h{level}>{}</h{level}>",
                        render_inline(&caps[2])
                    ));
                }
                None => html.push_str(&format!("<p>{}</p>", render_inline(line))),
            }
        }
    }

    if in_code {
        html.push_str("</pre>");
    }
    close_list(&mut html, &mut open);
    html.push_str("</div>");
    (html, headings)
}

#[derive(Debug, Clone, Copy)]
enum Inline {
    Code,
    Link,
    Image,
}

/// Convert inline wiki markup in one line
pub fn render_inline(text: &str) -> String {
    let (mut spans, text) = InlineSpans::protect(text);
    let text = spans.extract(&text, &CODE, Inline::Code);
    let text = spans.extract(&text, &LINK, Inline::Link);
    let text = spans.extract(&text, &IMAGE, Inline::Image);

    let text = escape_html(&text);
    let text = BOLD.replace_all(&text, "<strong>$1</strong>");
    let text = ITALIC.replace_all(&text, "<em>$1</em>");
    let text = HIGHLIGHT.replace_all(&text, "<span class='highlight'>$1</span>");
    let text = STRIKE.replace_all(&text, "<s>$1</s>");
    let text = SUPERSCRIPT.replace_all(&text, "<sup>$1</sup>");
    let text = SUBSCRIPT.replace_all(&text, "<sub>$1</sub>");

    spans.restore(&text, |span| match span.kind {
        Inline::Code => format!("<code>{}</code>", escape_html(span.group(1))),
        Inline::Link => {
            let target = span.group(1);
            let label = match span.group(2) {
                "" => target,
                label => label,
            };
            format!("<a href='{}'>{}</a>", escape_html(target), escape_html(label))
        }
        Inline::Image => {
            let src = escape_html(span.group(1));
            format!("<img src='{src}' alt='{src}'/>")
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(content: &str) -> String {
        WikitextParser.parse(content, &ParseOptions::new()).parsed_content
    }

    #[test]
    fn test_heading_levels_invert() {
        let out = html("====== Top ======\n== Low ==");
        assert!(out.contains("<h1>Top</h1>"));
        assert!(out.contains("<h5>Low</h5>"));
    }

    #[test]
    fn test_zim_header_removed() {
        let content = "Content-Type: text/x-zim-wiki\nWiki-Format: zim 0.4\n\n====== Page ======\n";
        let doc = WikitextParser.parse(content, &ParseOptions::new());
        assert_eq!(doc.meta("hasZimHeader"), Some("true"));
        assert!(!doc.parsed_content.contains("Content-Type"));
        assert!(doc.parsed_content.contains("<h1>Page</h1>"));
        assert_eq!(doc.raw_content, content);
    }

    #[test]
    fn test_no_header_untouched() {
        assert_eq!(strip_zim_header("plain"), "plain");
    }

    #[test]
    fn test_lists_and_checklists() {
        let out = html("[ ] open\n[*] done\n[x] dropped\n* bullet\n1. first");
        assert!(out.contains(
            "<ul class='checklist'><li>open</li><li class='checked'>done</li><li class='crossed'>dropped</li></ul>"
        ));
        assert!(out.contains("<ul><li>bullet</li></ul><ol><li>first</li></ol>"));
    }

    #[test]
    fn test_code_block_closed_at_end() {
        let out = html("'''\n<raw> **x**");
        assert!(out.ends_with("<pre>&lt;raw&gt; **x**\n</pre></div>"));
    }

    #[test]
    fn test_inline_markup() {
        assert_eq!(
            render_inline("**b** //i// __h__ ~~s~~ x^{2} H_{2}O"),
            "<strong>b</strong> <em>i</em> <span class='highlight'>h</span> <s>s</s> x<sup>2</sup> H<sub>2</sub>O"
        );
        assert_eq!(
            render_inline("''a<b'' [[Page|the page]] [[Other]] {{pic.png}}"),
            "<code>a&lt;b</code> <a href='Page'>the page</a> <a href='Other'>Other</a> <img src='pic.png' alt='pic.png'/>"
        );
    }

    #[test]
    fn test_validate() {
        let findings = WikitextParser.validate("=== Bad ==\n[[open\n{{img");
        assert_eq!(
            findings,
            vec![
                "Line 1: Unbalanced heading markers (left=3, right=2)",
                "Line 2: Unclosed brackets in links",
                "Line 3: Unclosed braces in images",
            ]
        );
    }
}
