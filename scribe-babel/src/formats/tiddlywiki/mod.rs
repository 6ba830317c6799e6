//! TiddlyWiki tiddlers
//!
//! A tiddler opens with `field: value` lines (title, tags, created, modified, type and
//! custom fields) ended by a blank line; the first line without a colon also ends the header.
//! The body is wikitext: `!` headings, `*`/`#` nested lists, ```` ``` ```` code fences,
//! `<<<` block quotes, `---` rules, plus inline markup:
//!
//! | Source                         | HTML                         |
//! |--------------------------------|------------------------------|
//! | `` `code` ``                   | `<code>`                     |
//! | `''bold''`                     | `<strong>`                   |
//! | `//italic//`                   | `<em>`                       |
//! | `__underline__`                | `<u>`                        |
//! | `~~strike~~`                   | `<s>`                        |
//! | `^^sup^^`, `,,sub,,`           | `<sup>`, `<sub>`             |
//! | `[[Target]]`, `[[Target\|Label]]` | `<a href>`                |
//! | `[ext[url]]`, `[ext[url\|Label]]` | `<a href target='_blank'>` |
//! | `[img[src]]`                   | `<img>`                      |

use crate::descriptor::{self, FormatDescriptor};
use crate::document::{Metadata, ParseOptions, ParsedDocument};
use crate::format::Parser;
use crate::formats::common::{
    count_char, escape_html, line_finding, split_lines, stylesheet_or_empty, InlineSpans,
    ListKind, NestedList,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static UNORDERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\*+)\s+(.+)$").unwrap());
static ORDERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#+)\s+(.+)$").unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(!+)\s+(.+)$").unwrap());
static RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-{3,}$").unwrap());

static CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[([^|\]]+)(?:\|([^\]]+))?\]\]").unwrap());
static EXTERNAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[ext\[([^|\]]+)(?:\|([^\]]+))?\]\]").unwrap());
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[img\[([^\]]+)\]\]").unwrap());
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"''(.+?)''").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"//(.+?)//").unwrap());
static UNDERLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"__(.+?)__").unwrap());
static STRIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"~~(.+?)~~").unwrap());
static SUPERSCRIPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\^\^(.+?)\^\^").unwrap());
static SUBSCRIPT: Lazy<Regex> = Lazy::new(|| Regex::new(r",,(.+?),,").unwrap());
static BOLD_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"''").unwrap());

/// Header fields of a tiddler
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TiddlerFields {
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub created: Option<String>,
    pub modified: Option<String>,
    pub kind: Option<String>,
    pub custom: BTreeMap<String, String>,
}

/// Split a tiddler into its header fields and body text
pub fn split_tiddler(content: &str) -> (TiddlerFields, String) {
    let lines = split_lines(content);
    let mut fields: BTreeMap<String, String> = BTreeMap::new();
    let mut body_start = lines.len();

    for (index, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            body_start = index + 1;
            break;
        }
        match line.find(':') {
            Some(colon) if colon > 0 => {
                let key = line[..colon].trim().to_lowercase();
                fields.insert(key, line[colon + 1..].trim().to_string());
            }
            _ => {
                body_start = index;
                break;
            }
        }
    }

    let body = lines[body_start..].join("\n");
    let tags = fields
        .remove("tags")
        .map(|tags| tags.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();
    let header = TiddlerFields {
        title: fields.remove("title"),
        tags,
        created: fields.remove("created"),
        modified: fields.remove("modified"),
        kind: fields.remove("type"),
        custom: fields,
    };
    (header, body)
}

/// Parser implementation for TiddlyWiki
#[derive(Debug, Default, Clone, Copy)]
pub struct TiddlyWikiParser;

impl Parser for TiddlyWikiParser {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &descriptor::TIDDLYWIKI
    }

    fn parse(&self, content: &str, options: &ParseOptions) -> ParsedDocument {
        let (fields, body) = split_tiddler(content);

        let mut metadata = Metadata::new();
        metadata.insert("extension".into(), options.extension_or_empty());
        metadata.insert("lines".into(), split_lines(content).len().to_string());
        if let Some(title) = &fields.title {
            metadata.insert("title".into(), title.clone());
        }
        if !fields.tags.is_empty() {
            metadata.insert("tags".into(), fields.tags.join(", "));
        }
        if let Some(created) = &fields.created {
            metadata.insert("created".into(), created.clone());
        }
        if let Some(modified) = &fields.modified {
            metadata.insert("modified".into(), modified.clone());
        }
        if let Some(kind) = &fields.kind {
            metadata.insert("type".into(), kind.clone());
        }

        ParsedDocument::new(self.descriptor(), content, render(&fields, &body))
            .with_metadata(metadata)
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
            if count_char(trimmed, '[') != count_char(trimmed, ']') {
                findings.push(line_finding(index, "Unclosed brackets in links"));
            }
            if BOLD_MARKER.find_iter(trimmed).count() % 2 != 0 {
                findings.push(line_finding(index, "Unclosed quotes (for bold '')"));
            }
        }
        findings
    }
}

fn render(fields: &TiddlerFields, body: &str) -> String {
    let mut html = String::from("<div class='tiddlywiki'>");
    html.push_str(&stylesheet_or_empty(descriptor::TIDDLYWIKI.id, true));

    if fields.title.is_some() || !fields.tags.is_empty() {
        html.push_str("<div class='tiddler-meta'>");
        if let Some(title) = &fields.title {
            html.push_str(&format!("<div class='tiddler-title'>{}</div>", escape_html(title)));
        }
        if !fields.tags.is_empty() {
            html.push_str("<div class='tiddler-tags'>");
            for tag in &fields.tags {
                html.push_str(&format!("<span class='tiddler-tag'>{}</span>", escape_html(tag)));
            }
            html.push_str("</div>");
        }
        html.push_str("</div>");
    }

    let mut list = NestedList::default();
    let mut in_code = false;
    let mut in_quote = false;

    for line in split_lines(body) {
        let trimmed = line.trim();

        if trimmed.starts_with("```") {
            if in_code {
                html.push_str("</pre>");
            } else {
                list.close(&mut html);
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

        if trimmed == "<<<" {
            list.close(&mut html);
            html.push_str(if in_quote { "</blockquote>" } else { "<blockquote>" });
            in_quote = !in_quote;
            continue;
        }

        if let Some(caps) = UNORDERED.captures(trimmed) {
            list.nest(&mut html, ListKind::Unordered, caps[1].len());
            html.push_str(&format!("<li>{}</li>", render_inline(&caps[2])));
        } else if let Some(caps) = ORDERED.captures(trimmed) {
            list.nest(&mut html, ListKind::Ordered, caps[1].len());
            html.push_str(&format!("<li>{}</li>", render_inline(&caps[2])));
        } else {
            list.close(&mut html);
            if trimmed.is_empty() {
                continue;
            }
            if let Some(caps) = HEADING.captures(trimmed) {
                let level = caps[1].len().min(6);
                html.push_str(&format!("<h{level}>{}</h{level}>", render_inline(&caps[2])));
            } else if RULE.is_match(trimmed) {
                html.push_str("<hr>");
            } else if let Some(quoted) = trimmed.strip_prefix("> ") {
                html.push_str(&format!("<blockquote>{}</blockquote>", render_inline(quoted)));
            } else {
                html.push_str(&format!("<p>{}</p>", render_inline(trimmed)));
            }
        }
    }

    list.close(&mut html);
    if in_code {
        html.push_str("</pre>");
    }
    if in_quote {
        html.push_str("</blockquote>");
    }
    html.push_str("</div>");
    html
}

#[derive(Debug, Clone, Copy)]
enum Inline {
    Code,
    Link,
    External,
    Image,
    Styled(&'static str),
}

/// Convert inline TiddlyWiki markup in one line
pub fn render_inline(text: &str) -> String {
    let (mut spans, text) = InlineSpans::protect(text);
    let mut text = spans.extract(&text, &CODE, Inline::Code);
    for (pattern, kind) in [
        (&*EXTERNAL, Inline::External),
        (&*IMAGE, Inline::Image),
        (&*LINK, Inline::Link),
        (&*BOLD, Inline::Styled("strong")),
        (&*ITALIC, Inline::Styled("em")),
        (&*UNDERLINE, Inline::Styled("u")),
        (&*STRIKE, Inline::Styled("s")),
        (&*SUPERSCRIPT, Inline::Styled("sup")),
        (&*SUBSCRIPT, Inline::Styled("sub")),
    ] {
        text = spans.extract(&text, pattern, kind);
    }

    spans.restore(&escape_html(&text), |span| {
        let target = span.group(1);
        let label = match span.group(2) {
            "" => target,
            label => label,
        };
        match span.kind {
            Inline::Code => format!("<code>{}</code>", escape_html(target)),
            Inline::Link => format!("<a href='{}'>{}</a>", escape_html(target), escape_html(label)),
            Inline::External => format!(
                "<a href='{}' target='_blank'>{}</a>",
                escape_html(target),
                escape_html(label)
            ),
            Inline::Image => {
                let src = escape_html(target);
                format!("<img src='{src}' alt='{src}'/>")
            }
            Inline::Styled(tag) => format!("<{tag}>{}</{tag}>", escape_html(target)),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> ParsedDocument {
        TiddlyWikiParser.parse(content, &ParseOptions::new().with_filename("Note.tid"))
    }

    #[test]
    fn test_header_fields() {
        let doc = parse("title: My Note\ntags: alpha beta\ncreated: 20240101\ncolor: red\n\n! Heading\nBody");
        assert_eq!(doc.meta("title"), Some("My Note"));
        assert_eq!(doc.meta("tags"), Some("alpha, beta"));
        assert_eq!(doc.meta("created"), Some("20240101"));
        assert_eq!(doc.meta("extension"), Some(".tid"));
        assert!(doc.parsed_content.contains("<div class='tiddler-title'>My Note</div>"));
        assert!(doc.parsed_content.contains("<h1>Heading</h1><p>Body</p>"));

        let (fields, _) = split_tiddler("color: red\n\n");
        assert_eq!(fields.custom.get("color").map(String::as_str), Some("red"));
    }

    #[test]
    fn test_body_without_header() {
        let (fields, body) = split_tiddler("Just text\nmore");
        assert_eq!(fields, TiddlerFields::default());
        assert_eq!(body, "Just text\nmore");
    }

    #[test]
    fn test_lists_and_quotes() {
        let out = parse("* a\n** b\n# one\n<<<\nquoted\n<<<\n> single").parsed_content;
        assert!(out.contains("<ul><li>a</li><ul><li>b</li></ul></ul><ol><li>one</li></ol>"));
        assert!(out.contains("<blockquote><p>quoted</p></blockquote>"));
        assert!(out.contains("<blockquote>single</blockquote>"));
    }

    #[test]
    fn test_unterminated_blocks_close() {
        let out = parse("```\ncode").parsed_content;
        assert!(out.ends_with("<pre>code\n</pre></div>"));
    }

    #[test]
    fn test_inline_markup() {
        assert_eq!(
            render_inline("''b'' //i// __u__ ~~s~~ ^^up^^ ,,down,,"),
            "<strong>b</strong> <em>i</em> <u>u</u> <s>s</s> <sup>up</sup> <sub>down</sub>"
        );
        assert_eq!(
            render_inline("`<x>` [[Home]] [ext[https://e.org|site]] [img[pic.png]]"),
            "<code>&lt;x&gt;</code> <a href='Home'>Home</a> <a href='https://e.org' target='_blank'>site</a> <img src='pic.png' alt='pic.png'/>"
        );
    }

    #[test]
    fn test_validate() {
        let findings = TiddlyWikiParser.validate("[[open\n''bold\n```\n[[ignored\n```");
        assert_eq!(
            findings,
            vec![
                "Line 1: Unclosed brackets in links",
                "Line 2: Unclosed quotes (for bold '')",
            ]
        );
    }
}
