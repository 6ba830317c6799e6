//! AsciiDoc documents
//!
//! | Source                              | HTML                                           |
//! |-------------------------------------|------------------------------------------------|
//! | `= Title` .. `====== Title`         | `<h1>` .. `<h6>`                               |
//! | `:name: value`                      | document attribute (metadata, not rendered)    |
//! | `----` listing, `[source,lang]`     | `<pre><code class='language-lang'>`            |
//! | `....` literal                      | `<pre class='literal'>`                        |
//! | `____` quote                        | `<blockquote>`                                 |
//! | `////` comment, `// line`           | dropped                                        |
//! | `NOTE:` `TIP:` `WARNING:` ...       | `<div class='admonition admonition-note'>`     |
//! | `* `, `** `, `- `                   | nested `<ul>`                                  |
//! | `. `, `.. `                         | nested `<ol>`                                  |
//! | `'''`                               | `<hr>`                                         |
//! | Inline: `` `code` `` `*bold*` `_italic_` `^sup^` `~sub~` `link:url[text]` `https://url[text]` `image:src[alt]` | |
//!
//! Delimited blocks left open at the end of input are closed in the output and reported by
//! `validate`.

use crate::descriptor::{self, FormatDescriptor};
use crate::document::{Metadata, ParseOptions, ParsedDocument};
use crate::format::Parser;
use crate::formats::common::{
    escape_html, line_finding, split_lines, stylesheet_or_empty, theme_class, InlineSpans,
    ListKind, NestedList,
};
use once_cell::sync::Lazy;
use regex::Regex;

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:([^:]+):\s*(.*)$").unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(={1,6})\s+(.+)$").unwrap());
static ADMONITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(NOTE|TIP|WARNING|IMPORTANT|CAUTION):\s*(.*)$").unwrap());
static UNORDERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\*+|-)\s+(.+)$").unwrap());
static ORDERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\.+)\s+(.+)$").unwrap());
static BLOCK_ATTRIBUTES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[([^\]]*)\]$").unwrap());
static INCLUDE: Lazy<Regex> = Lazy::new(|| Regex::new(r"include::\S+\[[^\]]*\]").unwrap());
static LINK_MACRO: Lazy<Regex> = Lazy::new(|| Regex::new(r"link:\S+?\[[^\]]*\]").unwrap());

static CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"image::?([^\s\[]+)\[([^\]]*)\]").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"link:([^\s\[]+)\[([^\]]*)\]").unwrap());
static URL_WITH_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"((?:https?|mailto):[^\s\[]+)\[([^\]]*)\]").unwrap());
static BARE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s\[<]+").unwrap());
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b_([^_]+)_\b").unwrap());
static SUPERSCRIPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\^([^^\s]+)\^").unwrap());
static SUBSCRIPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"~([^~\s]+)~").unwrap());

/// Attributes, title and `// @key: value` comments from the first 20 lines
pub fn extract_metadata(content: &str) -> Metadata {
    let mut metadata = Metadata::new();
    for line in split_lines(content).into_iter().take(20) {
        if let Some(caps) = ATTRIBUTE.captures(line) {
            metadata.insert(caps[1].trim().to_string(), caps[2].trim().to_string());
        } else if let Some(title) = line.strip_prefix("= ") {
            metadata
                .entry("title".to_string())
                .or_insert_with(|| title.trim().to_string());
        } else if let Some(comment) = line.strip_prefix("// @") {
            if let Some((key, value)) = comment.split_once(':') {
                metadata.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }
    metadata
}

/// Parser implementation for AsciiDoc
#[derive(Debug, Default, Clone, Copy)]
pub struct AsciidocParser;

impl Parser for AsciidocParser {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &descriptor::ASCIIDOC
    }

    fn parse(&self, content: &str, _options: &ParseOptions) -> ParsedDocument {
        ParsedDocument::new(self.descriptor(), content, render(content, true))
            .with_metadata(extract_metadata(content))
            .with_errors(self.validate(content))
    }

    fn to_html(&self, document: &ParsedDocument, light_mode: bool) -> String {
        render(&document.raw_content, light_mode)
    }

    fn validate(&self, content: &str) -> Vec<String> {
        let mut findings = Vec::new();
        let mut open: Option<Delimited> = None;

        for (index, line) in split_lines(content).into_iter().enumerate() {
            if let Some(block) = Delimited::from_line(line) {
                open = match open {
                    Some(current) if current == block => None,
                    Some(current) => Some(current),
                    None => Some(block),
                };
                continue;
            }
            if open.is_some() {
                continue;
            }
            if line.contains("include::") && !INCLUDE.is_match(line) {
                findings.push(line_finding(index, "Malformed include directive"));
            }
            if line.contains("link:") && !LINK_MACRO.is_match(line) {
                findings.push(line_finding(index, "Malformed link directive"));
            }
        }

        match open {
            Some(Delimited::Listing | Delimited::Literal) => {
                findings.push("Unclosed code block".to_string())
            }
            Some(Delimited::Comment) => findings.push("Unclosed comment block".to_string()),
            Some(Delimited::Quote) => findings.push("Unclosed quote block".to_string()),
            None => {}
        }
        findings
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimited {
    Listing,
    Literal,
    Comment,
    Quote,
}

impl Delimited {
    fn from_line(line: &str) -> Option<Self> {
        match line.trim() {
            "----" => Some(Delimited::Listing),
            "...." => Some(Delimited::Literal),
            "////" => Some(Delimited::Comment),
            "____" => Some(Delimited::Quote),
            _ => None,
        }
    }
}

struct Writer {
    html: String,
    list: NestedList,
    in_paragraph: bool,
}

impl Writer {
    fn close_blocks(&mut self) {
        if self.in_paragraph {
            self.html.push_str("</p>\n");
            self.in_paragraph = false;
        }
        self.list.close(&mut self.html);
    }
}

fn render(content: &str, light_mode: bool) -> String {
    let mut out = Writer {
        html: format!("<div class='asciidoc {}'>", theme_class(light_mode)),
        list: NestedList::default(),
        in_paragraph: false,
    };
    out.html.push_str(&stylesheet_or_empty(descriptor::ASCIIDOC.id, light_mode));

    let mut raw_block: Option<Delimited> = None;
    let mut in_quote = false;
    let mut language: Option<String> = None;

    for line in split_lines(content) {
        let trimmed = line.trim();

        if let Some(block) = raw_block {
            if Delimited::from_line(line) == Some(block) {
                out.html.push_str(match block {
                    Delimited::Listing => "</code></pre>\n",
                    Delimited::Literal => "</pre>\n",
                    _ => "",
                });
                raw_block = None;
            } else if block != Delimited::Comment {
                out.html.push_str(&escape_html(line));
                out.html.push('\n');
            }
            continue;
        }

        match Delimited::from_line(line) {
            Some(Delimited::Quote) => {
                out.close_blocks();
                out.html.push_str(if in_quote { "</blockquote>\n" } else { "<blockquote>" });
                in_quote = !in_quote;
                continue;
            }
            Some(block) => {
                out.close_blocks();
                match block {
                    Delimited::Listing => match language.take() {
                        Some(lang) => out.html.push_str(&format!(
                            "<pre><code class='language-{}'>",
                            escape_html(&lang)
                        )),
                        None => out.html.push_str("<pre><code>"),
                    },
                    Delimited::Literal => out.html.push_str("<pre class='literal'>"),
                    _ => {}
                }
                raw_block = Some(block);
                continue;
            }
            None => {}
        }

        if trimmed.is_empty() {
            out.close_blocks();
            continue;
        }
        if trimmed.starts_with("//") || ATTRIBUTE.is_match(trimmed) {
            continue;
        }
        if let Some(caps) = BLOCK_ATTRIBUTES.captures(trimmed) {
            let mut parts = caps[1].split(',').map(str::trim);
            if parts.next() == Some("source") {
                language = parts.next().filter(|lang| !lang.is_empty()).map(str::to_string);
            }
            continue;
        }

        if let Some(caps) = HEADING.captures(trimmed) {
            out.close_blocks();
            let level = caps[1].len();
            out.html.push_str(&format!(
                "<h{level}>{}</h{level}>\n",
                render_inline(&caps[2])
            ));
        } else if trimmed == "'''" {
            out.close_blocks();
            out.html.push_str("<hr>\n");
        } else if let Some(caps) = ADMONITION.captures(trimmed) {
            out.close_blocks();
            let kind = caps[1].to_lowercase();
            let label = format!("{}{}", &caps[1][..1], &kind[1..]);
            out.html.push_str(&format!(
                "<div class='admonition admonition-{kind}'><span class='admonition-label'>{label}</span>{}</div>\n",
                render_inline(&caps[2])
            ));
        } else if let Some(caps) = UNORDERED.captures(trimmed) {
            if out.in_paragraph {
                out.close_blocks();
            }
            let level = if &caps[1] == "-" { 1 } else { caps[1].len() };
            out.list.nest(&mut out.html, ListKind::Unordered, level);
            out.html.push_str(&format!("<li>{}</li>", render_inline(&caps[2])));
        } else if let Some(caps) = ORDERED.captures(trimmed) {
            if out.in_paragraph {
                out.close_blocks();
            }
            out.list.nest(&mut out.html, ListKind::Ordered, caps[1].len());
            out.html.push_str(&format!("<li>{}</li>", render_inline(&caps[2])));
        } else {
            out.list.close(&mut out.html);
            if !out.in_paragraph {
                out.html.push_str("<p>");
                out.in_paragraph = true;
            }
            out.html.push_str(&render_inline(trimmed));
            out.html.push(' ');
        }
    }

    out.close_blocks();
    match raw_block {
        Some(Delimited::Listing) => out.html.push_str("</code></pre>\n"),
        Some(Delimited::Literal) => out.html.push_str("</pre>\n"),
        _ => {}
    }
    if in_quote {
        out.html.push_str("</blockquote>\n");
    }
    out.html.push_str("</div>");
    out.html
}

#[derive(Debug, Clone, Copy)]
enum Inline {
    Code,
    Image,
    Link,
    Url,
}

/// Convert inline AsciiDoc markup in one line
pub fn render_inline(text: &str) -> String {
    let (mut spans, text) = InlineSpans::protect(text);
    let text = spans.extract(&text, &CODE, Inline::Code);
    let text = spans.extract(&text, &IMAGE, Inline::Image);
    let text = spans.extract(&text, &LINK, Inline::Link);
    let text = spans.extract(&text, &URL_WITH_TEXT, Inline::Link);
    let text = spans.extract(&text, &BARE_URL, Inline::Url);

    let text = escape_html(&text);
    let text = BOLD.replace_all(&text, "<strong>$1</strong>");
    let text = ITALIC.replace_all(&text, "<em>$1</em>");
    let text = SUPERSCRIPT.replace_all(&text, "<sup>$1</sup>");
    let text = SUBSCRIPT.replace_all(&text, "<sub>$1</sub>");

    spans.restore(&text, |span| match span.kind {
        Inline::Code => format!("<code>{}</code>", escape_html(span.group(1))),
        Inline::Image => format!(
            "<img src='{}' alt='{}'/>",
            escape_html(span.group(1)),
            escape_html(span.group(2))
        ),
        Inline::Link => {
            let target = span.group(1);
            let label = match span.group(2) {
                "" => target,
                label => label,
            };
            format!("<a href='{}'>{}</a>", escape_html(target), escape_html(label))
        }
        Inline::Url => {
            let url = escape_html(span.group(0));
            format!("<a href='{url}'>{url}</a>")
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "= User Guide
:author: Dana
:version: 1.2
// @audience: admins

== Install

Run the *installer* and _wait_.

NOTE: Needs root.

[source,rust]
----
fn main() { println!(\"<hi>\"); }
----

* one
** nested
. first
";

    #[test]
    fn test_metadata() {
        let doc = AsciidocParser.parse(DOC, &ParseOptions::new());
        assert_eq!(doc.meta("title"), Some("User Guide"));
        assert_eq!(doc.meta("author"), Some("Dana"));
        assert_eq!(doc.meta("version"), Some("1.2"));
        assert_eq!(doc.meta("audience"), Some("admins"));
        assert!(doc.errors.is_empty());
    }

    #[test]
    fn test_render() {
        let html = AsciidocParser.parse(DOC, &ParseOptions::new()).parsed_content;
        assert!(html.starts_with("<div class='asciidoc light'><style>"));
        assert!(html.contains("<h1>User Guide</h1>\n<h2>Install</h2>"));
        assert!(html.contains("<p>Run the <strong>installer</strong> and <em>wait</em>. </p>"));
        assert!(html.contains(
            "<div class='admonition admonition-note'><span class='admonition-label'>Note</span>Needs root.</div>"
        ));
        assert!(html.contains(
            "<pre><code class='language-rust'>fn main() { println!(&quot;&lt;hi&gt;&quot;); }\n</code></pre>"
        ));
        assert!(html.contains("<ul><li>one</li><ul><li>nested</li></ul></ul><ol><li>first</li></ol>"));
        assert!(!html.contains("Dana"));
    }

    #[test]
    fn test_dark_mode() {
        let doc = AsciidocParser.parse(DOC, &ParseOptions::new());
        let dark = AsciidocParser.to_html(&doc, false);
        assert!(dark.starts_with("<div class='asciidoc dark'>"));
        assert!(dark.contains(".asciidoc.dark"));
    }

    #[test]
    fn test_comment_block_dropped() {
        let html = AsciidocParser
            .parse("////\nsecret\n////\nshown", &ParseOptions::new())
            .parsed_content;
        assert!(!html.contains("secret"));
        assert!(html.contains("<p>shown </p>"));
    }

    #[test]
    fn test_inline_links() {
        assert_eq!(
            render_inline("see link:docs.html[the docs] or https://e.org[site] and https://x.io"),
            "see <a href='docs.html'>the docs</a> or <a href='https://e.org'>site</a> and <a href='https://x.io'>https://x.io</a>"
        );
        assert_eq!(
            render_inline("image:logo.png[Logo] `a*b*c`"),
            "<img src='logo.png' alt='Logo'/> <code>a*b*c</code>"
        );
    }

    #[test]
    fn test_unclosed_listing() {
        let html = AsciidocParser.parse("----\ncode", &ParseOptions::new()).parsed_content;
        assert!(html.ends_with("<pre><code>code\n</code></pre>\n</div>"));
        assert_eq!(AsciidocParser.validate("----\ncode"), vec!["Unclosed code block"]);
        assert_eq!(AsciidocParser.validate("////\nx"), vec!["Unclosed comment block"]);
    }

    #[test]
    fn test_validate_directives() {
        let findings = AsciidocParser.validate("include::chapter.adoc\nlink:http://x\nlink:ok.html[ok]");
        assert_eq!(
            findings,
            vec![
                "Line 1: Malformed include directive",
                "Line 2: Malformed link directive",
            ]
        );
    }
}
