//! Creole 1.0 wiki markup
//!
//! Headings are `=` runs (clamped to six), lists nest by repeating `*` or `#`, tables are
//! `|`-delimited with `|=` header cells, `{{{`/`}}}` fences preformatted text and `----`
//! draws a rule. An unterminated fence is closed silently.

use crate::descriptor::{self, FormatDescriptor};
use crate::document::{Metadata, ParseOptions, ParsedDocument};
use crate::format::Parser;
use crate::formats::common::{
    count_char, escape_html, line_finding, split_lines, stylesheet_or_empty, InlineSpans,
    ListKind, NestedList,
};
use once_cell::sync::Lazy;
use regex::Regex;

static UNORDERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\*+) (.+)$").unwrap());
static ORDERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#+) (.+)$").unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(=+)\s+(.+?)\s*=*$").unwrap());
static RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-{4,}$").unwrap());

static CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{\{([^}]+)\}\}\}").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[([^|\]]+)(?:\|([^\]]+))?\]\]").unwrap());
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{([^|}]+)(?:\|([^}]+))?\}\}").unwrap());
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"//([^/]+)//").unwrap());

/// Parser implementation for Creole
#[derive(Debug, Default, Clone, Copy)]
pub struct CreoleParser;

impl Parser for CreoleParser {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &descriptor::CREOLE
    }

    fn parse(&self, content: &str, options: &ParseOptions) -> ParsedDocument {
        let mut metadata = Metadata::new();
        metadata.insert("extension".into(), options.extension_or_empty());
        metadata.insert("lines".into(), split_lines(content).len().to_string());

        ParsedDocument::new(self.descriptor(), content, render(content)).with_metadata(metadata)
    }

    fn validate(&self, content: &str) -> Vec<String> {
        let mut findings = Vec::new();
        let mut in_code = false;

        for (index, line) in split_lines(content).into_iter().enumerate() {
            let trimmed = line.trim();
            match trimmed {
                "{{{" => in_code = true,
                "}}}" => in_code = false,
                _ => {}
            }
            if in_code {
                continue;
            }

            if trimmed.starts_with('|') && !trimmed.ends_with('|') {
                findings.push(line_finding(index, "Malformed table row (should end with |)"));
            }
            if count_char(trimmed, '[') != count_char(trimmed, ']') {
                findings.push(line_finding(index, "Unclosed brackets in links"));
            }
            if count_char(trimmed, '{') != count_char(trimmed, '}') {
                findings.push(line_finding(index, "Unclosed braces"));
            }
        }
        findings
    }
}

/// Open list containers and the table flag
#[derive(Default)]
struct Blocks {
    list: NestedList,
    table: bool,
}

impl Blocks {
    fn close_table(&mut self, html: &mut String) {
        if self.table {
            html.push_str("</table>");
            self.table = false;
        }
    }

    fn close_all(&mut self, html: &mut String) {
        self.list.close(html);
        self.close_table(html);
    }

    fn nest(&mut self, html: &mut String, kind: ListKind, level: usize) {
        self.close_table(html);
        self.list.nest(html, kind, level);
    }
}

fn render(content: &str) -> String {
    let mut html = String::from("<div class='creole'>");
    html.push_str(&stylesheet_or_empty(descriptor::CREOLE.id, true));

    let mut blocks = Blocks::default();
    let mut in_code = false;

    for line in split_lines(content) {
        let trimmed = line.trim();

        if trimmed == "{{{" {
            if !in_code {
                blocks.close_all(&mut html);
                html.push_str("<pre>");
                in_code = true;
            }
            continue;
        }
        if in_code {
            if trimmed == "}}}" {
                html.push_str("</pre>");
                in_code = false;
            } else {
                html.push_str(&escape_html(line));
                html.push('\n');
            }
            continue;
        }

        if trimmed.len() >= 2 && trimmed.starts_with('|') && trimmed.ends_with('|') {
            if !blocks.table {
                blocks.list.close(&mut html);
                html.push_str("<table>");
                blocks.table = true;
            }
            html.push_str(&table_row(trimmed));
        } else if let Some(caps) = UNORDERED.captures(trimmed) {
            blocks.nest(&mut html, ListKind::Unordered, caps[1].len());
            html.push_str(&format!("<li>{}</li>", render_inline(&caps[2])));
        } else if let Some(caps) = ORDERED.captures(trimmed) {
            blocks.nest(&mut html, ListKind::Ordered, caps[1].len());
            html.push_str(&format!("<li>{}</li>", render_inline(&caps[2])));
        } else {
            blocks.close_all(&mut html);
            if trimmed.is_empty() {
                continue;
            }
            if let Some(caps) = HEADING.captures(trimmed) {
                let level = caps[1].len().min(6);
                html.push_str(&format!("<h{level}>{}</h{level}>", render_inline(&caps[2])));
            } else if RULE.is_match(trimmed) {
                html.push_str("<hr>");
            } else {
                html.push_str(&format!("<p>{}</p>", render_inline(trimmed)));
            }
        }
    }

    blocks.close_all(&mut html);
    if in_code {
        html.push_str("</pre>");
    }
    html.push_str("</div>");
    html
}

fn table_row(trimmed: &str) -> String {
    let mut html = String::from("<tr>");
    for cell in trimmed[1..trimmed.len() - 1].split('|') {
        let cell = cell.trim();
        match cell.strip_prefix('=') {
            Some(header) => html.push_str(&format!("<th>{}</th>", render_inline(header.trim()))),
            None => html.push_str(&format!("<td>{}</td>", render_inline(cell))),
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

/// Convert inline Creole markup in one line
pub fn render_inline(text: &str) -> String {
    let (mut spans, text) = InlineSpans::protect(text);
    let text = spans.extract(&text, &CODE, Inline::Code);
    let text = spans.extract(&text, &LINK, Inline::Link);
    let text = spans.extract(&text, &IMAGE, Inline::Image);

    let text = escape_html(&text).replace("\\\\", "<br>");
    let text = BOLD.replace_all(&text, "<strong>$1</strong>");
    let text = ITALIC.replace_all(&text, "<em>$1</em>");

    spans.restore(&text, |span| {
        let target = span.group(1);
        let label = match span.group(2) {
            "" => target,
            label => label,
        };
        match span.kind {
            Inline::Code => format!("<code>{}</code>", escape_html(target)),
            Inline::Link => format!("<a href='{}'>{}</a>", escape_html(target), escape_html(label)),
            Inline::Image => format!(
                "<img src='{}' alt='{}'/>",
                escape_html(target),
                escape_html(label)
            ),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(content: &str) -> String {
        CreoleParser.parse(content, &ParseOptions::new()).parsed_content
    }

    #[test]
    fn test_headings_clamp_to_six() {
        let out = html("= One =\n======= Seven =======");
        assert!(out.contains("<h1>One</h1>"));
        assert!(out.contains("<h6>Seven</h6>"));
    }

    #[test]
    fn test_nested_lists() {
        let out = html("* a\n** b\n* c\n# one");
        assert!(out.contains("<ul><li>a</li><ul><li>b</li></ul><li>c</li></ul><ol><li>one</li></ol>"));
    }

    #[test]
    fn test_table_with_header_cells() {
        let out = html("|= Name |= Age |\n| Ann | 3 |");
        assert!(out.contains(
            "<table><tr><th>Name</th><th>Age</th></tr><tr><td>Ann</td><td>3</td></tr></table>"
        ));
    }

    #[test]
    fn test_preformatted_and_rule() {
        let out = html("{{{\n<b>**raw**</b>\n}}}\n----");
        assert!(out.contains("<pre>&lt;b&gt;**raw**&lt;/b&gt;\n</pre><hr>"));
    }

    #[test]
    fn test_unterminated_preformatted_closes() {
        assert!(html("{{{\ncode").ends_with("<pre>code\n</pre></div>"));
        assert!(CreoleParser.validate("{{{\ncode").is_empty());
    }

    #[test]
    fn test_inline_markup() {
        assert_eq!(
            render_inline("**b** //i// line\\\\break {{{x<y}}} [[Home|go home]] {{a.png|logo}}"),
            "<strong>b</strong> <em>i</em> line<br>break <code>x&lt;y</code> <a href='Home'>go home</a> <img src='a.png' alt='logo'/>"
        );
    }

    #[test]
    fn test_validate() {
        let findings = CreoleParser.validate("| a | b\n[[open\n{{img");
        assert_eq!(
            findings,
            vec![
                "Line 1: Malformed table row (should end with |)",
                "Line 2: Unclosed brackets in links",
                "Line 3: Unclosed braces",
            ]
        );
    }
}
