//! Markdown block scanner and inline converter

use crate::formats::common::{escape_html, stylesheet_or_empty, split_lines, InlineSpans};
use crate::descriptor::ids;
use once_cell::sync::Lazy;
use regex::Regex;

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());
static UNORDERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-*+]\s+(.*)$").unwrap());
static ORDERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s+(.*)$").unwrap());
static RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([-*_]\s*){3,}$").unwrap());
static TABLE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\|\s*([-:]+\s*\|)+\s*$").unwrap());

static CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());
static CHECKBOX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[( |x)\]").unwrap());
static STRONG_STARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static STRONG_UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"__(.+?)__").unwrap());
static STRIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"~~(.+?)~~").unwrap());
static EM_STAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static EM_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_(.+?)_").unwrap());

pub(super) struct Rendered {
    pub html: String,
    pub headings: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Paragraph,
    Quote,
    Unordered,
    Ordered,
    Table,
}

impl Block {
    fn open_tag(self) -> &'static str {
        match self {
            Block::Paragraph => "<p>",
            Block::Quote => "<blockquote>",
            Block::Unordered => "<ul>",
            Block::Ordered => "<ol>",
            Block::Table => "<table>",
        }
    }

    fn close_tag(self) -> &'static str {
        match self {
            Block::Paragraph => "</p>",
            Block::Quote => "</blockquote>",
            Block::Unordered => "</ul>",
            Block::Ordered => "</ol>",
            Block::Table => "</table>",
        }
    }
}

struct Writer {
    html: String,
    open: Option<Block>,
}

impl Writer {
    fn enter(&mut self, block: Block) {
        if self.open == Some(block) {
            return;
        }
        self.close();
        self.html.push_str(block.open_tag());
        self.open = Some(block);
    }

    fn close(&mut self) {
        if let Some(block) = self.open.take() {
            self.html.push_str(block.close_tag());
        }
    }
}

pub(super) fn render(content: &str) -> Rendered {
    let body = render_blocks(content);
    let mut html = String::with_capacity(body.html.len() + 1024);
    html.push_str("<div class='markdown'>");
    html.push_str(&stylesheet_or_empty(ids::MARKDOWN, true));
    html.push_str(&body.html);
    html.push_str("</div>");
    Rendered {
        html,
        headings: body.headings,
    }
}

/// Block markup without the styled container, for dialects that embed Markdown
pub(super) fn render_blocks(content: &str) -> Rendered {
    let lines = split_lines(content);
    let mut out = Writer {
        html: String::with_capacity(content.len() * 2),
        open: None,
    };
    let mut headings = 0;
    let mut in_code = false;

    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.trim();

        if let Some(info) = trimmed.strip_prefix("```") {
            if in_code {
                out.html.push_str("</code></pre>");
            } else {
                out.close();
                let language = info.trim();
                if language.is_empty() {
                    out.html.push_str("<pre><code>");
                } else {
                    out.html.push_str(&format!(
                        "<pre><code class='language-{}'>",
                        escape_html(language)
                    ));
                }
            }
            in_code = !in_code;
            continue;
        }
        if in_code {
            out.html.push_str(&escape_html(line));
            out.html.push('\n');
            continue;
        }

        if trimmed.is_empty() {
            out.close();
            continue;
        }

        if let Some(caps) = HEADING.captures(trimmed) {
            out.close();
            let level = caps[1].len();
            headings += 1;
            out.html
                .push_str(&format!("<h{level}>{}</h{level}>", render_inline(&caps[2])));
        } else if RULE.is_match(trimmed) {
            out.close();
            out.html.push_str("<hr>");
        } else if is_table_row(trimmed) {
            if TABLE_SEPARATOR.is_match(trimmed) {
                continue;
            }
            out.enter(Block::Table);
            let header = lines
                .get(index + 1)
                .is_some_and(|next| TABLE_SEPARATOR.is_match(next.trim()));
            out.html.push_str(&table_row(trimmed, header));
        } else if let Some(quoted) = trimmed.strip_prefix('>') {
            out.enter(Block::Quote);
            out.html.push_str(&render_inline(quoted.trim()));
            out.html.push_str("<br>");
        } else if let Some(caps) = UNORDERED.captures(trimmed) {
            out.enter(Block::Unordered);
            out.html
                .push_str(&format!("<li>{}</li>", render_inline(caps[1].trim())));
        } else if let Some(caps) = ORDERED.captures(trimmed) {
            out.enter(Block::Ordered);
            out.html
                .push_str(&format!("<li>{}</li>", render_inline(caps[1].trim())));
        } else {
            out.enter(Block::Paragraph);
            out.html.push_str(&render_inline(trimmed));
            out.html.push(' ');
        }
    }

    if in_code {
        out.html.push_str("</code></pre>");
    }
    out.close();

    Rendered {
        html: out.html,
        headings,
    }
}

fn is_table_row(trimmed: &str) -> bool {
    trimmed.len() >= 2 && trimmed.starts_with('|') && trimmed.ends_with('|')
}

fn table_row(trimmed: &str, header: bool) -> String {
    let tag = if header { "th" } else { "td" };
    let inner = &trimmed[1..trimmed.len() - 1];
    let mut html = String::from("<tr>");
    for cell in inner.split('|') {
        html.push_str(&format!("<{tag}>{}</{tag}>", render_inline(cell.trim())));
    }
    html.push_str("</tr>");
    html
}

#[derive(Debug, Clone, Copy)]
enum Inline {
    Code,
    Image,
    Link,
    Checkbox,
}

/// Convert Markdown inline markup in a single line to HTML
pub fn render_inline(text: &str) -> String {
    let (mut spans, text) = InlineSpans::protect(text);
    let text = spans.extract(&text, &CODE, Inline::Code);
    let text = spans.extract(&text, &IMAGE, Inline::Image);
    let text = spans.extract(&text, &LINK, Inline::Link);
    let text = spans.extract(&text, &CHECKBOX, Inline::Checkbox);

    let text = escape_html(&text);
    let text = STRONG_STARS.replace_all(&text, "<strong>$1</strong>");
    let text = STRONG_UNDERSCORES.replace_all(&text, "<strong>$1</strong>");
    let text = STRIKE.replace_all(&text, "<s>$1</s>");
    let text = EM_STAR.replace_all(&text, "<em>$1</em>");
    let text = EM_UNDERSCORE.replace_all(&text, "<em>$1</em>");

    spans.restore(&text, |span| match span.kind {
        Inline::Code => format!("<code>{}</code>", escape_html(span.group(1))),
        Inline::Image => format!(
            "<img src='{}' alt='{}'/>",
            escape_html(span.group(2)),
            escape_html(span.group(1))
        ),
        Inline::Link => format!(
            "<a href='{}'>{}</a>",
            escape_html(span.group(2)),
            escape_html(span.group(1))
        ),
        Inline::Checkbox if span.group(1) == "x" => {
            "<input type='checkbox' disabled checked>".to_string()
        }
        Inline::Checkbox => "<input type='checkbox' disabled>".to_string(),
    })
}
