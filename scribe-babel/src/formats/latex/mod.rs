//! LaTeX documents
//!
//! Not a TeX engine: a line scanner that understands document structure well enough for a
//! readable preview.
//!
//! - Preamble commands (`\documentclass`, `\usepackage`, `\title`, `\author`, `\date`) feed
//!   the metadata and the title block. The title block is emitted at `\maketitle`, else at
//!   `\begin{document}`, else at the top of a fragment.
//! - `\section`, `\subsection`, `\subsubsection` and `\paragraph` (starred or not) become
//!   headings.
//! - `itemize`/`enumerate`/`description` become lists, math environments and `\[ \]` become
//!   display blocks, `verbatim`/`lstlisting` become `<pre>`, anything else a classed `<div>`.
//! - Inline: `\textbf`, `\textit`, `\emph`, `\underline`, `\texttt` (nestable), `$math$`,
//!   `\href`, `\url`, `\\` line breaks, `~`, dashes and escaped specials.
//!
//! Unclosed environments are closed at the end of input; `validate` reports them.

use crate::descriptor::{self, FormatDescriptor};
use crate::document::{Metadata, ParseOptions, ParsedDocument};
use crate::format::Parser;
use crate::formats::common::{
    escape_html, line_finding, split_lines, stylesheet_or_empty, theme_class, InlineSpans,
};
use once_cell::sync::Lazy;
use regex::Regex;

static BEGIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\begin\{([^}]+)\}").unwrap());
static END: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\end\{([^}]+)\}").unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\\(section|subsection|subsubsection|paragraph)\*?\{(.*)\}").unwrap()
});
static PREAMBLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\\(documentclass|usepackage|title|author|date|maketitle|label|newcommand|renewcommand|tableofcontents)\b").unwrap()
});
static COMMAND_ARGUMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\\(title|author|date|documentclass)(?:\[[^\]]*\])?\{([^}]*)\}").unwrap());

static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\\\").unwrap());
static ESCAPED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\([&%$#_{}])").unwrap());
static MATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\$?([^$]+)\$\$?").unwrap());
static HREF: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\href\{([^{}]*)\}\{([^{}]*)\}").unwrap());
static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\url\{([^{}]*)\}").unwrap());
static STYLED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(textbf|textit|emph|underline|texttt)\{([^{}]*)\}").unwrap());

const MATH_ENVIRONMENTS: &[&str] = &[
    "equation", "equation*", "align", "align*", "displaymath", "math", "gather", "gather*",
];
const VERBATIM_ENVIRONMENTS: &[&str] = &["verbatim", "lstlisting", "minted"];
const TABULAR_ENVIRONMENTS: &[&str] = &["tabular", "tabular*", "array", "align", "align*"];

/// Title block and `% key: value` metadata from the first 50 lines
pub fn extract_metadata(content: &str) -> Metadata {
    let mut metadata = Metadata::new();
    for line in split_lines(content).into_iter().take(50) {
        let line = line.trim_start();
        if let Some(caps) = COMMAND_ARGUMENT.captures(line) {
            metadata.insert(caps[1].to_string(), caps[2].to_string());
        } else if let Some(comment) = line.strip_prefix('%') {
            if let Some((key, value)) = comment.split_once(':') {
                let key = key.trim();
                if !key.is_empty() {
                    metadata.insert(key.to_string(), value.trim().to_string());
                }
            }
        }
    }
    metadata
}

/// Cut a line at its first unescaped `%`
fn strip_comment(line: &str) -> &str {
    let mut escaped = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '\\' => escaped = !escaped,
            '%' if !escaped => return &line[..index],
            _ => escaped = false,
        }
    }
    line
}

/// Parser implementation for LaTeX
#[derive(Debug, Default, Clone, Copy)]
pub struct LatexParser;

impl Parser for LatexParser {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &descriptor::LATEX
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
        let mut environments: Vec<String> = Vec::new();
        let mut in_math = false;

        for (index, raw) in split_lines(content).into_iter().enumerate() {
            let line = strip_comment(raw);

            if line.contains("\\[") {
                in_math = true;
            }
            if line.contains("\\]") {
                in_math = false;
            }

            for caps in BEGIN.captures_iter(line) {
                environments.push(caps[1].to_string());
            }
            for caps in END.captures_iter(line) {
                let name = &caps[1];
                let open = environments.last().cloned().unwrap_or_default();
                if open == name {
                    environments.pop();
                } else {
                    findings.push(line_finding(
                        index,
                        format!("Mismatched environment end: {name} (expected: {open})"),
                    ));
                }
            }

            for command in malformed_commands(line) {
                findings.push(line_finding(index, format!("Malformed LaTeX command: {command}")));
            }

            let math_context = in_math
                || environments
                    .iter()
                    .any(|env| MATH_ENVIRONMENTS.contains(&env.as_str()));
            let tabular_context = environments
                .iter()
                .any(|env| TABULAR_ENVIRONMENTS.contains(&env.as_str()));
            if !math_context && !tabular_context && has_unescaped(line, '&') {
                findings.push(line_finding(index, "Unescaped ampersand (&)"));
            }
            if !math_context && has_unescaped(line, '#') {
                findings.push(line_finding(index, "Unescaped hash (#)"));
            }
        }

        if in_math {
            findings.push("Unclosed math mode".to_string());
        }
        for env in environments.iter().rev() {
            findings.push(format!("Unclosed environment: {env}"));
        }
        findings
    }
}

/// Backslashes followed by whitespace or the end of the line
fn malformed_commands(line: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            continue;
        }
        match chars.peek() {
            Some('\\') => {
                chars.next();
            }
            None => found.push("\\".to_string()),
            Some(next) if next.is_whitespace() => found.push(format!("\\{next}")),
            Some(_) => {}
        }
    }
    found
}

fn has_unescaped(line: &str, target: char) -> bool {
    let mut escaped = false;
    for ch in line.chars() {
        if ch == target && !escaped {
            return true;
        }
        escaped = ch == '\\' && !escaped;
    }
    false
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    List { ordered: bool, item_open: bool },
    Math,
    Verbatim,
    Block,
}

struct Environment {
    name: String,
    frame: Frame,
}

struct Writer {
    html: String,
    stack: Vec<Environment>,
    in_paragraph: bool,
}

impl Writer {
    fn close_paragraph(&mut self) {
        if self.in_paragraph {
            self.html.push_str("</p>\n");
            self.in_paragraph = false;
        }
    }

    fn open(&mut self, name: &str) {
        self.close_paragraph();
        let frame = match name {
            "itemize" | "description" => Frame::List { ordered: false, item_open: false },
            "enumerate" => Frame::List { ordered: true, item_open: false },
            _ if MATH_ENVIRONMENTS.contains(&name) => Frame::Math,
            _ if VERBATIM_ENVIRONMENTS.contains(&name) => Frame::Verbatim,
            _ => Frame::Block,
        };
        match frame {
            Frame::List { ordered: true, .. } => self.html.push_str("<ol class='enumerate'>\n"),
            Frame::List { .. } => self.html.push_str(&format!("<ul class='{}'>\n", escape_html(name))),
            Frame::Math => self.html.push_str("<div class='math-display'>"),
            Frame::Verbatim => self.html.push_str("<pre>"),
            Frame::Block => self
                .html
                .push_str(&format!("<div class='environment {}'>\n", escape_html(name))),
        }
        self.stack.push(Environment {
            name: name.to_string(),
            frame,
        });
    }

    /// Close `name` and anything opened inside it; an unknown name is ignored
    fn close(&mut self, name: &str) {
        if !self.stack.iter().any(|env| env.name == name) {
            return;
        }
        self.close_paragraph();
        while let Some(env) = self.stack.pop() {
            self.close_frame(env.frame);
            if env.name == name {
                break;
            }
        }
    }

    fn close_frame(&mut self, frame: Frame) {
        match frame {
            Frame::List { ordered, item_open } => {
                if item_open {
                    self.html.push_str("</li>\n");
                }
                self.html.push_str(if ordered { "</ol>\n" } else { "</ul>\n" });
            }
            Frame::Math => self.html.push_str("</div>\n"),
            Frame::Verbatim => self.html.push_str("</pre>\n"),
            Frame::Block => self.html.push_str("</div>\n"),
        }
    }

    fn item(&mut self, text: &str) {
        let Some(Environment {
            frame: Frame::List { item_open, .. },
            ..
        }) = self.stack.last_mut()
        else {
            self.text(text);
            return;
        };
        let reopen = *item_open;
        *item_open = true;
        if reopen {
            self.html.push_str("</li>\n");
        }
        self.html.push_str(&format!("<li>{}", render_inline(text)));
    }

    fn text(&mut self, text: &str) {
        let in_list = matches!(
            self.stack.last(),
            Some(Environment {
                frame: Frame::List { .. },
                ..
            })
        );
        if !in_list && !self.in_paragraph {
            self.html.push_str("<p>");
            self.in_paragraph = true;
        }
        self.html.push_str(&render_inline(text));
        self.html.push(' ');
    }

    fn raw_frame(&self) -> Option<(Frame, &str)> {
        self.stack
            .last()
            .filter(|env| matches!(env.frame, Frame::Math | Frame::Verbatim))
            .map(|env| (env.frame, env.name.as_str()))
    }
}

fn starts_line(caps: &regex::Captures<'_>) -> bool {
    caps.get(0).is_some_and(|m| m.start() == 0)
}

fn title_block(metadata: &Metadata) -> String {
    let mut html = String::from("<div class='document-header'>");
    for key in ["title", "author", "date"] {
        if let Some(value) = metadata.get(key) {
            html.push_str(&format!("<div class='{key}'>{}</div>", render_inline(value)));
        }
    }
    html.push_str("</div>\n");
    html
}

fn render(content: &str, light_mode: bool) -> String {
    let metadata = extract_metadata(content);
    let has_title = ["title", "author", "date"]
        .iter()
        .any(|key| metadata.contains_key(*key));
    let title_at_maketitle = content.contains("\\maketitle");
    let title_at_begin = !title_at_maketitle && content.contains("\\begin{document}");

    let mut out = Writer {
        html: format!("<div class='latex-document {}'>", theme_class(light_mode)),
        stack: Vec::new(),
        in_paragraph: false,
    };
    out.html.push_str(&stylesheet_or_empty(descriptor::LATEX.id, light_mode));
    if has_title && !title_at_maketitle && !title_at_begin {
        out.html.push_str(&title_block(&metadata));
    }

    for raw in split_lines(content) {
        if let Some((frame, name)) = out.raw_frame().map(|(f, n)| (f, n.to_string())) {
            let closing = if name == "\\[" {
                raw.find("\\]")
            } else {
                raw.find(&format!("\\end{{{name}}}"))
            };
            let body = closing.map_or(raw, |at| &raw[..at]);
            let keep = match frame {
                Frame::Verbatim => closing.is_none() || !body.is_empty(),
                _ => !body.trim().is_empty(),
            };
            if keep {
                out.html.push_str(&escape_html(body));
                out.html.push('\n');
            }
            if closing.is_some() {
                out.close(&name);
            }
            continue;
        }

        let line = strip_comment(raw);
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if raw.trim().is_empty() {
                out.close_paragraph();
            }
            continue;
        }

        if trimmed.starts_with("\\begin{document}") {
            out.close_paragraph();
            if has_title && title_at_begin {
                out.html.push_str(&title_block(&metadata));
            }
        } else if trimmed.starts_with("\\end{document}") {
            out.close_paragraph();
        } else if trimmed.starts_with("\\maketitle") {
            out.close_paragraph();
            if has_title {
                out.html.push_str(&title_block(&metadata));
            }
        } else if PREAMBLE.is_match(trimmed) {
            continue;
        } else if let Some(caps) = HEADING.captures(trimmed) {
            out.close_paragraph();
            let (tag, class) = match &caps[1] {
                "section" => ("h2", "section"),
                "subsection" => ("h3", "subsection"),
                "subsubsection" => ("h4", "subsubsection"),
                _ => ("h5", "paragraph"),
            };
            out.html.push_str(&format!(
                "<{tag} class='{class}'>{}</{tag}>\n",
                render_inline(&caps[2])
            ));
        } else if let Some(rest) = trimmed.strip_prefix("\\[") {
            out.close_paragraph();
            match rest.find("\\]") {
                Some(end) => out.html.push_str(&format!(
                    "<div class='math-display'>{}</div>\n",
                    escape_html(rest[..end].trim())
                )),
                None => {
                    out.html.push_str("<div class='math-display'>");
                    out.stack.push(Environment {
                        name: "\\[".to_string(),
                        frame: Frame::Math,
                    });
                    if !rest.trim().is_empty() {
                        out.html.push_str(&escape_html(rest.trim()));
                        out.html.push('\n');
                    }
                }
            }
        } else if let Some(caps) = BEGIN.captures(trimmed).filter(starts_line) {
            let name = caps[1].to_string();
            out.open(&name);
            let rest = trimmed[caps[0].len()..].trim();
            if out.raw_frame().is_some() {
                let end = format!("\\end{{{name}}}");
                match rest.find(&end) {
                    Some(at) => {
                        out.html.push_str(&escape_html(rest[..at].trim()));
                        out.close(&name);
                    }
                    None if !rest.is_empty() => {
                        out.html.push_str(&escape_html(rest));
                        out.html.push('\n');
                    }
                    None => {}
                }
            }
        } else if let Some(caps) = END.captures(trimmed).filter(starts_line) {
            out.close(&caps[1]);
        } else if let Some(item) = trimmed.strip_prefix("\\item") {
            out.item(item.trim());
        } else {
            out.text(trimmed);
        }
    }

    out.close_paragraph();
    while let Some(env) = out.stack.pop() {
        out.close_frame(env.frame);
    }
    out.html.push_str("</div>");
    out.html
}

#[derive(Debug, Clone, Copy)]
enum Inline {
    Break,
    Escaped,
    Math,
    Href,
    Url,
    Styled,
}

/// Convert inline LaTeX in one line
pub fn render_inline(text: &str) -> String {
    let (mut spans, text) = InlineSpans::protect(text);
    let text = spans.extract(&text, &LINE_BREAK, Inline::Break);
    let text = spans.extract(&text, &ESCAPED, Inline::Escaped);
    let text = spans.extract(&text, &MATH, Inline::Math);
    let text = spans.extract(&text, &HREF, Inline::Href);
    let mut text = spans.extract(&text, &URL, Inline::Url);
    // Innermost first; each pass removes one level of braces.
    while STYLED.is_match(&text) {
        text = spans.extract(&text, &STYLED, Inline::Styled);
    }

    let text = escape_html(&text)
        .replace("---", "\u{2014}")
        .replace("--", "\u{2013}")
        .replace('~', "&nbsp;");

    spans.restore(&text, |span| match span.kind {
        Inline::Break => "<br>".to_string(),
        Inline::Escaped => escape_html(span.group(1)),
        Inline::Math => format!("<span class='math'>{}</span>", escape_html(span.group(1))),
        Inline::Href => format!(
            "<a href='{}'>{}</a>",
            escape_html(span.group(1)),
            escape_html(span.group(2))
        ),
        Inline::Url => {
            let url = escape_html(span.group(1));
            format!("<a href='{url}'>{url}</a>")
        }
        Inline::Styled => format!(
            "<span class='{}'>{}</span>",
            span.group(1),
            escape_html(span.group(2))
        ),
    })
}
