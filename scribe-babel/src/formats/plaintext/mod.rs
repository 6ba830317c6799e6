//! Plain text and the catch-all fallback
//!
//! The filename extension picks a [`PlaintextKind`]. Every kind renders as escaped,
//! preformatted text; source code gets a language label, JSON is pretty-printed first and HTML
//! is shown as source rather than injected into the preview.

use crate::descriptor::{self, FormatDescriptor};
use crate::document::{Metadata, ParseOptions, ParsedDocument};
use crate::format::Parser;
use crate::formats::common::{escape_html, split_lines, stylesheet_or_empty};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaintextKind {
    Plain,
    Html,
    Code,
    Json,
    Xml,
    Markdown,
}

impl PlaintextKind {
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            ".html" | ".htm" => PlaintextKind::Html,
            ".json" => PlaintextKind::Json,
            ".xml" | ".xlf" => PlaintextKind::Xml,
            ".md" | ".markdown" => PlaintextKind::Markdown,
            _ if code_language(extension).is_some() => PlaintextKind::Code,
            _ => PlaintextKind::Plain,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlaintextKind::Plain => "plain",
            PlaintextKind::Html => "html",
            PlaintextKind::Code => "code",
            PlaintextKind::Json => "json",
            PlaintextKind::Xml => "xml",
            PlaintextKind::Markdown => "markdown",
        }
    }
}

/// Highlighting language for a source file extension
pub fn code_language(extension: &str) -> Option<&'static str> {
    let language = match extension {
        ".py" => "python",
        ".js" | ".mjs" => "javascript",
        ".ts" => "typescript",
        ".java" => "java",
        ".kt" => "kotlin",
        ".c" => "c",
        ".cpp" | ".cc" | ".cxx" | ".h" | ".hpp" | ".mm" => "cpp",
        ".cs" => "csharp",
        ".rb" => "ruby",
        ".php" => "php",
        ".swift" => "swift",
        ".rs" => "rust",
        ".go" => "go",
        ".sh" | ".bash" => "bash",
        ".css" => "css",
        ".sql" => "sql",
        ".yaml" | ".yml" => "yaml",
        ".r" => "r",
        ".lua" => "lua",
        ".pl" | ".perl" => "perl",
        ".diff" | ".patch" => "diff",
        ".qml" => "qml",
        ".groovy" => "groovy",
        ".scala" => "scala",
        ".dart" => "dart",
        _ => return None,
    };
    Some(language)
}

/// Pretty-printed JSON, or the input unchanged when it does not parse
pub fn pretty_json(content: &str) -> String {
    serde_json::from_str::<serde_json::Value>(content)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| content.to_string())
}

/// Parser implementation for plain text
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaintextParser;

impl Parser for PlaintextParser {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &descriptor::PLAINTEXT
    }

    fn parse(&self, content: &str, options: &ParseOptions) -> ParsedDocument {
        let extension = options.extension_or_empty();
        let kind = PlaintextKind::from_extension(&extension);
        let text = match kind {
            PlaintextKind::Json => pretty_json(content),
            _ => content.to_string(),
        };

        let mut metadata = Metadata::new();
        metadata.insert("type".into(), kind.as_str().to_string());
        metadata.insert("extension".into(), extension.clone());
        metadata.insert("lines".into(), split_lines(&text).len().to_string());
        metadata.insert("characters".into(), text.chars().count().to_string());

        let html = render(kind, &extension, &text, options);
        ParsedDocument::new(self.descriptor(), content, html).with_metadata(metadata)
    }
}

fn body(text: &str, line_numbers: bool) -> String {
    if !line_numbers {
        return escape_html(text);
    }
    split_lines(text)
        .iter()
        .enumerate()
        .map(|(index, line)| {
            format!(
                "<span class='line-number'>{}</span>{}",
                index + 1,
                escape_html(line)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render(kind: PlaintextKind, extension: &str, text: &str, options: &ParseOptions) -> String {
    let language = match kind {
        PlaintextKind::Code => code_language(extension),
        PlaintextKind::Html => Some("html"),
        PlaintextKind::Json => Some("json"),
        PlaintextKind::Xml => Some("xml"),
        PlaintextKind::Plain | PlaintextKind::Markdown => None,
    };

    let mut html = match kind {
        PlaintextKind::Plain | PlaintextKind::Markdown => String::from("<div class='plaintext'>"),
        _ => String::from("<div class='plaintext code-block'>"),
    };
    html.push_str(&stylesheet_or_empty(descriptor::PLAINTEXT.id, true));
    match language {
        Some(language) => {
            if kind == PlaintextKind::Code {
                html.push_str(&format!("<div class='code-language'>{language}</div>"));
            }
            let class = if options.highlighting {
                format!(" class='language-{language}'")
            } else {
                String::new()
            };
            html.push_str(&format!(
                "<pre><code{class}>{}</code></pre>",
                body(text, options.line_numbers)
            ));
        }
        None => html.push_str(&format!("<pre>{}</pre>", body(text, options.line_numbers))),
    }
    html.push_str("</div>");
    html
}
