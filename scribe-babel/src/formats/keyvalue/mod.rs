//! Key-value configuration files
//!
//! One converter covers INI, YAML, JSON, TOML, Java properties, vCard, iCalendar and Zim
//! notebook configs. The file extension picks the [`KeyValueKind`], which decides the
//! separators a line is split on and which comment and section syntax applies. Rendering keeps
//! the source layout in a `<pre>` and only colours sections, comments, keys and values.

use crate::descriptor::{self, normalize_extension, FormatDescriptor};
use crate::document::{Metadata, ParseOptions, ParsedDocument};
use crate::format::Parser;
use crate::formats::common::{escape_html, line_finding, split_lines, stylesheet_or_empty};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyValueKind {
    Ini,
    Yaml,
    Json,
    Toml,
    Properties,
    Vcard,
    Icalendar,
    Zim,
    Generic,
}

impl KeyValueKind {
    pub fn from_extension(extension: &str) -> Self {
        match normalize_extension(extension).as_str() {
            ".ini" => KeyValueKind::Ini,
            ".yaml" | ".yml" => KeyValueKind::Yaml,
            ".json" => KeyValueKind::Json,
            ".toml" => KeyValueKind::Toml,
            ".properties" => KeyValueKind::Properties,
            ".vcf" => KeyValueKind::Vcard,
            ".ics" => KeyValueKind::Icalendar,
            ".zim" => KeyValueKind::Zim,
            _ => KeyValueKind::Generic,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            KeyValueKind::Ini => "ini",
            KeyValueKind::Yaml => "yaml",
            KeyValueKind::Json => "json",
            KeyValueKind::Toml => "toml",
            KeyValueKind::Properties => "properties",
            KeyValueKind::Vcard => "vcard",
            KeyValueKind::Icalendar => "icalendar",
            KeyValueKind::Zim => "zim",
            KeyValueKind::Generic => "generic",
        }
    }

    /// Characters that may separate a key from its value; the earliest one on a line wins
    fn separators(self) -> &'static [char] {
        match self {
            KeyValueKind::Yaml
            | KeyValueKind::Json
            | KeyValueKind::Vcard
            | KeyValueKind::Icalendar => &[':'],
            KeyValueKind::Toml => &['='],
            KeyValueKind::Ini
            | KeyValueKind::Properties
            | KeyValueKind::Zim
            | KeyValueKind::Generic => &['=', ':'],
        }
    }

    fn has_sections(self) -> bool {
        !matches!(
            self,
            KeyValueKind::Yaml | KeyValueKind::Json | KeyValueKind::Vcard | KeyValueKind::Icalendar
        )
    }

    fn is_comment(self, trimmed: &str) -> bool {
        match self {
            KeyValueKind::Properties => trimmed.starts_with(['#', '!']),
            KeyValueKind::Yaml | KeyValueKind::Toml => trimmed.starts_with('#'),
            KeyValueKind::Json => trimmed.starts_with("//"),
            KeyValueKind::Vcard | KeyValueKind::Icalendar => false,
            KeyValueKind::Ini | KeyValueKind::Zim | KeyValueKind::Generic => {
                trimmed.starts_with(['#', ';']) || trimmed.starts_with("//")
            }
        }
    }
}

/// How one source line reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Blank,
    Section(String),
    Comment,
    /// `split` is the byte offset of the separator in the raw line
    Pair {
        key: String,
        value: String,
        split: usize,
    },
    /// `- value` list entry
    Item(String),
    /// Brackets, braces and commas only, or a YAML document marker
    Structure,
    Text,
}

fn unquote(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

pub fn classify(line: &str, kind: KeyValueKind) -> Line {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Line::Blank;
    }
    if kind.is_comment(trimmed) {
        return Line::Comment;
    }
    if kind.has_sections() && trimmed.len() >= 2 && trimmed.starts_with('[') && trimmed.ends_with(']') {
        let name = trimmed.trim_start_matches('[').trim_end_matches(']').trim();
        return Line::Section(name.to_string());
    }
    if trimmed == "---" || trimmed == "..." || trimmed.chars().all(|c| "{}[],".contains(c)) {
        return Line::Structure;
    }
    if trimmed == "-" || trimmed.starts_with("- ") {
        return Line::Item(unquote(trimmed[1..].trim()).to_string());
    }
    if let Some(split) = line.find(kind.separators()) {
        let key = unquote(line[..split].trim());
        if !key.is_empty() {
            let mut value = line[split + 1..].trim();
            if kind == KeyValueKind::Json {
                value = value.strip_suffix(',').unwrap_or(value).trim_end();
            }
            return Line::Pair {
                key: key.to_string(),
                value: unquote(value).to_string(),
                split,
            };
        }
    }
    Line::Text
}

/// One key-value pair with the section it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValueEntry {
    /// Zero-based line index
    pub line: usize,
    pub section: Option<String>,
    pub key: String,
    pub value: String,
}

pub fn entries(content: &str, kind: KeyValueKind) -> Vec<KeyValueEntry> {
    let mut entries = Vec::new();
    let mut section = None;
    for (index, line) in split_lines(content).into_iter().enumerate() {
        match classify(line, kind) {
            Line::Section(name) => section = Some(name),
            Line::Pair { key, value, .. } => entries.push(KeyValueEntry {
                line: index,
                section: section.clone(),
                key,
                value,
            }),
            _ => {}
        }
    }
    entries
}

/// Findings for `content` read as `kind`
///
/// JSON is checked by actually parsing it; every other kind flags unindented lines that have
/// no separator. Indented lines count as continuations of the previous value.
pub fn validate_as(kind: KeyValueKind, content: &str) -> Vec<String> {
    if kind == KeyValueKind::Json {
        return match serde_json::from_str::<serde_json::Value>(content) {
            Ok(_) => Vec::new(),
            Err(err) => vec![format!("Invalid JSON: {err}")],
        };
    }

    let mut findings = Vec::new();
    for (index, line) in split_lines(content).into_iter().enumerate() {
        if classify(line, kind) == Line::Text && !line.starts_with([' ', '\t']) {
            findings.push(line_finding(index, "No key-value separator found"));
        }
    }
    findings
}

fn count_lines(content: &str, marker: &str) -> usize {
    split_lines(content)
        .into_iter()
        .filter(|line| line.trim().eq_ignore_ascii_case(marker))
        .count()
}

/// Parser implementation for key-value files
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyValueParser;

impl Parser for KeyValueParser {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &descriptor::KEYVALUE
    }

    fn parse(&self, content: &str, options: &ParseOptions) -> ParsedDocument {
        let extension = options.extension_or_empty();
        let kind = KeyValueKind::from_extension(&extension);
        let lines = split_lines(content);
        let classified: Vec<Line> = lines.iter().map(|line| classify(line, kind)).collect();

        let pairs = classified.iter().filter(|l| matches!(l, Line::Pair { .. })).count();
        let sections = classified.iter().filter(|l| matches!(l, Line::Section(_))).count();

        let mut metadata = Metadata::new();
        metadata.insert("type".into(), kind.as_str().into());
        metadata.insert("extension".into(), extension);
        metadata.insert("entries".into(), pairs.to_string());
        metadata.insert("lines".into(), lines.len().to_string());
        metadata.insert("sections".into(), sections.to_string());
        match kind {
            KeyValueKind::Json => {
                let valid = serde_json::from_str::<serde_json::Value>(content).is_ok();
                metadata.insert("valid_json".into(), valid.to_string());
            }
            KeyValueKind::Vcard => {
                metadata.insert("contacts".into(), count_lines(content, "BEGIN:VCARD").to_string());
            }
            KeyValueKind::Icalendar => {
                metadata.insert("events".into(), count_lines(content, "BEGIN:VEVENT").to_string());
            }
            _ => {}
        }

        let mut html = String::from("<div class='keyvalue'>");
        html.push_str(&stylesheet_or_empty(descriptor::KEYVALUE.id, true));
        html.push_str("<pre>");
        for (line, class) in lines.iter().zip(&classified) {
            html.push_str(&line_html(line, class));
            html.push('\n');
        }
        html.push_str("</pre></div>");

        ParsedDocument::new(self.descriptor(), content, html).with_metadata(metadata)
    }

    fn validate(&self, content: &str) -> Vec<String> {
        let kind = if content.trim_start().starts_with('{') {
            KeyValueKind::Json
        } else {
            KeyValueKind::Generic
        };
        validate_as(kind, content)
    }
}

fn line_html(line: &str, class: &Line) -> String {
    match class {
        Line::Blank => String::new(),
        Line::Section(_) => format!("<span class='kv-section'>{}</span>", escape_html(line)),
        Line::Comment => format!("<span class='kv-comment'>{}</span>", escape_html(line)),
        Line::Pair { split, .. } => format!(
            "<span class='kv-key'>{}</span><span class='kv-separator'>{}</span><span class='kv-value'>{}</span>",
            escape_html(&line[..*split]),
            escape_html(&line[*split..*split + 1]),
            escape_html(&line[*split + 1..])
        ),
        Line::Item(_) | Line::Structure | Line::Text => escape_html(line),
    }
}
