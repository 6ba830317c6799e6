//! Parse inputs and outputs
//!
//! [`ParseOptions`] carries the caller's hints into a parse (chiefly the filename), and
//! [`ParsedDocument`] is the immutable value every parser returns.

use crate::descriptor::{extension_of, FormatDescriptor};
use std::collections::BTreeMap;

/// Dialect-specific metadata: string keys to string values.
pub type Metadata = BTreeMap<String, String>;

/// Options threaded into [`crate::Parser::parse`]
///
/// `filename` selects sub-types such as the key-value flavour or the code language label.
/// `line_numbers` and `highlighting` shape preformatted plain text, and `base_url` prefixes
/// binary media paths. Every field is optional; an empty set of options is always valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub filename: Option<String>,
    pub line_numbers: bool,
    /// Tag code blocks with a `language-*` class for client-side highlighters (on by default)
    pub highlighting: bool,
    pub base_url: Option<String>,
    /// Free-form key/value options (e.g. from `--extra-*` CLI flags)
    pub extra: BTreeMap<String, String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            filename: None,
            line_numbers: false,
            highlighting: true,
            base_url: None,
            extra: BTreeMap::new(),
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_line_numbers(mut self, enabled: bool) -> Self {
        self.line_numbers = enabled;
        self
    }

    pub fn with_highlighting(mut self, enabled: bool) -> Self {
        self.highlighting = enabled;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Normalized extension of `filename`, e.g. `Some(".md")`.
    pub fn extension(&self) -> Option<String> {
        self.filename.as_deref().and_then(extension_of)
    }

    /// Normalized extension of `filename`, or the empty string.
    pub fn extension_or_empty(&self) -> String {
        self.extension().unwrap_or_default()
    }
}

/// The result of parsing one document
///
/// `raw_content` always echoes the input unchanged. `parsed_content` is an HTML fragment
/// meant to be embedded inside a caller-supplied page, never a full document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub format: &'static FormatDescriptor,
    pub raw_content: String,
    pub parsed_content: String,
    pub metadata: Metadata,
    pub errors: Vec<String>,
}

impl ParsedDocument {
    pub fn new(
        format: &'static FormatDescriptor,
        raw_content: impl Into<String>,
        parsed_content: impl Into<String>,
    ) -> Self {
        ParsedDocument {
            format,
            raw_content: raw_content.into(),
            parsed_content: parsed_content.into(),
            metadata: Metadata::new(),
            errors: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }

    /// Metadata value for `key`, if present
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::MARKDOWN;

    #[test]
    fn test_options_extension() {
        let options = ParseOptions::new().with_filename("docs/Readme.MD");
        assert_eq!(options.extension(), Some(".md".to_string()));
        assert_eq!(ParseOptions::new().extension(), None);
        assert_eq!(ParseOptions::new().extension_or_empty(), "");
    }

    #[test]
    fn test_options_builder() {
        assert!(ParseOptions::new().highlighting);
        let options = ParseOptions::new()
            .with_line_numbers(true)
            .with_highlighting(false)
            .with_base_url("https://example.org/")
            .with_extra("theme", "dark");
        assert!(options.line_numbers);
        assert!(!options.highlighting);
        assert_eq!(options.base_url.as_deref(), Some("https://example.org/"));
        assert_eq!(options.extra.get("theme").map(String::as_str), Some("dark"));
    }

    #[test]
    fn test_document_meta() {
        let mut metadata = Metadata::new();
        metadata.insert("lines".to_string(), "3".to_string());
        let doc = ParsedDocument::new(&MARKDOWN, "a\nb\nc", "<p>a b c</p>").with_metadata(metadata);
        assert_eq!(doc.meta("lines"), Some("3"));
        assert_eq!(doc.meta("missing"), None);
        assert_eq!(doc.format.id, "markdown");
    }
}
