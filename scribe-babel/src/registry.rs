//! Format registry for detection and dispatch
//!
//! The registry owns one parser per dialect together with its descriptor and the compiled
//! content-sniffing patterns. It is built once (usually through [`FormatRegistry::with_defaults`])
//! and is read-only afterwards, so a shared reference can be handed to any number of threads.
//!
//! Registration order matters: when several descriptors claim the same extension, or several
//! sniffing patterns fire, the earliest registration wins. The built-in order keeps the
//! plaintext descriptor last, where it doubles as the catch-all fallback.

use crate::descriptor::{self, extension_of, ids, normalize_extension, FormatDescriptor};
use crate::document::{ParseOptions, ParsedDocument};
use crate::error::FormatError;
use crate::format::Parser;
use regex::{Regex, RegexBuilder};
use tracing::{debug, error, trace};

struct Entry {
    descriptor: &'static FormatDescriptor,
    sniffers: Vec<Regex>,
    parser: Box<dyn Parser>,
}

/// Registry of dialect parsers
///
/// # Examples
///
/// ```ignore
/// let registry = FormatRegistry::with_defaults();
/// let format = registry.detect_by_extension(".md");
/// let doc = registry.parse_as(format.id, "# Title", &ParseOptions::new())?;
/// ```
pub struct FormatRegistry {
    entries: Vec<Entry>,
    sniff_lines: usize,
}

impl FormatRegistry {
    /// Number of leading lines inspected by [`FormatRegistry::detect_by_content`]
    pub const DEFAULT_SNIFF_LINES: usize = 10;

    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            entries: Vec::new(),
            sniff_lines: Self::DEFAULT_SNIFF_LINES,
        }
    }

    /// Change how many leading lines content sniffing looks at (minimum 1)
    pub fn with_sniff_lines(mut self, lines: usize) -> Self {
        self.sniff_lines = lines.max(1);
        self
    }

    /// Register a parser and its descriptor
    ///
    /// Registering a second parser for an id that is already present is a configuration
    /// error and is rejected; the first registration stays in place.
    pub fn register<P: Parser + 'static>(&mut self, parser: P) -> Result<(), FormatError> {
        self.register_boxed(Box::new(parser))
    }

    /// Register an already boxed parser
    pub fn register_boxed(&mut self, parser: Box<dyn Parser>) -> Result<(), FormatError> {
        let descriptor = parser.descriptor();
        if self.has(descriptor.id) {
            return Err(FormatError::DuplicateFormat(descriptor.id.to_string()));
        }

        let sniffers = descriptor
            .detection_patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .multi_line(true)
                    .build()
                    .map_err(|err| FormatError::InvalidPattern {
                        format: descriptor.id.to_string(),
                        pattern: pattern.to_string(),
                        message: err.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.entries.push(Entry {
            descriptor,
            sniffers,
            parser,
        });
        Ok(())
    }

    /// Get a parser by format id
    pub fn get(&self, id: &str) -> Result<&dyn Parser, FormatError> {
        self.entry(id)
            .map(|entry| entry.parser.as_ref())
            .ok_or_else(|| FormatError::FormatNotFound(id.to_string()))
    }

    /// Exact descriptor lookup by id
    pub fn get_by_id(&self, id: &str) -> Option<&'static FormatDescriptor> {
        self.entry(id).map(|entry| entry.descriptor)
    }

    /// Check if a format exists
    pub fn has(&self, id: &str) -> bool {
        self.entry(id).is_some()
    }

    /// Alias of [`FormatRegistry::has`]
    pub fn is_supported(&self, id: &str) -> bool {
        self.has(id)
    }

    /// All descriptors in registration order
    pub fn formats(&self) -> impl Iterator<Item = &'static FormatDescriptor> + '_ {
        self.entries.iter().map(|entry| entry.descriptor)
    }

    /// Format ids in registration order
    pub fn format_names(&self) -> Vec<&'static str> {
        self.formats().map(|format| format.id).collect()
    }

    /// List all available format ids (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats().map(|f| f.id.to_string()).collect();
        names.sort();
        names
    }

    /// Every claimed extension, sorted and de-duplicated
    pub fn all_extensions(&self) -> Vec<&'static str> {
        let mut extensions: Vec<_> = self
            .formats()
            .flat_map(|format| format.extensions.iter().copied())
            .collect();
        extensions.sort_unstable();
        extensions.dedup();
        extensions
    }

    /// Whether any descriptor claims `extension`
    pub fn is_extension_supported(&self, extension: &str) -> bool {
        self.get_by_extension(extension).is_some()
    }

    /// First descriptor (in registration order) claiming `extension`
    pub fn get_by_extension(&self, extension: &str) -> Option<&'static FormatDescriptor> {
        let normalized = normalize_extension(extension);
        self.formats()
            .find(|format| format.extensions.contains(&normalized.as_str()))
    }

    /// Every descriptor claiming `extension`, in registration order
    pub fn formats_by_extension(&self, extension: &str) -> Vec<&'static FormatDescriptor> {
        let normalized = normalize_extension(extension);
        self.formats()
            .filter(|format| format.extensions.contains(&normalized.as_str()))
            .collect()
    }

    /// Like [`FormatRegistry::get_by_extension`], but falls back to the catch-all descriptor
    pub fn detect_by_extension(&self, extension: &str) -> &'static FormatDescriptor {
        match self.get_by_extension(extension) {
            Some(format) => {
                debug!(extension, format = format.id, "resolved format by extension");
                format
            }
            None => {
                let fallback = self.fallback();
                debug!(extension, format = fallback.id, "no format claims extension, falling back");
                fallback
            }
        }
    }

    /// Resolve a filename: whole-filename claims first, then the extension, then the fallback
    pub fn detect_by_filename(&self, filename: &str) -> &'static FormatDescriptor {
        if let Some(format) = self.formats().find(|format| format.claims_filename(filename)) {
            debug!(filename, format = format.id, "resolved format by filename");
            return format;
        }
        match extension_of(filename) {
            Some(extension) => self.detect_by_extension(&extension),
            None => self.fallback(),
        }
    }

    /// First descriptor whose sniffing patterns match the leading lines of `content`
    ///
    /// Returns `None` for blank content or when no pattern fires; callers fall back to
    /// extension-based or generic detection.
    pub fn detect_by_content(&self, content: &str) -> Option<&'static FormatDescriptor> {
        let head = self.sniff_head(content)?;
        let found = self
            .entries
            .iter()
            .find(|entry| entry.sniffers.iter().any(|re| re.is_match(&head)))
            .map(|entry| entry.descriptor);
        if let Some(format) = found {
            debug!(format = format.id, "resolved format by content");
        }
        found
    }

    /// Resolve the format for a document
    ///
    /// With a filename, whole-filename claims and unambiguous extensions decide. When several
    /// descriptors claim the extension, content sniffing picks among them (falling back to the
    /// first claimant). A filename with an unclaimed extension resolves to the catch-all. Without
    /// a usable filename, content sniffing decides, then the catch-all.
    pub fn detect(&self, content: &str, filename: Option<&str>) -> &'static FormatDescriptor {
        if let Some(filename) = filename.filter(|name| !name.trim().is_empty()) {
            if let Some(format) = self.formats().find(|format| format.claims_filename(filename)) {
                debug!(filename, format = format.id, "resolved format by filename");
                return format;
            }
            if let Some(extension) = extension_of(filename) {
                let claimants = self.formats_by_extension(&extension);
                return match claimants.as_slice() {
                    [] => self.detect_by_extension(&extension),
                    [only] => *only,
                    [first, ..] => self.sniff_among(content, &claimants).unwrap_or(*first),
                };
            }
        }
        self.detect_by_content(content)
            .unwrap_or_else(|| self.fallback())
    }

    /// Parser registered for `descriptor`
    pub fn parser_for(&self, descriptor: &FormatDescriptor) -> Option<&dyn Parser> {
        self.get(descriptor.id).ok()
    }

    /// Detect the format from `options.filename` and `content`, then parse
    pub fn parse(
        &self,
        content: &str,
        options: &ParseOptions,
    ) -> Result<ParsedDocument, FormatError> {
        let format = self.detect(content, options.filename.as_deref());
        self.parse_as(format.id, content, options)
    }

    /// Parse with an explicit format id
    pub fn parse_as(
        &self,
        id: &str,
        content: &str,
        options: &ParseOptions,
    ) -> Result<ParsedDocument, FormatError> {
        let parser = self.get(id)?;
        trace!(format = id, bytes = content.len(), "parsing document");
        Ok(parser.parse(content, options))
    }

    /// Re-render a parsed document with its own parser
    pub fn to_html(
        &self,
        document: &ParsedDocument,
        light_mode: bool,
    ) -> Result<String, FormatError> {
        Ok(self.get(document.format.id)?.to_html(document, light_mode))
    }

    /// Validate content with an explicit format id
    pub fn validate(&self, id: &str, content: &str) -> Result<Vec<String>, FormatError> {
        Ok(self.get(id)?.validate(content))
    }

    /// Create a registry with the built-in dialects
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for parser in crate::formats::builtin_parsers() {
            if let Err(err) = registry.register_boxed(parser) {
                error!(%err, "skipping built-in parser");
            }
        }
        registry
    }

    fn entry(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.descriptor.id == id)
    }

    fn fallback(&self) -> &'static FormatDescriptor {
        self.get_by_id(ids::PLAINTEXT)
            .or_else(|| self.entries.last().map(|entry| entry.descriptor))
            .unwrap_or(&descriptor::PLAINTEXT)
    }

    fn sniff_head(&self, content: &str) -> Option<String> {
        if content.trim().is_empty() {
            return None;
        }
        Some(
            content
                .lines()
                .take(self.sniff_lines)
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }

    fn sniff_among(
        &self,
        content: &str,
        candidates: &[&'static FormatDescriptor],
    ) -> Option<&'static FormatDescriptor> {
        let head = self.sniff_head(content)?;
        self.entries
            .iter()
            .filter(|entry| candidates.iter().any(|c| c.id == entry.descriptor.id))
            .find(|entry| entry.sniffers.iter().any(|re| re.is_match(&head)))
            .map(|entry| entry.descriptor)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::common::escape_html;

    static TEST_FORMAT: FormatDescriptor = FormatDescriptor {
        id: "test",
        name: "Test",
        default_extension: ".tst",
        extensions: &[".tst", ".shared"],
        filenames: &[],
        detection_patterns: &[r"^%test%"],
    };

    static OTHER_FORMAT: FormatDescriptor = FormatDescriptor {
        id: "other",
        name: "Other",
        default_extension: ".oth",
        extensions: &[".oth", ".shared"],
        filenames: &["special.shared"],
        detection_patterns: &[r"^%other%"],
    };

    static BROKEN_FORMAT: FormatDescriptor = FormatDescriptor {
        id: "broken",
        name: "Broken",
        default_extension: ".brk",
        extensions: &[".brk"],
        filenames: &[],
        detection_patterns: &[r"(unclosed"],
    };

    struct TestParser(&'static FormatDescriptor);

    impl Parser for TestParser {
        fn descriptor(&self) -> &'static FormatDescriptor {
            self.0
        }

        fn parse(&self, content: &str, _options: &ParseOptions) -> ParsedDocument {
            ParsedDocument::new(self.0, content, format!("<pre>{}</pre>", escape_html(content)))
        }
    }

    fn two_format_registry() -> FormatRegistry {
        let mut registry = FormatRegistry::new();
        registry.register(TestParser(&TEST_FORMAT)).unwrap();
        registry.register(TestParser(&OTHER_FORMAT)).unwrap();
        registry
    }

    #[test]
    fn test_registry_creation() {
        let registry = FormatRegistry::new();
        assert_eq!(registry.entries.len(), 0);
        assert_eq!(registry.formats().count(), 0);
    }

    #[test]
    fn test_registry_register() {
        let mut registry = FormatRegistry::new();
        registry.register(TestParser(&TEST_FORMAT)).unwrap();

        assert!(registry.has("test"));
        assert_eq!(registry.list_formats(), vec!["test"]);
    }

    #[test]
    fn test_registry_rejects_duplicate_id() {
        let mut registry = FormatRegistry::new();
        registry.register(TestParser(&TEST_FORMAT)).unwrap();
        let result = registry.register(TestParser(&TEST_FORMAT));

        assert_eq!(result, Err(FormatError::DuplicateFormat("test".to_string())));
        assert_eq!(registry.list_formats().len(), 1);
    }

    #[test]
    fn test_registry_rejects_invalid_pattern() {
        let mut registry = FormatRegistry::new();
        let result = registry.register(TestParser(&BROKEN_FORMAT));

        assert!(matches!(result, Err(FormatError::InvalidPattern { .. })));
        assert!(!registry.has("broken"));
    }

    #[test]
    fn test_registry_get() {
        let registry = two_format_registry();
        let parser = registry.get("test");
        assert!(parser.is_ok());
        assert_eq!(parser.unwrap().descriptor().id, "test");
    }

    #[test]
    fn test_registry_get_nonexistent() {
        let registry = FormatRegistry::new();
        match registry.get("nonexistent") {
            Err(FormatError::FormatNotFound(id)) => assert_eq!(id, "nonexistent"),
            _ => panic!("Expected FormatNotFound error"),
        }
        assert!(registry.get_by_id("nonexistent").is_none());
    }

    #[test]
    fn test_overlapping_extension_first_registration_wins() {
        let registry = two_format_registry();
        assert_eq!(registry.get_by_extension("shared").map(|f| f.id), Some("test"));
        let claimants: Vec<_> = registry
            .formats_by_extension(".SHARED")
            .iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(claimants, vec!["test", "other"]);
    }

    #[test]
    fn test_ambiguous_extension_uses_content_sniff() {
        let registry = two_format_registry();
        assert_eq!(registry.detect("%other%\nbody", Some("x.shared")).id, "other");
        assert_eq!(registry.detect("nothing special", Some("x.shared")).id, "test");
        assert_eq!(registry.detect("", Some("special.shared")).id, "other");
    }

    #[test]
    fn test_fallback_without_plaintext_is_last_registered() {
        let registry = two_format_registry();
        assert_eq!(registry.detect_by_extension(".unknown").id, "other");
        assert_eq!(FormatRegistry::new().detect_by_extension(".x").id, "plaintext");
    }

    #[test]
    fn test_detect_by_content_respects_sniff_lines() {
        let registry = two_format_registry().with_sniff_lines(2);
        assert_eq!(
            registry.detect_by_content("a\n%test%\n").map(|f| f.id),
            Some("test")
        );
        assert_eq!(registry.detect_by_content("a\nb\n%test%\n"), None);
        assert_eq!(registry.detect_by_content("   \n\t"), None);
    }

    #[test]
    fn test_registry_parse_not_found() {
        let registry = FormatRegistry::new();
        match registry.parse_as("nonexistent", "input", &ParseOptions::new()) {
            Err(FormatError::FormatNotFound(id)) => assert_eq!(id, "nonexistent"),
            _ => panic!("Expected FormatNotFound error"),
        }
    }

    #[test]
    fn test_registry_parse_dispatches_on_filename() {
        let registry = two_format_registry();
        let options = ParseOptions::new().with_filename("doc.oth");
        let doc = registry.parse("a < b", &options).unwrap();
        assert_eq!(doc.format.id, "other");
        assert_eq!(doc.parsed_content, "<pre>a &lt; b</pre>");
        assert_eq!(registry.to_html(&doc, true).unwrap(), doc.parsed_content);
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = FormatRegistry::with_defaults();
        assert_eq!(registry.formats().count(), 17);
        assert!(registry.has("markdown"));
        assert!(registry.has("taskpaper"));
        assert!(registry.has("jupyter"));
        assert_eq!(registry.format_names().last(), Some(&"plaintext"));
    }

    #[test]
    fn test_registry_default_trait() {
        let registry = FormatRegistry::default();
        assert!(registry.has("plaintext"));
        assert!(registry.is_supported("csv"));
        assert!(!registry.is_supported("docx"));
    }

    #[test]
    fn test_all_extensions_sorted_and_unique() {
        let registry = FormatRegistry::with_defaults();
        let extensions = registry.all_extensions();
        let mut sorted = extensions.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(extensions, sorted);
        assert!(registry.is_extension_supported("MD"));
        assert!(!registry.is_extension_supported(".nope"));
    }
}
