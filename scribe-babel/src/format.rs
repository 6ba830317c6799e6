//! Parser trait definition
//!
//! Every dialect implements [`Parser`]. Implementations are stateless: all scanning state
//! lives in locals of a single call, so one instance can be shared across threads and
//! called concurrently.

use crate::descriptor::FormatDescriptor;
use crate::document::{ParseOptions, ParsedDocument};

/// Trait for dialect parsers
///
/// # Examples
///
/// ```ignore
/// struct MyParser;
///
/// impl Parser for MyParser {
///     fn descriptor(&self) -> &'static FormatDescriptor {
///         &MY_FORMAT
///     }
///
///     fn parse(&self, content: &str, _options: &ParseOptions) -> ParsedDocument {
///         ParsedDocument::new(self.descriptor(), content, escape_html(content))
///     }
/// }
/// ```
pub trait Parser: Send + Sync {
    /// The descriptor this parser handles
    fn descriptor(&self) -> &'static FormatDescriptor;

    /// Identity check against [`Parser::descriptor`]
    fn can_parse(&self, format: &FormatDescriptor) -> bool {
        format.id == self.descriptor().id
    }

    /// Parse content into a document. Never fails; malformed input degrades.
    fn parse(&self, content: &str, options: &ParseOptions) -> ParsedDocument;

    /// Re-render a document, selecting the light or dark stylesheet variant
    ///
    /// Default implementation returns the HTML produced at parse time. Dialects with themed
    /// stylesheets override this to render again from `raw_content`.
    fn to_html(&self, document: &ParsedDocument, _light_mode: bool) -> String {
        document.parsed_content.clone()
    }

    /// Advisory findings for `content`. Empty means "no findings", not "valid".
    fn validate(&self, _content: &str) -> Vec<String> {
        Vec::new()
    }
}
