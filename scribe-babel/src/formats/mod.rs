//! Dialect implementations
//!
//! One module per dialect, each exposing a stateless `*Parser` unit struct that implements
//! [`Parser`]. Shared scanning helpers live in [`common`].

pub mod common;

pub mod asciidoc;
pub mod binary;
pub mod creole;
pub mod csv;
pub mod jupyter;
pub mod keyvalue;
pub mod latex;
pub mod markdown;
pub mod orgmode;
pub mod plaintext;
pub mod restructuredtext;
pub mod rmarkdown;
pub mod taskpaper;
pub mod textile;
pub mod tiddlywiki;
pub mod todotxt;
pub mod wikitext;

pub use asciidoc::AsciidocParser;
pub use binary::BinaryParser;
pub use creole::CreoleParser;
pub use csv::CsvParser;
pub use jupyter::JupyterParser;
pub use keyvalue::KeyValueParser;
pub use latex::LatexParser;
pub use markdown::MarkdownParser;
pub use orgmode::OrgModeParser;
pub use plaintext::PlaintextParser;
pub use restructuredtext::RestructuredTextParser;
pub use rmarkdown::RMarkdownParser;
pub use taskpaper::TaskpaperParser;
pub use textile::TextileParser;
pub use tiddlywiki::TiddlyWikiParser;
pub use todotxt::TodoTxtParser;
pub use wikitext::WikitextParser;

use crate::format::Parser;

/// Every built-in parser in registration order
///
/// Earlier entries win extension and content-sniffing ties. Plaintext comes last and acts as
/// the catch-all.
pub fn builtin_parsers() -> Vec<Box<dyn Parser>> {
    vec![
        Box::new(MarkdownParser),
        Box::new(TodoTxtParser),
        Box::new(CsvParser),
        Box::new(WikitextParser),
        Box::new(OrgModeParser),
        Box::new(CreoleParser),
        Box::new(TiddlyWikiParser),
        Box::new(LatexParser),
        Box::new(AsciidocParser),
        Box::new(RestructuredTextParser),
        Box::new(KeyValueParser),
        Box::new(TaskpaperParser),
        Box::new(TextileParser),
        Box::new(JupyterParser),
        Box::new(RMarkdownParser),
        Box::new(BinaryParser),
        Box::new(PlaintextParser),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ids;

    #[test]
    fn test_builtin_order() {
        let ids: Vec<&str> = builtin_parsers()
            .iter()
            .map(|parser| parser.descriptor().id)
            .collect();
        assert_eq!(ids.len(), 17);
        assert_eq!(ids.first(), Some(&ids::MARKDOWN));
        assert_eq!(ids.last(), Some(&ids::PLAINTEXT));
    }

    #[test]
    fn test_parsers_claim_their_own_descriptor() {
        for parser in builtin_parsers() {
            assert!(parser.can_parse(parser.descriptor()));
        }
    }
}
