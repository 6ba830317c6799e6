//! Format detection and HTML rendering for lightweight markup dialects
//!
//!     This crate turns text documents written in one of seventeen markup dialects (Markdown,
//!     Org-mode, reStructuredText, todo.txt, Jupyter notebooks, ...) into self-contained HTML
//!     fragments, and tells callers which dialect a document is in.
//!
//!     This is a pure lib: it powers the scribe CLI but is shell agnostic, so no code here
//!     prints, reads environment variables or touches the filesystem. Configuration arrives
//!     through [`ParseOptions`].
//!
//!     The file structure:
//!     .
//!     ├── error.rs                # FormatError for registry lookups and configuration
//!     ├── descriptor.rs           # FormatDescriptor table and extension helpers
//!     ├── document.rs             # ParseOptions and ParsedDocument
//!     ├── format.rs               # Parser trait definition
//!     ├── registry.rs             # FormatRegistry for detection and dispatch
//!     ├── formats
//!     │   ├── common              # Escaping, protected inline spans, lists, stylesheets
//!     │   ├── <dialect>
//!     │   │   └── mod.rs          # Parser implementation
//!     │   └── mod.rs              # builtin_parsers() in registration order
//!     └── lib.rs
//!
//! Conversion Model
//!
//!     Every converter is a single forward pass over the lines of the input. Block structure is
//!     tracked with a small amount of state (open list stack, open table, open fenced block) and
//!     closed at the end of input, so the output is always well formed even when the input is
//!     not. Inline markup goes through [`formats::common::InlineSpans`]: spans whose content must
//!     not be reformatted (code, links, images) are lifted out before HTML escaping and restored
//!     afterwards.
//!
//!     Converters never fail. Malformed input degrades to escaped text, and problems are
//!     reported as advisory findings through [`Parser::validate`].
//!
//! Detection
//!
//!     [`FormatRegistry::detect`] resolves a dialect from a filename (whole-filename claims
//!     first, then the extension) and falls back to sniffing the first lines of the content.
//!     Plaintext is registered last and is the catch-all.
//!
//! Testing
//!     tests
//!     ├── lib.rs                  # Declares the modules below
//!     ├── common/mod.rs           # Shared helpers
//!     └── <topic>.rs
//!
//!     Note that rust does not by default discover tests in subdirectories, so these are
//!     included as modules of tests/lib.rs.

pub mod descriptor;
pub mod document;
pub mod error;
pub mod format;
pub mod formats;
pub mod registry;

pub use descriptor::{ids, FormatDescriptor};
pub use document::{Metadata, ParseOptions, ParsedDocument};
pub use error::FormatError;
pub use format::Parser;
pub use registry::FormatRegistry;
