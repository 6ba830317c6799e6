//! Format descriptor table
//!
//! A [`FormatDescriptor`] is the immutable identity record of one dialect: its stable id,
//! display name, the extensions and filenames it claims, and the content-sniffing patterns
//! used when no filename is available. Every built-in descriptor is a `static` in this
//! module; parsers hand out `&'static` references to them, so a [`crate::ParsedDocument`]
//! always points at the exact descriptor of the parser that produced it.
//!
//! Extension claims are disjoint across the built-in table. Where two dialects share a
//! conventional extension (todo.txt files are plain `.txt`), the more specific dialect claims
//! whole filenames instead (see [`FormatDescriptor::filenames`]).

/// Stable format identifiers, persisted by callers as "last known format".
pub mod ids {
    pub const PLAINTEXT: &str = "plaintext";
    pub const MARKDOWN: &str = "markdown";
    pub const TODOTXT: &str = "todotxt";
    pub const CSV: &str = "csv";
    pub const WIKITEXT: &str = "wikitext";
    pub const KEYVALUE: &str = "keyvalue";
    pub const ASCIIDOC: &str = "asciidoc";
    pub const ORGMODE: &str = "orgmode";
    pub const LATEX: &str = "latex";
    pub const RESTRUCTUREDTEXT: &str = "restructuredtext";
    pub const TASKPAPER: &str = "taskpaper";
    pub const TEXTILE: &str = "textile";
    pub const CREOLE: &str = "creole";
    pub const TIDDLYWIKI: &str = "tiddlywiki";
    pub const JUPYTER: &str = "jupyter";
    pub const RMARKDOWN: &str = "rmarkdown";
    pub const BINARY: &str = "binary";
}

/// Immutable description of one supported dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatDescriptor {
    /// Unique id, stable across runs (e.g. "markdown", "taskpaper")
    pub id: &'static str,
    /// Human-readable name
    pub name: &'static str,
    /// Default extension, dot-prefixed and lowercase
    pub default_extension: &'static str,
    /// Claimed extensions, dot-prefixed and lowercase
    pub extensions: &'static [&'static str],
    /// Claimed filename suffixes, lowercase (e.g. "todo.txt")
    pub filenames: &'static [&'static str],
    /// Multi-line regex patterns evaluated against the first lines of a document
    pub detection_patterns: &'static [&'static str],
}

impl FormatDescriptor {
    /// Whether `extension` is claimed. The argument is normalized first.
    pub fn claims_extension(&self, extension: &str) -> bool {
        let normalized = normalize_extension(extension);
        !normalized.is_empty() && self.extensions.contains(&normalized.as_str())
    }

    /// Whether the final path component of `filename` ends with a claimed filename.
    pub fn claims_filename(&self, filename: &str) -> bool {
        let name = file_name(filename).to_lowercase();
        self.filenames.iter().any(|claimed| {
            name == *claimed
                || name
                    .strip_suffix(claimed)
                    .is_some_and(|prefix| prefix.ends_with(['-', '_', '.']))
        })
    }
}

/// Normalize an extension to lowercase with a leading dot. Blank input stays empty.
pub fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(".{}", trimmed.to_lowercase())
    }
}

/// Extension of `filename` (text after the last dot of the last path component),
/// normalized, or `None` when there is none.
pub fn extension_of(filename: &str) -> Option<String> {
    let name = file_name(filename);
    let dot = name.rfind('.')?;
    let extension = normalize_extension(&name[dot..]);
    (!extension.is_empty()).then_some(extension)
}

/// Last path component of `path`
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

pub static MARKDOWN: FormatDescriptor = FormatDescriptor {
    id: ids::MARKDOWN,
    name: "Markdown",
    default_extension: ".md",
    extensions: &[".md", ".markdown", ".mdown", ".mkd", ".mkdn"],
    filenames: &[],
    detection_patterns: &[r"^#{1,6} ", r"^\[.*\]\(.*\)", r"^\*\*.*\*\*"],
};

pub static TODOTXT: FormatDescriptor = FormatDescriptor {
    id: ids::TODOTXT,
    name: "Todo.txt",
    default_extension: ".txt",
    extensions: &[],
    filenames: &["todo.txt", "done.txt"],
    detection_patterns: &[r"^\([A-Z]\) ", r"^x \d{4}-\d{2}-\d{2}"],
};

pub static CSV: FormatDescriptor = FormatDescriptor {
    id: ids::CSV,
    name: "CSV",
    default_extension: ".csv",
    extensions: &[".csv"],
    filenames: &[],
    detection_patterns: &[r"^.*,.*,.*$"],
};

pub static WIKITEXT: FormatDescriptor = FormatDescriptor {
    id: ids::WIKITEXT,
    name: "WikiText",
    default_extension: ".wiki",
    extensions: &[".wiki", ".wikitext"],
    filenames: &[],
    detection_patterns: &[
        r"^Content-Type: text/x-zim-wiki",
        r"^==+ .* ==+$",
        r"^\[\[.*\]\]",
    ],
};

pub static ORGMODE: FormatDescriptor = FormatDescriptor {
    id: ids::ORGMODE,
    name: "Org Mode",
    default_extension: ".org",
    extensions: &[".org"],
    filenames: &[],
    detection_patterns: &[r"^\* ", r"^#\+"],
};

pub static CREOLE: FormatDescriptor = FormatDescriptor {
    id: ids::CREOLE,
    name: "Creole",
    default_extension: ".creole",
    extensions: &[".creole"],
    filenames: &[],
    detection_patterns: &[r"^=+ ", r"^\*\* "],
};

pub static TIDDLYWIKI: FormatDescriptor = FormatDescriptor {
    id: ids::TIDDLYWIKI,
    name: "TiddlyWiki",
    default_extension: ".tid",
    extensions: &[".tid", ".tiddler", ".tiddly"],
    filenames: &[],
    detection_patterns: &[r"^!+ ", r"^title: "],
};

pub static LATEX: FormatDescriptor = FormatDescriptor {
    id: ids::LATEX,
    name: "LaTeX",
    default_extension: ".tex",
    extensions: &[".tex", ".latex"],
    filenames: &[],
    detection_patterns: &[r"\\documentclass", r"\\begin\{document\}"],
};

pub static ASCIIDOC: FormatDescriptor = FormatDescriptor {
    id: ids::ASCIIDOC,
    name: "AsciiDoc",
    default_extension: ".adoc",
    extensions: &[".adoc", ".asciidoc", ".asc"],
    filenames: &[],
    detection_patterns: &[r"^= ", r"^== "],
};

pub static RESTRUCTUREDTEXT: FormatDescriptor = FormatDescriptor {
    id: ids::RESTRUCTUREDTEXT,
    name: "reStructuredText",
    default_extension: ".rst",
    extensions: &[".rst", ".rest"],
    filenames: &[],
    detection_patterns: &[r"^=+$", r"^-+$", r"^\.\. "],
};

pub static KEYVALUE: FormatDescriptor = FormatDescriptor {
    id: ids::KEYVALUE,
    name: "Key-Value",
    default_extension: ".properties",
    extensions: &[
        ".keyvalue",
        ".properties",
        ".ini",
        ".yml",
        ".yaml",
        ".toml",
        ".vcf",
        ".ics",
        ".json",
        ".zim",
    ],
    filenames: &[],
    detection_patterns: &[r"^[a-zA-Z_]+\s*=", r"^\[.*\]$"],
};

pub static TASKPAPER: FormatDescriptor = FormatDescriptor {
    id: ids::TASKPAPER,
    name: "TaskPaper",
    default_extension: ".taskpaper",
    extensions: &[".taskpaper"],
    filenames: &[],
    detection_patterns: &[r"^\t- ", r"^.*:$"],
};

pub static TEXTILE: FormatDescriptor = FormatDescriptor {
    id: ids::TEXTILE,
    name: "Textile",
    default_extension: ".textile",
    extensions: &[".textile"],
    filenames: &[],
    detection_patterns: &[r"^h[1-6]\. ", r"^bq\. "],
};

pub static JUPYTER: FormatDescriptor = FormatDescriptor {
    id: ids::JUPYTER,
    name: "Jupyter Notebook",
    default_extension: ".ipynb",
    extensions: &[".ipynb"],
    filenames: &[],
    detection_patterns: &[r#""nbformat"\s*:"#, r#""cell_type"\s*:"#],
};

pub static RMARKDOWN: FormatDescriptor = FormatDescriptor {
    id: ids::RMARKDOWN,
    name: "R Markdown",
    default_extension: ".rmd",
    extensions: &[".rmd", ".rmarkdown"],
    filenames: &[],
    detection_patterns: &[r"```\{r"],
};

pub static BINARY: FormatDescriptor = FormatDescriptor {
    id: ids::BINARY,
    name: "Binary",
    default_extension: ".bin",
    extensions: &[
        // images
        ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".webp", ".ico", ".tif", ".tiff",
        // audio
        ".mp3", ".wav", ".ogg", ".oga", ".flac", ".m4a", ".aac", ".opus",
        // video
        ".mp4", ".webm", ".mkv", ".avi", ".mov", ".3gp",
        // playlists
        ".pls", ".xspf",
        // documents and archives
        ".pdf", ".bin", ".zip", ".tar", ".gz",
    ],
    filenames: &[],
    detection_patterns: &[],
};

pub static PLAINTEXT: FormatDescriptor = FormatDescriptor {
    id: ids::PLAINTEXT,
    name: "Plain Text",
    default_extension: ".txt",
    extensions: &[
        ".txt", ".text", ".log", ".ldg", ".ledger", ".m3u", ".m3u8", ".svg", ".lrc", ".fen",
    ],
    filenames: &[],
    detection_patterns: &[],
};
