//! Binary files and embeddable media
//!
//! The content itself is never interpreted. The filename extension gives a MIME type, which
//! picks an embed preview pointing at the file (joined onto `base_url` when one is set). The
//! `mime_type` and `file_size` extra options override what the extension and content imply.

use crate::descriptor::{self, FormatDescriptor};
use crate::document::{Metadata, ParseOptions, ParsedDocument};
use crate::format::Parser;
use crate::formats::common::{escape_html, stylesheet_or_empty};

/// MIME type for a normalized extension such as `.png`
pub fn mime_type(extension: &str) -> &'static str {
    match extension {
        ".jpg" | ".jpeg" => "image/jpeg",
        ".png" => "image/png",
        ".gif" => "image/gif",
        ".bmp" => "image/bmp",
        ".webp" => "image/webp",
        ".ico" => "image/x-icon",
        ".tif" | ".tiff" => "image/tiff",
        ".svg" => "image/svg+xml",
        ".mp3" => "audio/mpeg",
        ".wav" => "audio/wav",
        ".ogg" | ".oga" | ".opus" => "audio/ogg",
        ".flac" => "audio/flac",
        ".m4a" | ".aac" => "audio/aac",
        ".mp4" => "video/mp4",
        ".webm" => "video/webm",
        ".mkv" => "video/x-matroska",
        ".avi" => "video/x-msvideo",
        ".mov" => "video/quicktime",
        ".3gp" => "video/3gpp",
        ".pls" => "audio/x-scpls",
        ".xspf" => "application/xspf+xml",
        ".pdf" => "application/pdf",
        ".zip" => "application/zip",
        ".tar" => "application/x-tar",
        ".gz" => "application/gzip",
        _ => "application/octet-stream",
    }
}

/// Human-readable kind of a MIME type
pub fn file_type(mime_type: &str) -> &'static str {
    if mime_type.starts_with("image/") {
        "Image"
    } else if mime_type.starts_with("audio/") {
        "Audio"
    } else if mime_type.starts_with("video/") {
        "Video"
    } else if mime_type == "application/pdf" {
        "PDF Document"
    } else if mime_type.starts_with("application/") {
        "Document"
    } else {
        "Binary File"
    }
}

pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    match bytes {
        b if b < KB => format!("{b} B"),
        b if b < KB * KB => format!("{} KB", b / KB),
        b if b < KB * KB * KB => format!("{} MB", b / (KB * KB)),
        b => format!("{} GB", b / (KB * KB * KB)),
    }
}

fn source_url(options: &ParseOptions, filename: &str) -> String {
    match options.base_url.as_deref() {
        Some(base) if !base.is_empty() => {
            format!("{}/{}", base.trim_end_matches('/'), filename)
        }
        _ => filename.to_string(),
    }
}

/// Parser implementation for binary files
#[derive(Debug, Default, Clone, Copy)]
pub struct BinaryParser;

impl Parser for BinaryParser {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &descriptor::BINARY
    }

    fn parse(&self, content: &str, options: &ParseOptions) -> ParsedDocument {
        let extension = options.extension_or_empty();
        let mime = options
            .extra
            .get("mime_type")
            .cloned()
            .unwrap_or_else(|| mime_type(&extension).to_string());
        let size = options
            .extra
            .get("file_size")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(content.len() as u64);
        let filename = options
            .filename
            .as_deref()
            .map(descriptor::file_name)
            .unwrap_or("");

        let mut metadata = Metadata::new();
        metadata.insert("mime_type".into(), mime.clone());
        metadata.insert("file_size".into(), size.to_string());
        metadata.insert("is_binary".into(), "true".into());
        metadata.insert("file_type".into(), file_type(&mime).to_string());
        metadata.insert("extension".into(), extension);
        if !filename.is_empty() {
            metadata.insert("filename".into(), filename.to_string());
        }

        let html = render(&mime, filename, &source_url(options, filename), size);
        ParsedDocument::new(self.descriptor(), content, html).with_metadata(metadata)
    }
}

fn render(mime: &str, filename: &str, src: &str, size: u64) -> String {
    let src = escape_html(src);
    let name = escape_html(filename);
    let mime_attr = escape_html(mime);

    let mut html = String::from("<div class='binary-preview'>");
    html.push_str(&stylesheet_or_empty(descriptor::BINARY.id, true));

    let preview = if mime.starts_with("image/") {
        format!("<img src='{src}' alt='{name}'/>")
    } else if mime.starts_with("audio/") && !mime.starts_with("audio/x-scpls") {
        format!("<audio controls><source src='{src}' type='{mime_attr}'></audio>")
    } else if mime.starts_with("video/") {
        format!("<video controls><source src='{src}' type='{mime_attr}'></video>")
    } else if mime == "application/pdf" {
        format!("<iframe src='{src}' title='{name}'></iframe>")
    } else {
        format!(
            "<p class='binary-notice'>This file type cannot be previewed: {}</p>",
            if name.is_empty() { mime_attr.clone() } else { name.clone() }
        )
    };
    html.push_str(&preview);
    html.push_str(&format!(
        "<div class='binary-info'>{} &middot; {} &middot; {}</div></div>",
        file_type(mime),
        mime_attr,
        format_file_size(size)
    ));
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(filename: &str) -> ParsedDocument {
        BinaryParser.parse("\u{89}PNG", &ParseOptions::new().with_filename(filename))
    }

    #[test]
    fn test_image_metadata_and_preview() {
        let doc = parse("photos/cat.png");
        assert_eq!(doc.meta("mime_type"), Some("image/png"));
        assert_eq!(doc.meta("file_type"), Some("Image"));
        assert_eq!(doc.meta("is_binary"), Some("true"));
        assert_eq!(doc.meta("extension"), Some(".png"));
        assert_eq!(doc.meta("file_size"), Some("5"));
        assert_eq!(doc.meta("filename"), Some("cat.png"));
        assert!(doc.parsed_content.contains("<img src='cat.png' alt='cat.png'/>"));
    }

    #[test]
    fn test_media_previews() {
        assert!(parse("a.mp3").parsed_content.contains("<audio controls><source src='a.mp3' type='audio/mpeg'>"));
        assert!(parse("a.webm").parsed_content.contains("<video controls>"));
        assert!(parse("a.pdf").parsed_content.contains("<iframe src='a.pdf'"));
        assert!(parse("a.zip").parsed_content.contains("binary-notice"));
    }

    #[test]
    fn test_unknown_extension() {
        let doc = BinaryParser.parse("", &ParseOptions::new());
        assert_eq!(doc.meta("mime_type"), Some("application/octet-stream"));
        assert_eq!(doc.meta("file_type"), Some("Document"));
        assert_eq!(doc.meta("extension"), Some(""));
    }

    #[test]
    fn test_option_overrides() {
        let options = ParseOptions::new()
            .with_filename("clip.bin")
            .with_base_url("https://files.example/media/")
            .with_extra("mime_type", "video/mp4")
            .with_extra("file_size", "3145728");
        let doc = BinaryParser.parse("", &options);
        assert_eq!(doc.meta("mime_type"), Some("video/mp4"));
        assert_eq!(doc.meta("file_size"), Some("3145728"));
        assert!(doc.parsed_content.contains("src='https://files.example/media/clip.bin'"));
        assert!(doc.parsed_content.contains("3 MB"));
    }

    #[test]
    fn test_file_size_units() {
        assert_eq!(format_file_size(12), "12 B");
        assert_eq!(format_file_size(2048), "2 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024), "5 GB");
    }

    #[test]
    fn test_never_reports_findings() {
        assert!(BinaryParser.validate("\0\0\0").is_empty());
    }
}
