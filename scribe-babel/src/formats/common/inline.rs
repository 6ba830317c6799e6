//! HTML escaping and protected inline spans
//!
//! Inline conversion in most dialects runs in three steps: pull out the constructs whose
//! raw characters must survive (code spans, links, images), escape what is left, then put
//! the constructs back as finished markup. [`InlineSpans`] keeps the pulled-out constructs
//! in a side table of `(kind, captures)` and leaves an index token in the text.
//!
//! A token is a private-use delimiter pair around a decimal index. Delimiter characters that
//! already occur in user text are themselves recorded as literal entries before any
//! extraction happens, so user content can never be mistaken for a token.

use regex::{Captures, Regex};

const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';

/// Escape the five HTML-significant characters
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// One extracted construct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span<K> {
    pub kind: K,
    /// `captures[0]` is the whole match; unmatched groups are empty strings
    pub captures: Vec<String>,
}

impl<K> Span<K> {
    /// Capture group `index`, or `""`
    pub fn group(&self, index: usize) -> &str {
        self.captures.get(index).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone)]
enum Slot<K> {
    Literal(char),
    Span(Span<K>),
}

/// Side table of extracted inline constructs
#[derive(Debug, Clone)]
pub struct InlineSpans<K> {
    slots: Vec<Slot<K>>,
}

impl<K: Copy> InlineSpans<K> {
    /// Start a table for `text`, returning the text with any token delimiters it already
    /// contains replaced by literal entries.
    pub fn protect(text: &str) -> (Self, String) {
        let mut spans = InlineSpans { slots: Vec::new() };
        if !text.contains([OPEN, CLOSE]) {
            return (spans, text.to_string());
        }
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            if ch == OPEN || ch == CLOSE {
                let token = spans.push(Slot::Literal(ch));
                out.push_str(&token);
            } else {
                out.push(ch);
            }
        }
        (spans, out)
    }

    /// Replace every match of `pattern` with a token recorded under `kind`
    pub fn extract(&mut self, text: &str, pattern: &Regex, kind: K) -> String {
        pattern
            .replace_all(text, |caps: &Captures<'_>| {
                let captures = caps
                    .iter()
                    .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect();
                self.push(Slot::Span(Span { kind, captures }))
            })
            .into_owned()
    }

    /// Number of recorded spans (literal entries excluded)
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Span(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Substitute every token in `text` by its rendering
    ///
    /// `render` receives the raw captures and must escape them itself. Captures may contain
    /// tokens of constructs extracted earlier; those are restored recursively.
    pub fn restore<F>(&self, text: &str, render: F) -> String
    where
        F: Fn(&Span<K>) -> String,
    {
        self.restore_with(text, &render)
    }

    fn restore_with(&self, text: &str, render: &dyn Fn(&Span<K>) -> String) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find(OPEN) {
            out.push_str(&rest[..start]);
            let after = &rest[start + OPEN.len_utf8()..];
            let Some(end) = after.find(CLOSE) else {
                out.push_str(&rest[start..]);
                return out;
            };
            match after[..end].parse::<usize>().ok().and_then(|i| self.slots.get(i)) {
                Some(Slot::Literal(ch)) => out.push_str(&format!("&#x{:X};", *ch as u32)),
                Some(Slot::Span(span)) => out.push_str(&self.restore_with(&render(span), render)),
                None => out.push_str(&rest[start..start + OPEN.len_utf8() + end + CLOSE.len_utf8()]),
            }
            rest = &after[end + CLOSE.len_utf8()..];
        }
        out.push_str(rest);
        out
    }

    fn push(&mut self, slot: Slot<K>) -> String {
        let index = self.slots.len();
        self.slots.push(slot);
        format!("{OPEN}{index}{CLOSE}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Kind {
        Code,
        Link,
    }

    static CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
    static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

    fn render(spans: &InlineSpans<Kind>, text: &str) -> String {
        spans.restore(text, |span| match span.kind {
            Kind::Code => format!("<code>{}</code>", escape_html(span.group(1))),
            Kind::Link => format!(
                "<a href='{}'>{}</a>",
                escape_html(span.group(2)),
                escape_html(span.group(1))
            ),
        })
    }

    fn convert(line: &str) -> String {
        let (mut spans, text) = InlineSpans::protect(line);
        let text = spans.extract(&text, &CODE, Kind::Code);
        let text = spans.extract(&text, &LINK, Kind::Link);
        let text = escape_html(&text);
        render(&spans, &text)
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn test_code_keeps_raw_characters() {
        assert_eq!(convert("use `a < b` here"), "use <code>a &lt; b</code> here");
    }

    #[test]
    fn test_link_text_with_nested_code() {
        assert_eq!(
            convert("see [`x`](http://e.org/?a=1&b=2)"),
            "see <a href='http://e.org/?a=1&amp;b=2'><code>x</code></a>"
        );
    }

    #[test]
    fn test_user_text_cannot_forge_tokens() {
        let forged = format!("{OPEN}0{CLOSE} and `code`");
        let html = convert(&forged);
        assert_eq!(html, "&#xE000;0&#xE001; and <code>code</code>");
    }

    #[test]
    fn test_len_counts_spans_only() {
        let (mut spans, text) = InlineSpans::<Kind>::protect(&format!("{OPEN} `a` `b`"));
        let _ = spans.extract(&text, &CODE, Kind::Code);
        assert_eq!(spans.len(), 2);
        assert!(!spans.is_empty());
    }
}
