//! Inline snapshots of representative renders.

use insta::{assert_debug_snapshot, assert_snapshot};
use scribe_babel::formats::common::escape_html;
use scribe_babel::formats::csv::parse_line;
use scribe_babel::formats::markdown::{render_fragment, render_inline};

#[test]
fn markdown_inline() {
    assert_snapshot!(
        render_inline("**b** and `x<y` and [a](b)"),
        @"<strong>b</strong> and <code>x&lt;y</code> and <a href='b'>a</a>"
    );
}

#[test]
fn markdown_fragment() {
    assert_snapshot!(render_fragment("# Hi\ntext"), @"<h1>Hi</h1><p>text </p>");
}

#[test]
fn html_escaping() {
    assert_snapshot!(
        escape_html("<a href=\"x\">'&'</a>"),
        @"&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
    );
}

#[test]
fn csv_fields() {
    assert_debug_snapshot!(parse_line("John,\"Doe, Jr.\",30", ',', '"'), @r###"
    [
        "John",
        "Doe, Jr.",
        "30",
    ]
    "###);
}
