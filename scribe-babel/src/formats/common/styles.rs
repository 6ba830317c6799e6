//! Inline stylesheets for rendered fragments
//!
//! Each dialect wraps its output in a container with a dialect class and prepends one
//! `<style>` block. Dialects with a themed document container (LaTeX, AsciiDoc, reST, Org,
//! notebooks) get separate light and dark rules; the rest share one set.

use crate::descriptor::ids;

const MARKDOWN: &str = "\
.markdown { font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; }
.markdown h1, .markdown h2 { font-weight: 600; border-bottom: 1px solid #eee; padding-bottom: 0.3em; }
.markdown h1 { font-size: 2em; } .markdown h2 { font-size: 1.5em; } .markdown h3 { font-size: 1.25em; }
.markdown blockquote { border-left: 4px solid #ddd; padding: 0 1em; color: #666; margin: 0 0 16px 0; }
.markdown ul, .markdown ol { padding-left: 2em; }
.markdown code { background: rgba(27,31,35,0.05); padding: 0.2em 0.4em; border-radius: 3px; font-family: monospace; }
.markdown pre { background: #f6f8fa; padding: 16px; overflow-x: auto; border-radius: 6px; }
.markdown pre code { background: transparent; padding: 0; }
.markdown hr { height: 0.25em; margin: 24px 0; background: #e1e4e8; border: 0; }
.markdown table { border-collapse: collapse; }
.markdown th, .markdown td { padding: 6px 13px; border: 1px solid #ddd; }
.markdown th { background: #f6f8fa; }
.markdown a { color: #0366d6; text-decoration: none; }
.markdown img { max-width: 100%; }
";

const WIKITEXT: &str = "\
.wikitext { font-family: sans-serif; line-height: 1.6; }
.wikitext h1, .wikitext h2, .wikitext h3, .wikitext h4, .wikitext h5, .wikitext h6 { color: #4e9a06; }
.wikitext .checklist { list-style-type: none; }
.wikitext .checklist li::before { content: '\\2610  '; color: #daa521; }
.wikitext .checklist li.checked::before { content: '\\2611  '; color: #54a309; }
.wikitext .checklist li.crossed::before { content: '\\2612  '; color: #a90000; }
.wikitext .highlight { background: #ffa062; padding: 2px 4px; }
.wikitext code, .wikitext pre { background: #f0f0f0; font-family: monospace; }
.wikitext pre { padding: 10px; overflow-x: auto; }
.wikitext a { color: #1ea3fd; text-decoration: none; }
";

const CREOLE: &str = "\
.creole { font-family: sans-serif; line-height: 1.6; }
.creole table { border-collapse: collapse; }
.creole th, .creole td { border: 1px solid #ccc; padding: 4px 8px; }
.creole pre { background: #f5f5f5; padding: 8px; }
";

const TIDDLYWIKI: &str = "\
.tiddlywiki { font-family: sans-serif; line-height: 1.6; }
.tiddlywiki .tiddler-meta { color: #666; font-size: 0.9em; border-bottom: 1px solid #ddd; margin-bottom: 1em; }
.tiddlywiki .tiddler-title { font-size: 1.6em; font-weight: bold; color: #182955; }
.tiddlywiki .tiddler-tag { background: #ec6; border-radius: 8px; padding: 0 6px; margin-right: 4px; }
.tiddlywiki blockquote { border-left: 3px solid #bbb; padding-left: 1em; color: #555; }
.tiddlywiki pre { background: #f5f5f5; padding: 8px; }
";

const TEXTILE: &str = "\
.textile { font-family: sans-serif; line-height: 1.6; }
.textile blockquote { border-left: 3px solid #ccc; padding-left: 1em; }
.textile pre { background: #f5f5f5; padding: 8px; overflow-x: auto; }
.textile code { background: #f0f0f0; padding: 2px 4px; font-family: monospace; }
.textile table { border-collapse: collapse; }
.textile th, .textile td { border: 1px solid #ccc; padding: 4px 8px; }
.textile a { color: #0066cc; text-decoration: none; }
";

const TASKPAPER: &str = "\
.taskpaper { font-family: sans-serif; line-height: 1.6; }
.taskpaper-project { font-weight: bold; font-size: 1.1em; color: #333; display: block; margin-top: 0.8em; }
.taskpaper-task { display: block; }
.taskpaper-task-done { display: block; text-decoration: line-through; color: #999; }
.taskpaper-note { display: block; color: #666; font-style: italic; }
.taskpaper-tag { color: #0366d6; font-size: 0.9em; }
.taskpaper-tag-done { color: #54a309; }
.taskpaper-tag-today { color: #d73a49; font-weight: bold; }
";

const TODOTXT: &str = "\
.todotxt { font-family: monospace; }
.todotxt .task { padding: 2px 0; }
.todotxt .task.done { color: #999; text-decoration: line-through; }
.todotxt .task.overdue .due-date { color: #d73a49; font-weight: bold; }
.todotxt .task.due-today .due-date { color: #e36209; font-weight: bold; }
.todotxt .priority { font-weight: bold; }
.todotxt .priority-A .priority { color: #d73a49; }
.todotxt .priority-B .priority { color: #e36209; }
.todotxt .priority-C .priority { color: #0366d6; }
.todotxt .project { color: #6f42c1; }
.todotxt .context { color: #22863a; }
";

const CSV: &str = "\
.csv-table table { border-collapse: collapse; font-family: sans-serif; }
.csv-table th, .csv-table td { border: 1px solid #ddd; padding: 4px 8px; }
.csv-table th { background: #f6f8fa; font-weight: 600; }
.csv-table tr:nth-child(even) td { background: #fafbfc; }
";

const KEYVALUE: &str = "\
.keyvalue pre { font-family: monospace; white-space: pre-wrap; }
.keyvalue .kv-section { color: #6f42c1; font-weight: bold; }
.keyvalue .kv-key { color: #005cc5; }
.keyvalue .kv-separator { color: #999; }
.keyvalue .kv-value { color: #032f62; }
.keyvalue .kv-comment { color: #6a737d; font-style: italic; }
";

const RMARKDOWN: &str = "\
.rmarkdown { font-family: sans-serif; line-height: 1.6; }
.rmarkdown .rmd-header { border-bottom: 1px solid #ddd; margin-bottom: 1em; }
.rmarkdown .code-chunk { background: #f6f8fa; border-left: 3px solid #276dc3; padding: 8px; margin: 8px 0; }
.rmarkdown .chunk-label { font-family: monospace; font-size: 0.85em; color: #276dc3; }
.rmarkdown .rmd-info span { margin-right: 1em; color: #666; font-size: 0.9em; }
.rmarkdown .code-chunk pre { margin: 4px 0 0; }
.rmarkdown .python-chunk { border-left-color: #3776ab; }
.rmarkdown .bash-chunk { border-left-color: #4eaa25; }
.rmarkdown .sql-chunk { border-left-color: #e38c00; }
";

const PLAINTEXT: &str = "\
.plaintext pre { white-space: pre-wrap; font-family: monospace; margin: 0; }
.plaintext .code-language { font-family: monospace; font-size: 0.8em; color: #666; margin-bottom: 4px; }
.plaintext .line-number { display: inline-block; min-width: 3em; color: #999; user-select: none; }
";

const BINARY: &str = "\
.binary-preview { font-family: sans-serif; text-align: center; }
.binary-preview img, .binary-preview video { max-width: 100%; }
.binary-preview .binary-info { color: #666; font-size: 0.9em; }
";

const RST: &str = "\
.rst-document { font-family: sans-serif; line-height: 1.6; }
.rst-section-1, .rst-section-2, .rst-section-3, .rst-section-4, .rst-section-5, .rst-section-6 { color: #4e9a06; font-weight: bold; margin: 1rem 0; }
.rst-section-1 { font-size: 2em; } .rst-section-2 { font-size: 1.8em; } .rst-section-3 { font-size: 1.6em; }
.rst-section-4 { font-size: 1.4em; } .rst-section-5 { font-size: 1.2em; } .rst-section-6 { font-size: 1em; }
.rst-directive { border-radius: 4px; padding: 1rem; margin: 1rem 0; }
.rst-directive-header { font-family: monospace; margin-bottom: 0.5rem; }
.rst-directive-content { font-family: monospace; white-space: pre-wrap; }
.rst-admonition { border: 1px solid; border-radius: 4px; padding: 1rem; margin: 1rem 0; }
.rst-admonition-title { font-weight: bold; margin-bottom: 0.5rem; }
.rst-code, .rst-block { border-radius: 4px; padding: 1rem; margin: 1rem 0; overflow-x: auto; }
.rst-literal { font-family: monospace; padding: 0.1rem 0.2rem; }
.rst-link { color: #1ea3fd; text-decoration: none; }
.rst-bold { font-weight: bold; } .rst-italic { font-style: italic; }
.rst-field-name { font-weight: bold; }
";
const RST_LIGHT: &str = "\
.rst-document.light { background: white; color: black; }
.rst-directive { background: #f5f5f5; border: 1px solid #ddd; }
.rst-directive-header { color: #75507b; }
.rst-code, .rst-block, .rst-literal { background: #f8f8f8; }
.rst-admonition { background: #e7f2fa; border-color: #6ab0de; }
.rst-admonition.warning, .rst-admonition.caution, .rst-admonition.attention { background: #fff2cc; border-color: #f0b37e; }
.rst-admonition.danger, .rst-admonition.error { background: #f2dede; border-color: #d9534f; }
.rst-admonition.tip, .rst-admonition.hint { background: #dff0d8; border-color: #5cb85c; }
";
const RST_DARK: &str = "\
.rst-document.dark { background: #1e1e1e; color: #d4d4d4; }
.rst-directive { background: #2d2d2d; border: 1px solid #444; }
.rst-directive-header { color: #ad7fa8; }
.rst-code, .rst-block, .rst-literal { background: #2d2d2d; }
.rst-admonition { background: #1e3a5f; border-color: #4e9a06; }
";

const ORGMODE: &str = "\
.org-mode-document { font-family: sans-serif; line-height: 1.6; }
.org-heading { color: #4e9a06; font-weight: bold; margin: 1rem 0; }
.org-heading-1 { font-size: 2em; } .org-heading-2 { font-size: 1.8em; } .org-heading-3 { font-size: 1.6em; }
.org-heading-4 { font-size: 1.4em; } .org-heading-5 { font-size: 1.2em; } .org-heading-6 { font-size: 1em; }
.org-todo { font-weight: bold; }
.org-block { border-radius: 4px; padding: 1rem; margin: 1rem 0; }
.org-block-header { font-family: monospace; margin-bottom: 0.5rem; }
.org-block-content { font-family: monospace; white-space: pre-wrap; }
.org-properties { border-radius: 4px; padding: 1rem; margin: 1rem 0; font-family: monospace; }
.org-link { color: #1ea3fd; text-decoration: none; }
.org-bold { font-weight: bold; } .org-italic { font-style: italic; }
.org-underline { text-decoration: underline; } .org-strikethrough { text-decoration: line-through; }
.org-verbatim, .org-code { font-family: monospace; padding: 0.1rem 0.2rem; }
";
const ORGMODE_LIGHT: &str = "\
.org-mode-document.light { background: white; color: black; }
.org-todo-todo { color: #cc0000; } .org-todo-done { color: #4e9a06; text-decoration: line-through; }
.org-block, .org-verbatim, .org-code { background: #f8f8f8; }
.org-block, .org-properties { border: 1px solid #ddd; }
.org-properties { background: #f5f5f5; }
.org-block-header, .org-property-key { color: #75507b; }
.org-property-value { color: #4e9a06; }
";
const ORGMODE_DARK: &str = "\
.org-mode-document.dark { background: #1e1e1e; color: #d4d4d4; }
.org-todo-todo { color: #ef2929; } .org-todo-done { color: #73d216; text-decoration: line-through; }
.org-block, .org-verbatim, .org-code { background: #2d2d2d; }
.org-block, .org-properties { border: 1px solid #444; }
.org-properties { background: #2d2d2d; }
.org-block-header, .org-property-key { color: #ad7fa8; }
.org-property-value { color: #73d216; }
";

const ASCIIDOC: &str = "\
.asciidoc { font-family: 'Noto Serif', Georgia, serif; line-height: 1.6; }
.asciidoc h1, .asciidoc h2, .asciidoc h3, .asciidoc h4, .asciidoc h5, .asciidoc h6 { font-weight: normal; }
.asciidoc .admonition { border-left: 4px solid; padding: 0.5em 1em; margin: 1em 0; }
.asciidoc .admonition-label { font-weight: bold; text-transform: uppercase; margin-right: 0.5em; }
.asciidoc pre { padding: 1em; overflow-x: auto; }
";
const ASCIIDOC_LIGHT: &str = "\
.asciidoc.light { background: white; color: #222; }
.asciidoc.light h1, .asciidoc.light h2, .asciidoc.light h3 { color: #ba3925; }
.asciidoc.light pre { background: #f7f7f8; }
.asciidoc.light .admonition-note { border-color: #19407c; background: #eef3fa; }
.asciidoc.light .admonition-tip { border-color: #54a309; background: #f0f8e8; }
.asciidoc.light .admonition-warning { border-color: #bf6900; background: #fdf5e6; }
.asciidoc.light .admonition-important { border-color: #bf0000; background: #fbeaea; }
.asciidoc.light .admonition-caution { border-color: #bf3400; background: #fbefe9; }
";
const ASCIIDOC_DARK: &str = "\
.asciidoc.dark { background: #1e1e1e; color: #d4d4d4; }
.asciidoc.dark h1, .asciidoc.dark h2, .asciidoc.dark h3 { color: #f0776c; }
.asciidoc.dark pre { background: #2d2d2d; }
.asciidoc.dark .admonition-note { border-color: #6ab0de; background: #1e3a5f; }
.asciidoc.dark .admonition-tip { border-color: #5cb85c; background: #203d20; }
.asciidoc.dark .admonition-warning { border-color: #f0b37e; background: #3d3020; }
.asciidoc.dark .admonition-important { border-color: #d9534f; background: #3d2020; }
.asciidoc.dark .admonition-caution { border-color: #e67e22; background: #3d2a20; }
";

const LATEX: &str = "\
.latex-document { font-family: 'Latin Modern Roman', 'Computer Modern', Georgia, serif; line-height: 1.6; max-width: 48em; margin: 0 auto; }
.latex-document .document-header { text-align: center; margin-bottom: 2em; }
.latex-document .title { font-size: 2em; font-weight: bold; }
.latex-document .author, .latex-document .date { font-size: 1.1em; }
.latex-document .section { font-size: 1.5em; font-weight: bold; margin-top: 1.5em; }
.latex-document .subsection { font-size: 1.25em; font-weight: bold; margin-top: 1.2em; }
.latex-document .subsubsection { font-size: 1.1em; font-weight: bold; margin-top: 1em; }
.latex-document .math-display { text-align: center; font-style: italic; margin: 1em 0; font-family: serif; }
.latex-document .textbf { font-weight: bold; } .latex-document .textit, .latex-document .emph { font-style: italic; }
.latex-document .underline { text-decoration: underline; } .latex-document .texttt { font-family: monospace; }
";
const LATEX_LIGHT: &str = ".latex-document.light { background: white; color: black; }\n";
const LATEX_DARK: &str = "\
.latex-document.dark { background: #1e1e1e; color: #d4d4d4; }
.latex-document.dark .math-display { color: #9cdcfe; }
";

const JUPYTER: &str = "\
.jupyter-notebook { font-family: sans-serif; }
.jupyter-notebook .nb-header { font-size: 0.85em; margin-bottom: 1em; }
.jupyter-notebook .cell { margin: 0.75em 0; border-radius: 4px; padding: 0.5em; }
.jupyter-notebook .prompt { font-family: monospace; font-size: 0.85em; }
.jupyter-notebook .cell pre { margin: 0; font-family: monospace; white-space: pre-wrap; }
.jupyter-notebook .output { border-top: 1px dashed; margin-top: 0.5em; padding-top: 0.5em; }
.jupyter-notebook .nb-header span { margin-right: 1em; }
.jupyter-notebook .output-error, .jupyter-notebook .nb-error { color: #c62828; }
.jupyter-notebook .output img { max-width: 100%; }
";
const JUPYTER_LIGHT: &str = "\
.jupyter-notebook.light { background: white; color: black; }
.jupyter-notebook.light .code-cell { background: #f7f7f7; border: 1px solid #cfcfcf; }
.jupyter-notebook.light .prompt { color: #303f9f; }
.jupyter-notebook.light .output { border-color: #ccc; }
";
const JUPYTER_DARK: &str = "\
.jupyter-notebook.dark { background: #1e1e1e; color: #d4d4d4; }
.jupyter-notebook.dark .code-cell { background: #252526; border: 1px solid #3c3c3c; }
.jupyter-notebook.dark .prompt { color: #7986cb; }
.jupyter-notebook.dark .output { border-color: #555; }
";

/// Complete `<style>` block for a dialect, or `None` when the dialect has no stylesheet
pub fn stylesheet(format_id: &str, light_mode: bool) -> Option<String> {
    let themed = |light: &'static str, dark: &'static str| if light_mode { light } else { dark };
    let (base, theme) = match format_id {
        ids::MARKDOWN => (MARKDOWN, ""),
        ids::WIKITEXT => (WIKITEXT, ""),
        ids::CREOLE => (CREOLE, ""),
        ids::TIDDLYWIKI => (TIDDLYWIKI, ""),
        ids::TEXTILE => (TEXTILE, ""),
        ids::TASKPAPER => (TASKPAPER, ""),
        ids::TODOTXT => (TODOTXT, ""),
        ids::CSV => (CSV, ""),
        ids::KEYVALUE => (KEYVALUE, ""),
        ids::RMARKDOWN => (RMARKDOWN, ""),
        ids::BINARY => (BINARY, ""),
        ids::PLAINTEXT => (PLAINTEXT, ""),
        ids::RESTRUCTUREDTEXT => (RST, themed(RST_LIGHT, RST_DARK)),
        ids::ORGMODE => (ORGMODE, themed(ORGMODE_LIGHT, ORGMODE_DARK)),
        ids::ASCIIDOC => (ASCIIDOC, themed(ASCIIDOC_LIGHT, ASCIIDOC_DARK)),
        ids::LATEX => (LATEX, themed(LATEX_LIGHT, LATEX_DARK)),
        ids::JUPYTER => (JUPYTER, themed(JUPYTER_LIGHT, JUPYTER_DARK)),
        _ => return None,
    };
    Some(format!("<style>\n{base}{theme}</style>"))
}

/// Like [`stylesheet`], but empty for unstyled dialects
pub fn stylesheet_or_empty(format_id: &str, light_mode: bool) -> String {
    stylesheet(format_id, light_mode).unwrap_or_default()
}

/// CSS class for the light/dark container variant
pub fn theme_class(light_mode: bool) -> &'static str {
    if light_mode {
        "light"
    } else {
        "dark"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_themed_stylesheets_differ() {
        let light = stylesheet(ids::LATEX, true).unwrap();
        let dark = stylesheet(ids::LATEX, false).unwrap();
        assert_ne!(light, dark);
        assert!(light.contains(".latex-document.light"));
        assert!(dark.contains(".latex-document.dark"));
    }

    #[test]
    fn test_unthemed_stylesheet_ignores_mode() {
        assert_eq!(stylesheet(ids::MARKDOWN, true), stylesheet(ids::MARKDOWN, false));
    }

    #[test]
    fn test_stylesheet_lookup() {
        assert!(stylesheet(ids::PLAINTEXT, true).is_some());
        assert_eq!(stylesheet_or_empty("nope", false), "");
    }
}
