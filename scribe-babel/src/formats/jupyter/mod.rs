//! Jupyter notebooks
//!
//! The `.ipynb` JSON is deserialized with `serde` into [`Notebook`]. Code cells show their
//! prompt, highlighted-language source and outputs; Markdown cells go through the Markdown
//! block renderer; raw cells are shown verbatim. Content that is not a notebook falls back to
//! an escaped `<pre>` of the input.

use std::collections::BTreeMap;

use crate::descriptor::{self, FormatDescriptor};
use crate::document::{Metadata, ParseOptions, ParsedDocument};
use crate::format::Parser;
use crate::formats::common::{escape_html, stylesheet_or_empty, theme_class};
use crate::formats::markdown;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// `source` and stream `text` fields: one string or a list of line strings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MultilineText {
    Text(String),
    Lines(Vec<String>),
}

impl Default for MultilineText {
    fn default() -> Self {
        MultilineText::Text(String::new())
    }
}

impl MultilineText {
    pub fn joined(&self) -> String {
        match self {
            MultilineText::Text(text) => text.clone(),
            MultilineText::Lines(lines) => lines.concat(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    pub metadata: NotebookMetadata,
    pub nbformat: Option<u32>,
    pub nbformat_minor: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NotebookMetadata {
    pub kernelspec: Option<KernelSpec>,
    pub language_info: Option<LanguageInfo>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KernelSpec {
    pub name: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LanguageInfo {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cell {
    #[serde(default = "default_cell_type")]
    pub cell_type: String,
    #[serde(default)]
    pub source: MultilineText,
    #[serde(default)]
    pub outputs: Vec<Output>,
    #[serde(default)]
    pub execution_count: Option<u64>,
}

fn default_cell_type() -> String {
    "code".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Output {
    pub output_type: String,
    /// Stream name, `stdout` or `stderr`
    pub name: Option<String>,
    pub text: MultilineText,
    /// MIME bundle of `execute_result` and `display_data`
    pub data: BTreeMap<String, Value>,
    pub ename: Option<String>,
    pub evalue: Option<String>,
}

impl Notebook {
    pub fn kernel(&self) -> &str {
        self.metadata
            .kernelspec
            .as_ref()
            .and_then(|spec| spec.name.as_deref())
            .unwrap_or("python3")
    }

    pub fn language(&self) -> &str {
        self.metadata
            .language_info
            .as_ref()
            .and_then(|info| info.name.as_deref())
            .unwrap_or("python")
    }

    /// `nbformat.nbformat_minor`, defaulting to `4.0`
    pub fn format_version(&self) -> String {
        format!(
            "{}.{}",
            self.nbformat.unwrap_or(4),
            self.nbformat_minor.unwrap_or(0)
        )
    }

    fn count_cells(&self, cell_type: &str) -> usize {
        self.cells.iter().filter(|c| c.cell_type == cell_type).count()
    }
}

/// Deserialize a notebook, checking the JSON syntax first so the two failure kinds read apart
pub fn parse_notebook(content: &str) -> Result<Notebook, String> {
    let value: Value =
        serde_json::from_str(content).map_err(|err| format!("Invalid JSON format: {err}"))?;
    serde_json::from_value(value).map_err(|err| format!("Invalid notebook structure: {err}"))
}

/// Text of one MIME bundle entry, which is a string or a list of strings
fn bundle_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        other => other.to_string(),
    }
}

/// Parser implementation for Jupyter notebooks
#[derive(Debug, Default, Clone, Copy)]
pub struct JupyterParser;

impl Parser for JupyterParser {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &descriptor::JUPYTER
    }

    fn parse(&self, content: &str, options: &ParseOptions) -> ParsedDocument {
        let notebook = match parse_notebook(content) {
            Ok(notebook) => notebook,
            Err(message) => {
                warn!(filename = ?options.filename, "{message}");
                return ParsedDocument::new(self.descriptor(), content, fallback(content, &message, true))
                    .with_errors(vec![message]);
            }
        };

        let mut metadata = Metadata::new();
        metadata.insert("cells".into(), notebook.cells.len().to_string());
        metadata.insert("code_cells".into(), notebook.count_cells("code").to_string());
        metadata.insert(
            "markdown_cells".into(),
            notebook.count_cells("markdown").to_string(),
        );
        metadata.insert("kernel".into(), notebook.kernel().to_string());
        metadata.insert("language".into(), notebook.language().to_string());
        metadata.insert("format_version".into(), notebook.format_version());
        if let Some(title) = &notebook.metadata.title {
            metadata.insert("title".into(), title.clone());
        }

        ParsedDocument::new(self.descriptor(), content, render(&notebook, true)).with_metadata(metadata)
    }

    fn to_html(&self, document: &ParsedDocument, light_mode: bool) -> String {
        match parse_notebook(&document.raw_content) {
            Ok(notebook) => render(&notebook, light_mode),
            Err(message) => fallback(&document.raw_content, &message, light_mode),
        }
    }

    fn validate(&self, content: &str) -> Vec<String> {
        match parse_notebook(content) {
            Ok(_) => Vec::new(),
            Err(message) => vec![message],
        }
    }
}

fn open_container(light_mode: bool) -> String {
    let mut html = format!("<div class='jupyter-notebook {}'>", theme_class(light_mode));
    html.push_str(&stylesheet_or_empty(descriptor::JUPYTER.id, light_mode));
    html
}

fn fallback(content: &str, message: &str, light_mode: bool) -> String {
    let mut html = open_container(light_mode);
    html.push_str(&format!(
        "<div class='nb-error'>Failed to parse notebook: {}</div><pre>{}</pre></div>",
        escape_html(message),
        escape_html(content)
    ));
    html
}

fn render(notebook: &Notebook, light_mode: bool) -> String {
    let mut html = open_container(light_mode);
    let title = notebook.metadata.title.as_deref().unwrap_or("Jupyter Notebook");
    html.push_str(&format!(
        "<div class='nb-header'><h1>{}</h1><span>Kernel: {}</span><span>Language: {}</span><span>Cells: {}</span></div>",
        escape_html(title),
        escape_html(notebook.kernel()),
        escape_html(notebook.language()),
        notebook.cells.len()
    ));

    for cell in &notebook.cells {
        html.push_str(&cell_html(cell, notebook.language()));
    }
    html.push_str("</div>");
    html
}

fn cell_html(cell: &Cell, language: &str) -> String {
    let source = cell.source.joined();
    match cell.cell_type.as_str() {
        "markdown" => format!(
            "<div class='cell markdown-cell'>{}</div>",
            markdown::render_fragment(&source)
        ),
        "raw" => format!("<div class='cell raw-cell'><pre>{}</pre></div>", escape_html(&source)),
        _ => {
            let prompt = match cell.execution_count {
                Some(count) => format!("In [{count}]:"),
                None => "In [ ]:".to_string(),
            };
            let mut html = format!(
                "<div class='cell code-cell'><div class='prompt'>{prompt}</div><pre><code class='language-{}'>{}</code></pre>",
                escape_html(language),
                escape_html(&source)
            );
            if !cell.outputs.is_empty() {
                html.push_str("<div class='output'>");
                for output in &cell.outputs {
                    html.push_str(&output_html(output));
                }
                html.push_str("</div>");
            }
            html.push_str("</div>");
            html
        }
    }
}

fn output_html(output: &Output) -> String {
    match output.output_type.as_str() {
        "stream" => {
            let class = match output.name.as_deref() {
                Some("stderr") => "output-text output-error",
                _ => "output-text",
            };
            format!("<pre class='{class}'>{}</pre>", escape_html(&output.text.joined()))
        }
        "error" => format!(
            "<pre class='output-error'>{}: {}</pre>",
            escape_html(output.ename.as_deref().unwrap_or("Error")),
            escape_html(output.evalue.as_deref().unwrap_or(""))
        ),
        _ => {
            for mime in ["image/png", "image/jpeg", "image/gif"] {
                if let Some(value) = output.data.get(mime) {
                    let encoded: String = bundle_text(value).split_whitespace().collect();
                    return format!("<img src='data:{mime};base64,{}'/>", escape_html(&encoded));
                }
            }
            match output.data.get("text/plain") {
                Some(value) => format!("<pre class='output-text'>{}</pre>", escape_html(&bundle_text(value))),
                None => String::new(),
            }
        }
    }
}
