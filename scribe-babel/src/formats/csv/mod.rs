//! Delimited text tables (CSV, TSV and friends)
//!
//! The delimiter and quote character are inferred from the first data line: tab, then
//! `;`, then `|`, then `,`; a `'` anywhere on that line selects single quotes. Blank lines
//! and lines starting with `#` are skipped. The first remaining row is the header.

use crate::descriptor::{self, FormatDescriptor};
use crate::document::{Metadata, ParseOptions, ParsedDocument};
use crate::format::Parser;
use crate::formats::common::{escape_html, line_finding, split_lines, stylesheet_or_empty};

/// Delimiter, quote and header settings for one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvConfig {
    pub delimiter: char,
    pub quote: char,
    pub has_header: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        CsvConfig {
            delimiter: ',',
            quote: '"',
            has_header: true,
        }
    }
}

/// Guess the configuration from a sample line
pub fn infer_config(first_line: &str) -> CsvConfig {
    let delimiter = ['\t', ';', '|', ',']
        .into_iter()
        .find(|c| first_line.contains(*c))
        .unwrap_or(',');
    let quote = if first_line.contains('\'') { '\'' } else { '"' };
    CsvConfig {
        delimiter,
        quote,
        has_header: true,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
    pub config: CsvConfig,
}

impl CsvTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers
            .as_ref()
            .or_else(|| self.rows.first())
            .map_or(0, Vec::len)
    }
}

/// Split one line into fields
///
/// Inside quotes the delimiter is literal and a doubled quote is one literal quote.
pub fn parse_line(line: &str, delimiter: char, quote: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == quote {
            if in_quotes && chars.peek() == Some(&quote) {
                field.push(quote);
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if c == delimiter && !in_quotes {
            fields.push(std::mem::take(&mut field));
        } else {
            field.push(c);
        }
    }
    fields.push(field);
    fields
}

fn is_data_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

/// Parse a whole document with a known configuration
pub fn parse_table(content: &str, config: CsvConfig) -> CsvTable {
    let mut rows: Vec<Vec<String>> = split_lines(content)
        .into_iter()
        .filter(|line| is_data_line(line))
        .map(|line| parse_line(line, config.delimiter, config.quote))
        .collect();

    let headers = if config.has_header && !rows.is_empty() {
        Some(rows.remove(0))
    } else {
        None
    };

    CsvTable {
        headers,
        rows,
        config,
    }
}

fn infer_from_content(content: &str) -> CsvConfig {
    let first = split_lines(content)
        .into_iter()
        .find(|line| is_data_line(line))
        .unwrap_or("");
    infer_config(first)
}

/// Render a table as a Markdown pipe table
pub fn to_markdown_table(table: &CsvTable) -> String {
    let mut out = String::new();
    if let Some(headers) = &table.headers {
        let names: Vec<&str> = headers.iter().map(|h| h.trim()).collect();
        out.push_str(&format!("| {} |\n", names.join(" | ")));
        out.push_str(&format!("|{}|\n", vec![" --- "; headers.len()].join("|")));
    }
    for row in &table.rows {
        let cells: Vec<&str> = row
            .iter()
            .map(|cell| match cell.trim() {
                "" => "&nbsp;",
                trimmed => trimmed,
            })
            .collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    out
}

/// Parser implementation for delimited tables
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvParser;

impl Parser for CsvParser {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &descriptor::CSV
    }

    fn parse(&self, content: &str, _options: &ParseOptions) -> ParsedDocument {
        let config = infer_from_content(content);
        let table = parse_table(content, config);

        let mut metadata = Metadata::new();
        metadata.insert("rows".into(), table.row_count().to_string());
        metadata.insert("columns".into(), table.column_count().to_string());
        metadata.insert("delimiter".into(), config.delimiter.to_string());
        metadata.insert("hasHeader".into(), config.has_header.to_string());

        ParsedDocument::new(self.descriptor(), content, render(&table)).with_metadata(metadata)
    }

    fn validate(&self, content: &str) -> Vec<String> {
        let config = infer_from_content(content);
        let mut findings = Vec::new();
        let mut expected: Option<usize> = None;

        for (index, line) in split_lines(content).into_iter().enumerate() {
            if !is_data_line(line) {
                continue;
            }
            if line.chars().filter(|c| *c == config.quote).count() % 2 != 0 {
                findings.push(line_finding(index, "Unterminated quoted field"));
                continue;
            }
            let columns = parse_line(line, config.delimiter, config.quote).len();
            match expected {
                None => expected = Some(columns),
                Some(want) if want != columns => findings.push(line_finding(
                    index,
                    format!("Expected {want} columns, found {columns}"),
                )),
                Some(_) => {}
            }
        }
        findings
    }
}

fn render(table: &CsvTable) -> String {
    let mut html = String::from("<div class='csv-table'>");
    html.push_str(&stylesheet_or_empty(descriptor::CSV.id, true));
    html.push_str("<table>");

    if let Some(headers) = &table.headers {
        html.push_str("<thead><tr>");
        for header in headers {
            html.push_str(&format!("<th>{}</th>", escape_html(header.trim())));
        }
        html.push_str("</tr></thead>");
    }

    html.push_str("<tbody>");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            match cell.trim() {
                "" => html.push_str("<td>&nbsp;</td>"),
                trimmed => html.push_str(&format!("<td>{}</td>", escape_html(trimmed))),
            }
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table></div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_quoted_delimiter() {
        assert_eq!(
            parse_line("John,\"Doe, Jr.\",30", ',', '"'),
            vec!["John", "Doe, Jr.", "30"]
        );
    }

    #[test]
    fn test_parse_line_doubled_quote() {
        assert_eq!(
            parse_line("\"say \"\"hi\"\"\",x", ',', '"'),
            vec!["say \"hi\"", "x"]
        );
    }

    #[test]
    fn test_parse_line_trailing_delimiter() {
        assert_eq!(parse_line("a,b,", ',', '"'), vec!["a", "b", ""]);
    }

    #[test]
    fn test_infer_config_priority() {
        assert_eq!(infer_config("a\tb;c").delimiter, '\t');
        assert_eq!(infer_config("a;b|c").delimiter, ';');
        assert_eq!(infer_config("a|b,c").delimiter, '|');
        assert_eq!(infer_config("a,b").delimiter, ',');
        assert_eq!(infer_config("ab").delimiter, ',');
        assert_eq!(infer_config("'a',b").quote, '\'');
    }

    #[test]
    fn test_parse_metadata_and_html() {
        let doc = CsvParser.parse(
            "# people\nname;age\nAnn;3\n\nBob;<4>\n",
            &ParseOptions::new(),
        );
        assert_eq!(doc.meta("rows"), Some("2"));
        assert_eq!(doc.meta("columns"), Some("2"));
        assert_eq!(doc.meta("delimiter"), Some(";"));
        assert_eq!(doc.meta("hasHeader"), Some("true"));
        assert!(doc
            .parsed_content
            .contains("<thead><tr><th>name</th><th>age</th></tr></thead>"));
        assert!(doc.parsed_content.contains("<td>&lt;4&gt;</td>"));
    }

    #[test]
    fn test_empty_table() {
        let doc = CsvParser.parse("", &ParseOptions::new());
        assert_eq!(doc.meta("rows"), Some("0"));
        assert_eq!(doc.meta("columns"), Some("0"));
        assert!(doc.parsed_content.ends_with("<table><tbody></tbody></table></div>"));
    }

    #[test]
    fn test_markdown_table() {
        let table = parse_table("a,b\n1,\n", CsvConfig::default());
        assert_eq!(
            to_markdown_table(&table),
            "| a | b |\n| --- | --- |\n| 1 | &nbsp; |\n"
        );
    }

    #[test]
    fn test_validate() {
        let findings = CsvParser.validate("a,b\n1,2,3\n\"open,4\n5,6");
        assert_eq!(
            findings,
            vec![
                "Line 2: Expected 2 columns, found 3",
                "Line 3: Unterminated quoted field",
            ]
        );
    }
}
