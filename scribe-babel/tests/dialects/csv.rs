use crate::common::{parse_as, parse_file};
use scribe_babel::formats::csv::parse_line;

#[test]
fn quoted_field_keeps_delimiter() {
    assert_eq!(
        parse_line("John,\"Doe, Jr.\",30", ',', '"'),
        vec!["John", "Doe, Jr.", "30"]
    );
}

#[test]
fn doubled_quote_is_one_literal_quote() {
    assert_eq!(
        parse_line("\"He said \"\"hi\"\"\",x", ',', '"'),
        vec!["He said \"hi\"", "x"]
    );
}

#[test]
fn empty_fields_are_kept() {
    assert_eq!(parse_line("a,,c,", ',', '"'), vec!["a", "", "c", ""]);
}

#[test]
fn csv_file_renders_a_table() {
    let doc = parse_file("people.csv", "name,age\nAda,36\n");
    assert_eq!(doc.format.id, "csv");
    assert!(doc.parsed_content.contains("<table>"));
    assert!(doc.parsed_content.contains("Ada"));
}

#[test]
fn markup_in_cells_is_escaped() {
    let doc = parse_as("csv", "col\n<script>\n");
    assert!(doc.parsed_content.contains("&lt;script&gt;"));
    assert!(!doc.parsed_content.contains("<script>"));
}
