use scribe_babel::formats::builtin_parsers;
use scribe_babel::ParseOptions;

const INPUTS: &[&str] = &[
    "",
    "   \n\t\n  ",
    "a\0b\0\0c",
    "\0",
    "|",
    "```",
    "---",
    "{",
    "[[",
    "\\begin{itemize}",
    "#+BEGIN_SRC",
    "* ",
    "..",
    "=",
    "\u{feff}\u{200b}\r\n\r\n",
    "é中文🙂",
];

#[test]
fn degenerate_inputs_never_fail() {
    for parser in builtin_parsers() {
        for input in INPUTS {
            let doc = parser.parse(input, &ParseOptions::new());
            assert_eq!(doc.raw_content, *input, "{}", parser.descriptor().id);
            assert_eq!(doc.format.id, parser.descriptor().id);
            let _ = parser.to_html(&doc, false);
            let _ = parser.validate(input);
        }
    }
}

#[test]
fn degenerate_inputs_with_filenames_never_fail() {
    for parser in builtin_parsers() {
        let options = ParseOptions::new().with_filename(parser.descriptor().default_extension);
        for input in INPUTS {
            let doc = parser.parse(input, &options);
            assert_eq!(doc.raw_content, *input);
        }
    }
}
