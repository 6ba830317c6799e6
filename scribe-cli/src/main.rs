// Command-line interface for scribe
//
// This binary renders lightweight markup documents to HTML and answers questions about them
// (which dialect, what metadata, which validation findings). All dialect work happens in the
// scribe-babel library; this crate only reads files, writes output and wires configuration.
//
// Usage:
//  scribe <input> [--format <id>] [--dark] [-o <file>]   - Render to HTML (default)
//  scribe render <input> [...]                            - Same as above (explicit)
//  scribe detect <input>                                  - Print the detected format id
//  scribe validate <input> [--format <id>]                - Print validation findings
//  scribe metadata <input> [--format <id>]                - Print document metadata as JSON
//  scribe list-formats                                    - List every supported format
//
// Extra Parameters:
//
// Parser options can be passed using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix. Keys that match a render setting
// (line-numbers, highlighting, base-url, light-mode) override the configuration;
// everything else is handed to the parser untouched.
// Example:
//  scribe clip.bin --extra-mime_type video/mp4 --extra-base-url https://cdn.example

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use scribe_babel::{FormatRegistry, ParseOptions, ParsedDocument};
use scribe_config::{Loader, ScribeConfig};
use std::collections::BTreeMap;
use std::fs;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const SUBCOMMANDS: &[&str] = &[
    "render",
    "detect",
    "validate",
    "metadata",
    "list-formats",
    "help",
];

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, BTreeMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = BTreeMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        let key_opt = if let Some(key) = arg.strip_prefix("--extra-") {
            Some(key)
        } else {
            arg.strip_prefix("--extras-")
        };

        if let Some(key) = key_opt {
            // Check if the next arg is a value or another flag/end
            let has_value = i + 1 < args.len() && !args[i + 1].starts_with('-');

            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                // No value, treat as boolean flag
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn input_arg() -> Arg {
    Arg::new("input")
        .help("Input file path")
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn format_arg() -> Arg {
    Arg::new("format")
        .long("format")
        .short('f')
        .value_name("ID")
        .help("Format id (auto-detected from the filename and content if not specified)")
        .value_hint(ValueHint::Other)
}

fn build_cli() -> Command {
    Command::new("scribe")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render lightweight markup documents to HTML")
        .long_about(
            "scribe renders documents written in lightweight markup dialects (Markdown,\n\
            Org-mode, reStructuredText, AsciiDoc, todo.txt, Jupyter notebooks and more)\n\
            to self-contained HTML.\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to pass parser options.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            scribe notes.org                      # Render to stdout\n  \
            scribe notes.org --dark -o notes.html # Dark variant into a file\n  \
            scribe detect todo.txt                # Print the detected format id\n  \
            scribe validate README.rst            # Print validation findings",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a scribe.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("render")
                .about("Render a document to HTML (default command)")
                .long_about(
                    "Render a document to HTML.\n\n\
                    The format is detected from the filename (whole-filename claims such as\n\
                    todo.txt first, then the extension) and falls back to sniffing the content.\n\
                    Output goes to stdout by default, or use -o to specify a file.",
                )
                .arg(input_arg())
                .arg(format_arg())
                .arg(
                    Arg::new("dark")
                        .long("dark")
                        .help("Use the dark stylesheet variant")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("detect")
                .about("Print the id of the detected format")
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("validate")
                .about("Print validation findings, one per line")
                .long_about(
                    "Print advisory validation findings, one per line.\n\n\
                    Findings never block rendering, so the exit status is 0 whether or not\n\
                    any are reported.",
                )
                .arg(input_arg())
                .arg(format_arg()),
        )
        .subcommand(
            Command::new("metadata")
                .about("Print document metadata as JSON")
                .arg(input_arg())
                .arg(format_arg()),
        )
        .subcommand(Command::new("list-formats").about("List every supported format"))
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Parse extra-* arguments before clap processing
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A bare file argument means "render"
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !SUBCOMMANDS.contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "render".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);

                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    let mut config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    apply_config_overrides(&mut config, &mut extra_params);
    init_tracing(&config.logging.level);

    let registry = config.registry();
    debug!(formats = registry.formats().count(), "registry ready");

    match matches.subcommand() {
        Some(("render", sub_matches)) => {
            let input = required(sub_matches, "input");
            if sub_matches.get_flag("dark") {
                config.render.light_mode = false;
            }
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_render_command(
                &registry,
                &config,
                input,
                format_of(sub_matches),
                output,
                &extra_params,
            );
        }
        Some(("detect", sub_matches)) => {
            handle_detect_command(&registry, required(sub_matches, "input"));
        }
        Some(("validate", sub_matches)) => {
            handle_validate_command(
                &registry,
                required(sub_matches, "input"),
                format_of(sub_matches),
            );
        }
        Some(("metadata", sub_matches)) => {
            let input = required(sub_matches, "input");
            let doc = parse_document(
                &registry,
                &config,
                input,
                format_of(sub_matches),
                &extra_params,
            );
            handle_metadata_command(&doc);
        }
        Some(("list-formats", _)) => {
            handle_list_formats_command(&registry);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
    matches
        .get_one::<String>(id)
        .map(|s| s.as_str())
        .unwrap_or_else(|| {
            eprintln!("Error: missing required argument '{id}'");
            std::process::exit(1);
        })
}

fn format_of(matches: &ArgMatches) -> Option<&str> {
    matches.get_one::<String>("format").map(|s| s.as_str())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Read a file as text. Binary files are read lossily so media can still be detected.
fn read_input(path: &str) -> String {
    let bytes = fs::read(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    });
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}

fn build_parse_options(
    config: &ScribeConfig,
    input: &str,
    extra_params: &BTreeMap<String, String>,
) -> ParseOptions {
    let mut options = config.parse_options(Some(input));
    for (key, value) in extra_params {
        options = options.with_extra(key.clone(), value.clone());
    }
    options
}

fn parse_document(
    registry: &FormatRegistry,
    config: &ScribeConfig,
    input: &str,
    format: Option<&str>,
    extra_params: &BTreeMap<String, String>,
) -> ParsedDocument {
    let source = read_input(input);
    let options = build_parse_options(config, input, extra_params);
    let result = match format {
        Some(id) => registry.parse_as(id, &source, &options),
        None => registry.parse(&source, &options),
    };
    result.unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    })
}

/// Handle the render command
fn handle_render_command(
    registry: &FormatRegistry,
    config: &ScribeConfig,
    input: &str,
    format: Option<&str>,
    output: Option<&str>,
    extra_params: &BTreeMap<String, String>,
) {
    let doc = parse_document(registry, config, input, format, extra_params);
    let html = registry
        .to_html(&doc, config.render.light_mode)
        .unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            std::process::exit(1);
        });

    match output {
        Some(path) => {
            fs::write(path, html).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
        }
        None => println!("{html}"),
    }
}

/// Handle the detect command
fn handle_detect_command(registry: &FormatRegistry, input: &str) {
    let source = read_input(input);
    println!("{}", registry.detect(&source, Some(input)).id);
}

/// Handle the validate command
fn handle_validate_command(registry: &FormatRegistry, input: &str, format: Option<&str>) {
    let source = read_input(input);
    let id = format.unwrap_or_else(|| registry.detect(&source, Some(input)).id);
    let findings = registry.validate(id, &source).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    for finding in findings {
        println!("{finding}");
    }
}

/// Handle the metadata command
fn handle_metadata_command(doc: &ParsedDocument) {
    let json = serde_json::to_string_pretty(&doc.metadata).unwrap_or_else(|e| {
        eprintln!("Error serializing metadata: {e}");
        std::process::exit(1);
    });
    println!("{json}");
}

/// Handle the list-formats command
fn handle_list_formats_command(registry: &FormatRegistry) {
    for format in registry.formats() {
        println!(
            "{:<18}{:<22}{}",
            format.id,
            format.name,
            format.extensions.join(" ")
        );
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> ScribeConfig {
    let loader = Loader::new().with_optional_file("scribe.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

/// Move render settings passed as `--extra-*` into the configuration
fn apply_config_overrides(config: &mut ScribeConfig, extra_params: &mut BTreeMap<String, String>) {
    if let Some(raw) = take_override(extra_params, &["line-numbers", "linum"]) {
        config.render.line_numbers = parse_bool_arg("line-numbers", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["highlighting", "highlight"]) {
        config.render.highlighting = parse_bool_arg("highlighting", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["light-mode", "light"]) {
        config.render.light_mode = parse_bool_arg("light-mode", &raw);
    }
    if let Some(url) = take_override(extra_params, &["base-url", "base_url"]) {
        config.render.base_url = url;
    }
    if let Some(level) = take_override(extra_params, &["log-level"]) {
        config.logging.level = level;
    }
}

fn take_override(map: &mut BTreeMap<String, String>, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(value) = map.remove(*key) {
            return Some(value);
        }
    }
    None
}

fn parse_bool_arg(flag: &str, raw: &str) -> bool {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        other => {
            eprintln!("Invalid boolean value '{other}' for --extra-{flag}");
            std::process::exit(1);
        }
    }
}
