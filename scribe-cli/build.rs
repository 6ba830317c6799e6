use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the format ids from scribe-babel's descriptor table
// We need to duplicate this here since build scripts can't access the library
const FORMAT_IDS: &[&str] = &[
    "markdown",
    "todotxt",
    "csv",
    "wikitext",
    "orgmode",
    "creole",
    "tiddlywiki",
    "latex",
    "asciidoc",
    "restructuredtext",
    "keyvalue",
    "taskpaper",
    "textile",
    "jupyter",
    "rmarkdown",
    "binary",
    "plaintext",
];

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
        .help("Format id")
        .value_parser(clap::builder::PossibleValuesParser::new(FORMAT_IDS))
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("scribe")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render lightweight markup documents to HTML")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .help("Path to a scribe.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("render")
                .about("Render a document to HTML")
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
                        .help("Output file path")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(Command::new("detect").about("Print the detected format id").arg(input_arg()))
        .subcommand(
            Command::new("validate")
                .about("Print validation findings")
                .arg(input_arg())
                .arg(format_arg()),
        )
        .subcommand(
            Command::new("metadata")
                .about("Print document metadata as JSON")
                .arg(input_arg())
                .arg(format_arg()),
        )
        .subcommand(Command::new("list-formats").about("List every supported format"));

    generate_to(Bash, &mut cmd, "scribe", &outdir)?;
    generate_to(Zsh, &mut cmd, "scribe", &outdir)?;
    generate_to(Fish, &mut cmd, "scribe", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
