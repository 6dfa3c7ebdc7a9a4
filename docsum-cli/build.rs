use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the views from src/main.rs
// We need to duplicate this here since build scripts can't access src/ modules
const INSPECT_VIEWS: &[&str] = &["normalized-json", "tiles", "curriculum"];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("docsum")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Summarize classroom document snapshots as Markdown")
        .arg_required_else_help(true)
        .arg(
            Arg::new("list-handlers")
                .long("list-handlers")
                .help("List available tile handlers")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a docsum.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("summarize")
                .about("Summarize a document snapshot (default command)")
                .arg(
                    Arg::new("input")
                        .help("Snapshot JSON file, or - for stdin")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
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
            Command::new("inspect")
                .about("Inspect intermediate views of a snapshot")
                .arg(
                    Arg::new("input")
                        .help("Snapshot JSON file, or - for stdin")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("view")
                        .help("View to print")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(INSPECT_VIEWS))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "docsum", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "docsum", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "docsum", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
