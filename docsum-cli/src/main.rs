// Command-line interface for docsum
//
// Reads a document snapshot (JSON) from a file or stdin and prints its Markdown summary. All the
// summarization logic lives in the docsum crate; this binary only deals with the shell: argument
// parsing, configuration files, logging setup, reading input and writing output.
//
// Usage:
//  docsum <input> [--output <file>]            - Summarize a snapshot (default)
//  docsum summarize <input> [--output <file>]  - Same as above (explicit)
//  docsum inspect <input> [<view>]             - Print an intermediate view (defaults to "normalized-json")
//  docsum --list-handlers                      - List available tile handlers
//
// Use - as the input path to read from stdin.
//
// Extra Parameters:
//
// Configuration keys can be overridden with --extra-<name> [value]. Boolean flags can omit the
// value (defaults to "true").
// Example:
//  docsum doc.json --extra-minimal --extra-handlers text,table

use clap::{Arg, ArgAction, Command, ValueHint};
use docsum::handlers::{handler_by_name, HANDLER_NAMES};
use docsum::input::parse_content;
use docsum::{normalize, summarize_curriculum, summarize_str, summarize_tiles, SummarizerOptions};
use docsum_config::{DocsumConfig, Loader};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Views accepted by `docsum inspect`
const INSPECT_VIEWS: &[&str] = &["normalized-json", "tiles", "curriculum"];

const SUBCOMMANDS: &[&str] = &["summarize", "inspect", "help"];

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        let key_opt = if let Some(key) = arg.strip_prefix("--extra-") {
            Some(key)
        } else {
            arg.strip_prefix("--extras-")
        };

        if let Some(key) = key_opt {
            let has_value = args
                .get(i + 1)
                .is_some_and(|next| !next.starts_with('-'));

            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
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
        .help("Snapshot JSON file, or - for stdin")
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn build_cli() -> Command {
    Command::new("docsum")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Summarize classroom document snapshots as Markdown")
        .long_about(
            "docsum turns a document snapshot (rows, tiles and shared data sets as JSON) into a\n\
            single deterministic Markdown report.\n\n\
            Commands:\n  \
            - summarize: Write the Markdown summary (default)\n  \
            - inspect:   View intermediate representations\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to override configuration keys.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n  \
            --extra-minimal         Drop explanatory prose and row headings\n  \
            --extra-include-model   Embed raw JSON for tile types no handler recognizes\n  \
            --extra-drawing-svg     Render drawings as inline SVG\n  \
            --extra-handlers <a,b>  Handler chain, in dispatch order\n  \
            --extra-log-level <f>   Logging filter (RUST_LOG wins when set)\n\n\
            Examples:\n  \
            docsum doc.json                        # Summary to stdout\n  \
            docsum doc.json -o summary.md          # Summary to a file\n  \
            cat doc.json | docsum -                # Read from stdin\n  \
            docsum inspect doc.json tiles          # Per-tile chunks",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
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
                .arg(input_arg())
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
                .long_about(
                    "View the snapshot at different processing stages.\n\n\
                    Views:\n  \
                    - normalized-json: The normalized model as JSON (default)\n  \
                    - tiles:           One Markdown chunk per tile and per data set\n  \
                    - curriculum:      The input summarized as curriculum content",
                )
                .arg(input_arg())
                .arg(
                    Arg::new("view")
                        .help("View to print. Defaults to 'normalized-json'")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(INSPECT_VIEWS))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        )
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Parse extra-* arguments before clap processing
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A bare input path means "summarize"
            let looks_like_input = cleaned_args.get(1).is_some_and(|first| {
                (first == "-" || !first.starts_with('-')) && !SUBCOMMANDS.contains(&first.as_str())
            });
            if !looks_like_input {
                e.exit();
            }
            let mut new_args = vec![cleaned_args[0].clone(), "summarize".to_string()];
            new_args.extend_from_slice(&cleaned_args[1..]);
            match cli.try_get_matches_from(&new_args) {
                Ok(m) => m,
                Err(e2) => e2.exit(),
            }
        }
    };

    if matches.get_flag("list-handlers") {
        handle_list_handlers_command();
        return;
    }

    let mut config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    apply_config_overrides(&mut config, &mut extra_params);
    init_logging(&config);

    for key in extra_params.keys() {
        warn!(option = %key, "ignoring unknown --extra option");
    }

    let options = config.summary.to_options().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });
    debug!(handlers = ?options.handlers().names(), "using tile handlers");

    match matches.subcommand() {
        Some(("summarize", sub_matches)) => {
            let Some(input) = sub_matches.get_one::<String>("input") else {
                eprintln!("An input path is required.");
                std::process::exit(1);
            };
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_summarize_command(input, output, &options);
        }
        Some(("inspect", sub_matches)) => {
            let Some(input) = sub_matches.get_one::<String>("input") else {
                eprintln!("An input path is required.");
                std::process::exit(1);
            };
            let view = sub_matches
                .get_one::<String>("view")
                .map(|s| s.as_str())
                .unwrap_or("normalized-json");
            handle_inspect_command(input, view, &options);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

/// Read the input file, or stdin for `-`.
fn read_input(input: &str) -> String {
    if input == "-" {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source).unwrap_or_else(|e| {
            eprintln!("Error reading stdin: {e}");
            std::process::exit(1);
        });
        return source;
    }

    fs::read_to_string(input).unwrap_or_else(|e| {
        eprintln!("Error reading file '{input}': {e}");
        std::process::exit(1);
    })
}

/// Handle the summarize command
fn handle_summarize_command(input: &str, output: Option<&str>, options: &SummarizerOptions) {
    let source = read_input(input);

    let summary = summarize_str(&source, options).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    match output {
        Some(path) => {
            fs::write(path, summary).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
        }
        None => print!("{summary}"),
    }
}

/// Handle the inspect command
fn handle_inspect_command(input: &str, view: &str, options: &SummarizerOptions) {
    let source = read_input(input);
    let content = parse_content(&source).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let output = match view {
        "normalized-json" => {
            let normalized = normalize(&content);
            serde_json::to_string_pretty(&normalized.model).map_err(|e| e.to_string())
        }
        "tiles" => summarize_tiles(&content, options)
            .map(|chunks| chunks.join("\n\n"))
            .map_err(|e| e.to_string()),
        "curriculum" => summarize_curriculum(&content, options).map_err(|e| e.to_string()),
        other => Err(format!("Unknown view '{other}'")),
    };

    match output {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Handle the list-handlers command
fn handle_list_handlers_command() {
    println!("Available tile handlers:\n");
    for name in HANDLER_NAMES {
        match handler_by_name(name) {
            Ok(handler) => println!("  {name:<12} {}", handler.description()),
            Err(_) => println!("  {name}"),
        }
    }
    println!("\nTiles no handler recognizes are described generically.");
}

fn load_cli_config(explicit_path: Option<&str>) -> DocsumConfig {
    let loader = Loader::new().with_optional_file("docsum.toml");
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

fn apply_config_overrides(config: &mut DocsumConfig, extra_params: &mut HashMap<String, String>) {
    if let Some(raw) = extra_params.remove("minimal") {
        config.summary.minimal = parse_bool_arg("minimal", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["include-model", "includemodel"]) {
        config.summary.include_model = parse_bool_arg("include-model", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["drawing-svg", "svg"]) {
        config.summary.drawing_svg = parse_bool_arg("drawing-svg", &raw);
    }
    if let Some(raw) = extra_params.remove("handlers") {
        config.summary.handlers = raw
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(raw) = take_override(extra_params, &["log-level", "log"]) {
        config.logging.level = raw;
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(config: &DocsumConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn take_override(map: &mut HashMap<String, String>, keys: &[&str]) -> Option<String> {
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
