// Command-line interface for eaflex
//
// This binary moves corpora between ELAN (.eaf) and FLEx (.flextext) and back.
// The conversions themselves live in eaflex-babel; this crate reads files, loads
// the configuration through eaflex-config and writes the results.
//
// Converting:
//
// The source format is auto-detected from the file extension and can be overridden with --from.
// Going back to EAF needs the document the interlinear text was exported from (--original):
// its participants pick the speakers and its header and metadata are carried over.
// Usage:
//  eaflex <input> --to <format> [--from <format>] [-o <file>]       - Convert (default)
//  eaflex convert <input> --to eaf --original <eaf> [-o <file>]      - Same as above (explicit)
//  eaflex batch                                                       - Convert everything listed under [batch]
//  eaflex inspect <input> [<view>]                                    - Outline tiers or dump segment records
//  eaflex --list-formats                                              - List available formats
//
// Configuration:
//
// Built-in defaults, then ./eaflex.toml if present, then --config <path>, then overrides.
// Scalar settings can be overridden per run with --extra-<key> <value>, where key is the
// dotted configuration path:
//  eaflex session.eaf --to flextext --extra-languages.main ain

mod batch;
mod inspect;

use clap::{Arg, ArgAction, Command, ValueHint};
use eaflex_babel::transforms::{eaf_segments, eaf_to_flextext, flextext_to_eaf};
use eaflex_babel::{ConversionSettings, FormatRegistry};
use eaflex_config::{EaflexConfig, Loader, PROJECT_FILE};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const SUBCOMMANDS: &[&str] = &["convert", "batch", "inspect", "help"];

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if let Some(key) = arg.strip_prefix("--extra-") {
            let has_value = args.get(i + 1).is_some_and(|next| !next.starts_with('-'));
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

fn build_cli() -> Command {
    Command::new("eaflex")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert between ELAN annotation documents and FLEx interlinear texts")
        .long_about(
            "eaflex exports ELAN (.eaf) utterances to FLEx (.flextext) for glossing,\n\
            and brings the glossed text back as ELAN tiers.\n\n\
            Commands:\n  \
            - convert: Convert one document (default command)\n  \
            - batch:   Convert every document listed under [batch] in the configuration\n  \
            - inspect: Show a tier outline or the segment records of a document\n\n\
            Extra Parameters:\n  \
            Use --extra-<key> <value> to override a configuration value for this run,\n  \
            e.g. --extra-languages.main ain\n\n\
            Examples:\n  \
            eaflex session.eaf --to flextext -o session.flextext\n  \
            eaflex glossed.flextext --to eaf --original session.eaf -o out.eaf\n  \
            eaflex inspect session.eaf\n  \
            eaflex batch --config corpus.toml",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to an eaflex.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log debug output to stderr (overrides RUST_LOG)")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between eaf and flextext (default command)")
                .long_about(
                    "Convert one document.\n\n\
                    Supported formats:\n  \
                    - eaf:      ELAN annotation document (.eaf)\n  \
                    - flextext: FLEx interlinear text (.flextext)\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.\n\
                    Converting to eaf requires --original, the document the\n\
                    interlinear text was exported from.\n\n\
                    Examples:\n  \
                    eaflex convert session.eaf --to flextext --title 'Fishing trip'\n  \
                    eaflex convert glossed.flextext --to eaf --original session.eaf -o out.eaf\n  \
                    eaflex session.eaf --to flextext            # 'convert' is optional",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_parser(["eaf", "flextext"])
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .required(true)
                        .value_parser(["eaf", "flextext"])
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("original")
                        .long("original")
                        .value_name("EAF")
                        .help("Original eaf document (required with --to eaf)")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("title")
                        .long("title")
                        .help("Title of the interlinear text (defaults to the input file name)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .value_name("PATH")
                        .help("Also write the segment records as JSON")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("batch")
                .about("Convert every document listed under [batch]")
                .long_about(
                    "Convert the documents listed in the configuration.\n\n\
                    [[batch.to_flextext]] entries write <stem>-elan_export.flextext,\n\
                    [[batch.to_eaf]] entries write <original stem>-flex_export.eaf,\n\
                    each next to its input. A failing document is reported and the\n\
                    others still run; the exit status is non-zero if any failed.",
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show the tier outline or segment records of a document")
                .arg(
                    Arg::new("path")
                        .help("Path to an eaf or flextext file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("view")
                        .help("View to show. Defaults to tier-outline for eaf, segments-json for flextext")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            inspect::AVAILABLE_VIEWS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        )
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A leading file path means the convert subcommand was left out
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !SUBCOMMANDS.contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
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

    init_tracing(matches.get_flag("verbose"));

    if matches.get_flag("list-formats") {
        handle_list_formats_command();
        return;
    }

    let config = load_cli_config(
        matches.get_one::<String>("config").map(|s| s.as_str()),
        &extra_params,
    );
    let settings = ConversionSettings::try_from(&config).unwrap_or_else(|e| fail(e));

    let result = match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let to = sub_matches.get_one::<String>("to").expect("to is required");
            let from = match sub_matches.get_one::<String>("from") {
                Some(f) => f.to_string(),
                None => {
                    let registry = FormatRegistry::default();
                    registry.detect_format_from_filename(input).unwrap_or_else(|| {
                        fail(format!(
                            "Could not detect format from filename '{input}'\nPlease specify --from explicitly"
                        ))
                    })
                }
            };
            let request = ConvertRequest {
                input,
                from: &from,
                to,
                original: sub_matches.get_one::<String>("original").map(|s| s.as_str()),
                output: sub_matches.get_one::<String>("output").map(|s| s.as_str()),
                title: sub_matches.get_one::<String>("title").map(|s| s.as_str()),
                json: sub_matches.get_one::<String>("json").map(|s| s.as_str()),
            };
            handle_convert_command(&request, &settings)
        }
        Some(("batch", _)) => handle_batch_command(&config, &settings),
        Some(("inspect", sub_matches)) => {
            let path = sub_matches
                .get_one::<String>("path")
                .expect("path is required");
            let view = sub_matches.get_one::<String>("view").map(|s| s.as_str());
            handle_inspect_command(path, view, &settings)
        }
        _ => Err("Unknown subcommand. Use --help for usage information.".to_string()),
    };

    if let Err(message) = result {
        fail(message);
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

struct ConvertRequest<'a> {
    input: &'a str,
    from: &'a str,
    to: &'a str,
    original: Option<&'a str>,
    output: Option<&'a str>,
    title: Option<&'a str>,
    json: Option<&'a str>,
}

/// Handle the convert command
fn handle_convert_command(
    request: &ConvertRequest,
    settings: &ConversionSettings,
) -> Result<(), String> {
    let source = read_file(request.input)?;

    let (document, segments) = match (request.from, request.to) {
        ("eaf", "flextext") => {
            let title = request
                .title
                .map(str::to_string)
                .unwrap_or_else(|| batch::file_stem(Path::new(request.input)));
            let document =
                eaf_to_flextext(&source, settings, Some(&title)).map_err(|e| e.to_string())?;
            let segments = match request.json {
                Some(_) => Some(eaf_segments(&source, settings).map_err(|e| e.to_string())?),
                None => None,
            };
            (document, segments)
        }
        ("flextext", "eaf") => {
            let original_path = request
                .original
                .ok_or("Converting to eaf needs --original <EAF>, the document the text was exported from")?;
            let original = read_file(original_path)?;
            let export =
                flextext_to_eaf(&source, &original, settings).map_err(|e| e.to_string())?;
            (export.document, Some(export.segments))
        }
        (from, to) if from == to => {
            return Err(format!("Source and target format are both '{to}'"));
        }
        (from, to) => return Err(format!("Cannot convert from '{from}' to '{to}'")),
    };

    if let (Some(path), Some(segments)) = (request.json, segments) {
        let json = serde_json::to_string_pretty(&segments)
            .map_err(|e| format!("JSON serialization failed: {e}"))?;
        write_file(path, &json)?;
    }

    match request.output {
        Some(path) => write_file(path, &document),
        None => {
            print!("{document}");
            Ok(())
        }
    }
}

/// Handle the batch command
fn handle_batch_command(config: &EaflexConfig, settings: &ConversionSettings) -> Result<(), String> {
    let report = batch::run_batch(&config.batch, settings);
    for path in &report.written {
        println!("wrote {}", path.display());
    }
    for (input, message) in &report.failed {
        eprintln!("failed {}: {message}", input.display());
    }
    if report.failed.is_empty() {
        println!("converted {} document(s)", report.total());
        Ok(())
    } else {
        Err(format!(
            "{} of {} document(s) failed",
            report.failed.len(),
            report.total()
        ))
    }
}

/// Handle the inspect command
fn handle_inspect_command(
    path: &str,
    view: Option<&str>,
    settings: &ConversionSettings,
) -> Result<(), String> {
    let registry = FormatRegistry::default();
    let format = registry
        .detect_format_from_filename(path)
        .ok_or_else(|| format!("Could not detect format from filename '{path}'"))?;
    let source = read_file(path)?;
    let view = view.unwrap_or_else(|| inspect::default_view(&format));
    let output = inspect::execute_view(&source, &format, view, settings)?;
    print!("{output}");
    Ok(())
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    let registry = FormatRegistry::default();
    println!("Available formats:\n");
    for name in registry.list_formats() {
        if let Ok(format) = registry.get(&name) {
            println!(
                "  {name:<10} {} (.{})",
                format.description(),
                format.file_extensions().join(", .")
            );
        }
    }
    println!("\nInspect views:");
    for view in inspect::AVAILABLE_VIEWS {
        println!("  {view}");
    }
}

fn read_file(path: &str) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Error reading file '{path}': {e}"))
}

fn write_file(path: &str, contents: &str) -> Result<(), String> {
    fs::write(path, contents).map_err(|e| format!("Error writing file '{path}': {e}"))
}

fn load_cli_config(explicit_path: Option<&str>, overrides: &HashMap<String, String>) -> EaflexConfig {
    let loader = Loader::new().with_optional_file(PROJECT_FILE);
    let mut loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    let mut keys: Vec<&String> = overrides.keys().collect();
    keys.sort();
    for key in keys {
        loader = loader
            .set_override(key, overrides[key].as_str())
            .unwrap_or_else(|err| fail(format!("Invalid override '--extra-{key}': {err}")));
    }

    loader
        .build()
        .unwrap_or_else(|err| fail(format!("Failed to load configuration: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_extra_args_empty() {
        let (cleaned, extras) = parse_extra_args(&args(&["eaflex", "in.eaf", "--to", "flextext"]));
        assert_eq!(cleaned, args(&["eaflex", "in.eaf", "--to", "flextext"]));
        assert!(extras.is_empty());
    }

    #[test]
    fn test_parse_extra_args_with_values() {
        let (cleaned, extras) = parse_extra_args(&args(&[
            "eaflex",
            "in.eaf",
            "--extra-languages.main",
            "ain",
            "--to",
            "flextext",
            "--extra-languages.child",
            "ain-x-child",
        ]));
        assert_eq!(cleaned, args(&["eaflex", "in.eaf", "--to", "flextext"]));
        assert_eq!(extras.get("languages.main"), Some(&"ain".to_string()));
        assert_eq!(extras.get("languages.child"), Some(&"ain-x-child".to_string()));
    }

    #[test]
    fn test_parse_extra_args_boolean_flag() {
        let (cleaned, extras) = parse_extra_args(&args(&["eaflex", "batch", "--extra-flag", "--verbose"]));
        assert_eq!(cleaned, args(&["eaflex", "batch", "--verbose"]));
        assert_eq!(extras.get("flag"), Some(&"true".to_string()));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_overrides_reach_the_config() {
        let mut overrides = HashMap::new();
        overrides.insert("languages.main".to_string(), "ain".to_string());
        let config = load_cli_config(None, &overrides);
        assert_eq!(config.languages.main, "ain");
    }
}
