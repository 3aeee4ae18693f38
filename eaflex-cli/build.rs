use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the views from src/inspect.rs
// We need to duplicate this here since build scripts can't access src/ modules
const AVAILABLE_VIEWS: &[&str] = &["segments-json", "tier-outline"];
const FORMATS: &[&str] = &["eaf", "flextext"];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("eaflex")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert between ELAN annotation documents and FLEx interlinear texts")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .global(true)
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("convert")
                .arg(
                    Arg::new("input")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(Arg::new("from").long("from").value_parser(clap::builder::PossibleValuesParser::new(FORMATS)))
                .arg(Arg::new("to").long("to").value_parser(clap::builder::PossibleValuesParser::new(FORMATS)))
                .arg(
                    Arg::new("original")
                        .long("original")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                )
                .arg(Arg::new("title").long("title"))
                .arg(
                    Arg::new("json")
                        .long("json")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(Command::new("batch"))
        .subcommand(
            Command::new("inspect")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("view")
                        .index(2)
                        .value_parser(clap::builder::PossibleValuesParser::new(AVAILABLE_VIEWS)),
                ),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "eaflex", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "eaflex", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "eaflex", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
