use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the filters registered by MarkupRegistry::with_defaults
// Build scripts can't depend on the library crate being built alongside them
const DEFAULT_FILTERS: &[&str] = &["markdown", "textile", "restructuredtext", "linebreaks"];

const COMPARISONS: &[&str] = &["less", "less_or_equal", "greater_or_equal", "greater"];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("markup")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Apply text-to-HTML markup filters")
        .arg_required_else_help(true)
        .arg(
            Arg::new("list-filters")
                .long("list-filters")
                .help("List registered markup filters")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Path to a markup.toml configuration file")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("set")
                .long("set")
                .help("Override a configuration value")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log filter resolution to stderr")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("apply")
                .about("Apply a markup filter (default command)")
                .arg(
                    Arg::new("input")
                        .help("Input file path, or '-' for stdin")
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("filter")
                        .long("filter")
                        .short('f')
                        .help("Filter to apply instead of the configured default")
                        .value_parser(clap::builder::PossibleValuesParser::new(DEFAULT_FILTERS)),
                )
                .arg(
                    Arg::new("no-filter")
                        .long("no-filter")
                        .help("Return the input unchanged")
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
        .subcommand(
            Command::new("settings")
                .about("Print configuration values as JSON")
                .arg(Arg::new("names").num_args(1..).index(1)),
        )
        .subcommand(Command::new("media").about("Print the media template context as JSON"))
        .subcommand(
            Command::new("compare")
                .about("Compare two values")
                .arg(Arg::new("left").index(1))
                .arg(
                    Arg::new("comparison")
                        .index(2)
                        .value_parser(clap::builder::PossibleValuesParser::new(COMPARISONS)),
                )
                .arg(Arg::new("right").index(3))
                .arg(
                    Arg::new("context")
                        .long("context")
                        .value_hint(ValueHint::FilePath),
                ),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "markup", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "markup", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "markup", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
