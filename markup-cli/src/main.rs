// Command-line interface for markup filtering
//
// This binary applies the markup filters from the markup-filters crate to files or stdin, using the
// layered configuration from markup-config to pick the default filter and its options.
//
// Usage:
//  markup <input> [--filter <name> | --no-filter] [--output <file>]   - Apply a filter (default)
//  markup apply <input> ...                                          - Same as above (explicit)
//  markup settings <name>...                                         - Print settings as JSON
//  markup media                                                      - Print the media context as JSON
//  markup compare <left> <comparison> <right> [--context <file>]     - Evaluate a comparison
//  markup --list-filters                                             - List registered filters
//
// Filter Selection:
//
// Without --filter the configured default ([markup_filter] in markup.toml) is used, and its options
// are merged under the ones given on the command line. --filter <name> uses that filter with only the
// command-line options. --no-filter copies the input through unchanged.
//
// Extra Parameters:
//
// Filter options can be passed using --extra-<option> <value>. Dashes in the option name become
// underscores and dots address nested tables.
// Example:
//  markup notes.md --filter markdown --extra-safe-mode escape --extra-extensions table
//  markup notes.rst --extra-settings_overrides.initial_header_level 2

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use markup_config::{
    media_context, Loader, MarkupConfig, SettingsProcessor, ValueKind, PROJECT_CONFIG_FILE,
};
use markup_filters::options::parse_option_value;
use markup_filters::{
    resolve_variable_or_literal, Comparison, ComparisonError, FilterChoice, FilterOptions,
    MarkupRegistry,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const SUBCOMMANDS: &[&str] = &["apply", "settings", "media", "compare", "help"];

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
            let has_value = args.get(i + 1).is_some_and(|next| is_extra_value(next));

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

/// `-1` and `-0.5` are values; `-o`, `--filter` and a lone `-` (stdin) are not
fn is_extra_value(arg: &str) -> bool {
    match arg.strip_prefix('-') {
        None => true,
        Some(rest) => rest.starts_with(|c: char| c.is_ascii_digit() || c == '.'),
    }
}

/// Turn extra parameters into filter options.
///
/// `safe-mode` becomes `safe_mode`; `a.b` becomes `{"a": {"b": ...}}`.
fn options_from_extras(extra_params: &HashMap<String, String>) -> FilterOptions {
    let mut options = Map::new();
    for (key, raw) in extra_params {
        insert_dotted(&mut options, &key.replace('-', "_"), parse_option_value(raw));
    }
    options.into_iter().collect()
}

fn insert_dotted(map: &mut Map<String, Value>, key: &str, value: Value) {
    match key.split_once('.') {
        None => {
            map.insert(key.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = map
                .entry(head)
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(inner) = entry {
                insert_dotted(inner, rest, value);
            }
        }
    }
}

/// Convert a `--set` value into a typed configuration value
fn override_value(raw: &str) -> ValueKind {
    match parse_option_value(raw) {
        Value::Bool(b) => ValueKind::Boolean(b),
        Value::Number(n) => n
            .as_i64()
            .map(ValueKind::I64)
            .or_else(|| n.as_f64().map(ValueKind::Float))
            .unwrap_or_else(|| ValueKind::String(raw.to_string())),
        _ => ValueKind::String(raw.to_string()),
    }
}

fn build_cli() -> Command {
    Command::new("markup")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Apply text-to-HTML markup filters")
        .long_about(
            "markup converts Markdown, Textile, reStructuredText or plain text to HTML.\n\n\
            Commands:\n  \
            - apply:    Run a filter over a file or stdin (default command)\n  \
            - settings: Print configuration values as JSON\n  \
            - media:    Print MEDIA_URL and ADMIN_MEDIA_PREFIX as JSON\n  \
            - compare:  Evaluate less/greater comparisons\n\n\
            Extra Parameters:\n  \
            Use --extra-<option> [value] to pass filter options.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            markup notes.md                          # Configured default filter\n  \
            markup notes.md --filter markdown        # Explicit filter\n  \
            markup notes.txt --no-filter             # Copy through unchanged\n  \
            cat notes.rst | markup - --filter restructuredtext -o notes.html",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-filters")
                .long("list-filters")
                .help("List registered markup filters")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a markup.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("set")
                .long("set")
                .value_name("KEY=VALUE")
                .help("Override a configuration value (e.g. markup_filter.name=markdown)")
                .action(ArgAction::Append)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log filter resolution to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("apply")
                .about("Apply a markup filter (default command)")
                .long_about(
                    "Apply a markup filter to a file, or to stdin when the input is '-'.\n\n\
                    Without --filter the configured default filter is used and its options\n\
                    are merged under any --extra-* options.\n\n\
                    Examples:\n  \
                    markup apply notes.md                        # Configured default\n  \
                    markup apply notes.md --filter textile       # Explicit filter\n  \
                    markup apply notes.md -o notes.html          # Write to a file\n  \
                    markup notes.md                              # 'apply' is optional",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path, or '-' for stdin")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("filter")
                        .long("filter")
                        .short('f')
                        .help("Filter to apply instead of the configured default")
                        .conflicts_with("no-filter")
                        .value_hint(ValueHint::Other),
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
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("settings")
                .about("Print configuration values as JSON")
                .arg(
                    Arg::new("names")
                        .help("Dotted setting names (e.g. default_charset, media.url)")
                        .required(true)
                        .num_args(1..)
                        .index(1),
                ),
        )
        .subcommand(Command::new("media").about("Print the media template context as JSON"))
        .subcommand(
            Command::new("compare")
                .about("Compare two values")
                .long_about(
                    "Compare two values the way the if_less / if_greater template tags do.\n\n\
                    Each operand is looked up as a dotted path in the JSON context; when the\n\
                    lookup fails, digits are read as an integer and anything else as text.\n\
                    Prints 'true' or 'false'.\n\n\
                    Examples:\n  \
                    markup compare 2 less 3\n  \
                    markup compare item.id if_less_or_equal 10 --context ctx.json",
                )
                .arg(Arg::new("left").required(true).index(1))
                .arg(
                    Arg::new("comparison")
                        .help("less, less_or_equal, greater_or_equal or greater (if_ prefix allowed)")
                        .required(true)
                        .index(2),
                )
                .arg(Arg::new("right").required(true).index(3))
                .arg(
                    Arg::new("context")
                        .long("context")
                        .value_name("PATH")
                        .help("JSON file with the variables operands may refer to")
                        .value_hint(ValueHint::FilePath),
                ),
        )
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Parse extra-* arguments before clap processing
    let (cleaned_args, extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A path in first position means the default command
            if cleaned_args.len() > 1
                && (cleaned_args[1] == "-" || !cleaned_args[1].starts_with('-'))
                && !SUBCOMMANDS.contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "apply".to_string()];
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

    let loader = build_loader(&matches);
    let config = loader.clone().build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    });

    if matches.get_flag("list-filters") {
        handle_list_filters_command(config);
        return;
    }

    match matches.subcommand() {
        Some(("apply", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let choice = if sub_matches.get_flag("no-filter") {
                FilterChoice::Passthrough
            } else {
                match sub_matches.get_one::<String>("filter") {
                    Some(name) => FilterChoice::Named(name.as_str()),
                    None => FilterChoice::Configured,
                }
            };
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            let options = options_from_extras(&extra_params);
            handle_apply_command(input, choice, output, &options, config);
        }
        Some(("settings", sub_matches)) => {
            let names: Vec<String> = sub_matches
                .get_many::<String>("names")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            handle_settings_command(loader, names);
        }
        Some(("media", _)) => {
            print_json(&Value::Object(media_context(&config)));
        }
        Some(("compare", sub_matches)) => {
            let get = |name: &str| {
                sub_matches
                    .get_one::<String>(name)
                    .map(|s| s.as_str())
                    .unwrap_or_default()
            };
            let context = sub_matches.get_one::<String>("context").map(|s| s.as_str());
            handle_compare_command(get("left"), get("comparison"), get("right"), context);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn build_loader(matches: &ArgMatches) -> Loader {
    let mut loader = Loader::new().with_optional_file(PROJECT_CONFIG_FILE);
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }

    for assignment in matches.get_many::<String>("set").into_iter().flatten() {
        let Some((key, raw)) = assignment.split_once('=') else {
            eprintln!("Invalid --set '{assignment}': expected KEY=VALUE");
            std::process::exit(1);
        };
        loader = loader
            .set_override(key.trim(), override_value(raw.trim()))
            .unwrap_or_else(|err| {
                eprintln!("Invalid --set '{assignment}': {err}");
                std::process::exit(1);
            });
    }

    loader
}

/// Handle the apply command
fn handle_apply_command(
    input: &str,
    choice: FilterChoice<'_>,
    output: Option<&str>,
    options: &FilterOptions,
    config: MarkupConfig,
) {
    let source = read_input(input).unwrap_or_else(|e| {
        eprintln!("Error reading '{input}': {e}");
        std::process::exit(1);
    });

    debug!(?choice, options = options.len(), "applying markup");
    let registry = MarkupRegistry::with_defaults(Arc::new(config));
    let html = registry.apply(&source, choice, options).unwrap_or_else(|e| {
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
        None => print!("{html}"),
    }
}

fn read_input(input: &str) -> io::Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        fs::read_to_string(input)
    }
}

/// Handle the settings command
fn handle_settings_command(loader: Loader, names: Vec<String>) {
    let values = SettingsProcessor::new(loader, names)
        .process()
        .unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            std::process::exit(1);
        });
    print_json(&Value::Object(values));
}

/// Handle the compare command
fn handle_compare_command(left: &str, comparison: &str, right: &str, context: Option<&str>) {
    let context = match context {
        Some(path) => {
            let raw = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading file '{path}': {e}");
                std::process::exit(1);
            });
            serde_json::from_str(&raw).unwrap_or_else(|e| {
                eprintln!("Invalid JSON in '{path}': {e}");
                std::process::exit(1);
            })
        }
        None => Value::Object(Map::new()),
    };

    let comparison: Comparison = comparison.parse().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    match compare_operands(comparison, left, right, &context) {
        Ok(result) => println!("{result}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn compare_operands(
    comparison: Comparison,
    left: &str,
    right: &str,
    context: &Value,
) -> Result<bool, ComparisonError> {
    let left = resolve_variable_or_literal(left, context);
    let right = resolve_variable_or_literal(right, context);
    comparison.evaluate(&left, &right)
}

/// Handle the list-filters command
fn handle_list_filters_command(config: MarkupConfig) {
    let registry = MarkupRegistry::with_defaults(Arc::new(config));
    println!("Available filters:\n");
    for name in registry.list_filters() {
        let description = registry
            .get(&name)
            .map(|filter| filter.description().to_string())
            .unwrap_or_default();
        println!("  {name:<18} {description}");
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
