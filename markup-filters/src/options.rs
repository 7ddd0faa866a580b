//! Filter options
//!
//! Options are free-form keyword arguments forwarded to a filter. Values are
//! JSON-like so the same map can come from a TOML file, the command line, or
//! Rust code. Each filter picks out the keys it understands and ignores the
//! rest.

use crate::error::FilterError;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

/// Keyword options passed to a filter
pub type FilterOptions = HashMap<String, Value>;

/// Merge `overrides` on top of `defaults`; keys in `overrides` win.
pub fn merge_options(defaults: &FilterOptions, overrides: &FilterOptions) -> FilterOptions {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Log the option keys `filter` does not understand. Returns them sorted.
pub fn warn_unknown_options<'a>(
    filter: &str,
    options: &'a FilterOptions,
    known: &[&str],
) -> Vec<&'a str> {
    let mut ignored: Vec<&str> = options
        .keys()
        .map(String::as_str)
        .filter(|key| !known.contains(key))
        .collect();
    ignored.sort_unstable();
    if !ignored.is_empty() {
        warn!(filter, ?ignored, "ignoring unsupported options");
    }
    ignored
}

/// Read a boolean option. Missing keys yield `None`.
pub fn bool_option(
    filter: &str,
    options: &FilterOptions,
    key: &str,
) -> Result<Option<bool>, FilterError> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::Number(n)) => Ok(Some(n.as_f64().is_some_and(|n| n != 0.0))),
        Some(other) => Err(FilterError::invalid_option(
            filter,
            key,
            format!("expected a boolean, got {other}"),
        )),
    }
}

/// Read a string option. Missing keys yield `None`.
pub fn str_option<'a>(
    filter: &str,
    options: &'a FilterOptions,
    key: &str,
) -> Result<Option<&'a str>, FilterError> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(FilterError::invalid_option(
            filter,
            key,
            format!("expected a string, got {other}"),
        )),
    }
}

/// Read an unsigned integer option. Missing keys yield `None`.
pub fn uint_option(
    filter: &str,
    options: &FilterOptions,
    key: &str,
) -> Result<Option<u64>, FilterError> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_u64().map(Some).ok_or_else(|| {
            FilterError::invalid_option(filter, key, format!("expected a positive integer, got {n}"))
        }),
        Some(Value::String(s)) => s.trim().parse::<u64>().map(Some).map_err(|_| {
            FilterError::invalid_option(filter, key, format!("expected a positive integer, got '{s}'"))
        }),
        Some(other) => Err(FilterError::invalid_option(
            filter,
            key,
            format!("expected a positive integer, got {other}"),
        )),
    }
}

/// Read a table option as a nested option map. Missing keys yield `None`.
pub fn table_option(
    filter: &str,
    options: &FilterOptions,
    key: &str,
) -> Result<Option<FilterOptions>, FilterError> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(
            map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        )),
        Some(other) => Err(FilterError::invalid_option(
            filter,
            key,
            format!("expected a table, got {other}"),
        )),
    }
}

/// Read a list-of-strings option. A single string is treated as a one-element list.
pub fn string_list_option(
    filter: &str,
    options: &FilterOptions,
    key: &str,
) -> Result<Vec<String>, FilterError> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(FilterError::invalid_option(
                    filter,
                    key,
                    format!("expected a list of strings, found {other}"),
                )),
            })
            .collect(),
        Some(other) => Err(FilterError::invalid_option(
            filter,
            key,
            format!("expected a list of strings, got {other}"),
        )),
    }
}

/// Interpret a raw string as an option value.
///
/// Used for options that arrive as text (command-line extras): `true`/`false`
/// become booleans, numeric strings become numbers, anything else stays a string.
pub fn parse_option_value(raw: &str) -> Value {
    match raw.to_lowercase().as_str() {
        "true" | "yes" | "on" => return Value::Bool(true),
        "false" | "no" | "off" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(f) = raw.parse::<f64>() {
        if f.is_finite() {
            return Value::from(f);
        }
    }
    Value::String(raw.to_string())
}
