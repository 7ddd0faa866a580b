//! Markdown filter
//!
//! CommonMark → HTML through the `comrak` crate.
//!
//! # Options
//!
//! | Option       | Values                                   | Effect                                    |
//! |--------------|------------------------------------------|-------------------------------------------|
//! | `safe_mode`  | `false` (default)                        | Raw HTML is passed through                |
//! |              | `true`, `"replace"`, `"remove"`          | Raw HTML is omitted                       |
//! |              | `"escape"`                               | Raw HTML is escaped                       |
//! | `extensions` | list of extension names                  | Enables comrak extensions (see below)     |
//! | `hardbreaks` | bool                                     | Soft line breaks render as `<br />`       |
//!
//! Extension names: `table`, `strikethrough`, `autolink`, `tasklist`,
//! `superscript`, `footnotes`, `description_lists`.
//!
//! Unrecognized options are forwarded but have no effect.

use crate::error::FilterError;
use crate::filter::MarkupFilter;
use crate::options::{bool_option, string_list_option, warn_unknown_options, FilterOptions};
use crate::settings::Settings;
use comrak::{markdown_to_html, ComrakOptions};
use serde_json::Value;

const NAME: &str = "markdown";
const KNOWN_OPTIONS: &[&str] = &["safe_mode", "extensions", "hardbreaks"];

/// Filter implementation for Markdown
pub struct MarkdownFilter;

impl MarkupFilter for MarkdownFilter {
    fn description(&self) -> &str {
        "CommonMark Markdown to HTML"
    }

    fn render(
        &self,
        text: &str,
        options: &FilterOptions,
        _settings: &dyn Settings,
    ) -> Result<String, FilterError> {
        let comrak_options = comrak_options_from(options)?;
        Ok(markdown_to_html(text, &comrak_options))
    }
}

/// How raw HTML embedded in the Markdown source is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SafeMode {
    Off,
    Omit,
    Escape,
}

fn safe_mode_from(options: &FilterOptions) -> Result<SafeMode, FilterError> {
    match options.get("safe_mode") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(SafeMode::Off),
        Some(Value::Bool(true)) => Ok(SafeMode::Omit),
        Some(Value::String(mode)) => match mode.as_str() {
            "replace" | "remove" => Ok(SafeMode::Omit),
            "escape" => Ok(SafeMode::Escape),
            other => Err(FilterError::invalid_option(
                NAME,
                "safe_mode",
                format!("unknown mode '{other}'; expected replace, remove or escape"),
            )),
        },
        Some(other) => Err(FilterError::invalid_option(
            NAME,
            "safe_mode",
            format!("expected a boolean or mode name, got {other}"),
        )),
    }
}

fn comrak_options_from(options: &FilterOptions) -> Result<ComrakOptions<'static>, FilterError> {
    let mut comrak_options = ComrakOptions::default();

    match safe_mode_from(options)? {
        SafeMode::Off => comrak_options.render.unsafe_ = true,
        SafeMode::Omit => comrak_options.render.unsafe_ = false,
        SafeMode::Escape => comrak_options.render.escape = true,
    }

    if let Some(hardbreaks) = bool_option(NAME, options, "hardbreaks")? {
        comrak_options.render.hardbreaks = hardbreaks;
    }

    for extension in string_list_option(NAME, options, "extensions")? {
        match extension.as_str() {
            "table" | "tables" => comrak_options.extension.table = true,
            "strikethrough" => comrak_options.extension.strikethrough = true,
            "autolink" => comrak_options.extension.autolink = true,
            "tasklist" => comrak_options.extension.tasklist = true,
            "superscript" => comrak_options.extension.superscript = true,
            "footnotes" => comrak_options.extension.footnotes = true,
            "description_lists" => comrak_options.extension.description_lists = true,
            other => {
                return Err(FilterError::invalid_option(
                    NAME,
                    "extensions",
                    format!("unknown extension '{other}'"),
                ))
            }
        }
    }

    warn_unknown_options(NAME, options, KNOWN_OPTIONS);

    Ok(comrak_options)
}
