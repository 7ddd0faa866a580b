//! reStructuredText filter
//!
//! reST → HTML fragment. Only the body is returned; the document title
//! (when promoted) and any header/footer are not part of the output.
//!
//! # Options
//!
//! - `writer_name`: `html4css1` (default), `html`, `html4`, `html5` or
//!   `html5_polyglot`. The HTML4 writers wrap sections in
//!   `<div class="section">`, the HTML5 writers in `<section>`.
//! - `settings_overrides`: table of document settings. When absent it is
//!   taken from [`Settings::restructuredtext_settings`]. Understood keys:
//!   `doctitle_xform` (default `true`) and `initial_header_level` (1-6,
//!   default 1).

pub mod parser;

use crate::error::FilterError;
use crate::filter::MarkupFilter;
use crate::filters::common::html::{render_blocks, SectionStyle};
use crate::options::{
    bool_option, str_option, table_option, uint_option, warn_unknown_options, FilterOptions,
};
use crate::settings::Settings;
use parser::{parse_restructuredtext, ParseSettings};
use tracing::warn;

const NAME: &str = "restructuredtext";
const DEFAULT_WRITER: &str = "html4css1";
const KNOWN_OPTIONS: &[&str] = &["writer_name", "settings_overrides"];
const KNOWN_OVERRIDES: &[&str] = &["doctitle_xform", "initial_header_level"];

/// Filter implementation for reStructuredText
pub struct RestructuredTextFilter;

impl MarkupFilter for RestructuredTextFilter {
    fn description(&self) -> &str {
        "reStructuredText to an HTML fragment"
    }

    fn render(
        &self,
        text: &str,
        options: &FilterOptions,
        settings: &dyn Settings,
    ) -> Result<String, FilterError> {
        let style = writer_style(str_option(NAME, options, "writer_name")?.unwrap_or(DEFAULT_WRITER))?;
        let overrides = match table_option(NAME, options, "settings_overrides")? {
            Some(overrides) => overrides,
            None => settings.restructuredtext_settings(),
        };
        let parse_settings = parse_settings_from(&overrides)?;
        warn_unknown_options(NAME, options, KNOWN_OPTIONS);

        let blocks = parse_restructuredtext(text, &parse_settings);
        render_blocks(NAME, &blocks, style)
    }
}

fn writer_style(writer: &str) -> Result<SectionStyle, FilterError> {
    match writer {
        "html4css1" | "html" | "html4" => Ok(SectionStyle::Div),
        "html5" | "html5_polyglot" => Ok(SectionStyle::Section),
        other => Err(FilterError::invalid_option(
            NAME,
            "writer_name",
            format!("unknown writer '{other}'"),
        )),
    }
}

fn parse_settings_from(overrides: &FilterOptions) -> Result<ParseSettings, FilterError> {
    let defaults = ParseSettings::default();

    let doctitle_xform =
        bool_option(NAME, overrides, "doctitle_xform")?.unwrap_or(defaults.doctitle_xform);

    let initial_header_level = match uint_option(NAME, overrides, "initial_header_level")? {
        None => defaults.initial_header_level,
        Some(level @ 1..=6) => level as u8,
        Some(level) => {
            return Err(FilterError::invalid_option(
                NAME,
                "initial_header_level",
                format!("expected a level between 1 and 6, got {level}"),
            ))
        }
    };

    let ignored: Vec<&str> = overrides
        .keys()
        .map(String::as_str)
        .filter(|key| !KNOWN_OVERRIDES.contains(key))
        .collect();
    if !ignored.is_empty() {
        warn!(filter = NAME, ?ignored, "ignoring unsupported settings overrides");
    }

    Ok(ParseSettings {
        doctitle_xform,
        initial_header_level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::StaticSettings;
    use serde_json::{json, Value};

    fn options(value: Value) -> FilterOptions {
        match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => FilterOptions::new(),
        }
    }

    fn render(text: &str, opts: Value) -> Result<String, FilterError> {
        RestructuredTextFilter.render(text, &options(opts), &StaticSettings::default())
    }

    #[test]
    fn renders_fragment_only() {
        let html = render("Hello *world*", json!({})).unwrap();
        assert_eq!(html, "<p>Hello <em>world</em></p>\n");
    }

    #[test]
    fn document_title_is_not_in_fragment() {
        let html = render("Title\n=====\n\nBody", json!({})).unwrap();
        assert_eq!(html, "<p>Body</p>\n");

        let html = render(
            "Title\n=====\n\nBody",
            json!({"settings_overrides": {"doctitle_xform": false}}),
        )
        .unwrap();
        assert_eq!(
            html,
            "<div class=\"section\" id=\"title\"><h1>Title</h1><p>Body</p></div>\n"
        );
    }

    #[test]
    fn html5_writer_uses_section_elements() {
        let html = render(
            "One\n===\n\nA\n\nTwo\n===\n\nB",
            json!({"writer_name": "html5"}),
        )
        .unwrap();
        assert_eq!(
            html,
            "<section id=\"one\"><h1>One</h1><p>A</p></section>\n\
             <section id=\"two\"><h1>Two</h1><p>B</p></section>\n"
        );
    }

    #[test]
    fn initial_header_level_shifts_headings() {
        let html = render(
            "One\n===\n\nA\n\nTwo\n===\n\nB",
            json!({"settings_overrides": {"initial_header_level": 2}}),
        )
        .unwrap();
        assert!(html.contains("<h2>One</h2>"));
        assert!(!html.contains("<h1>"));
    }

    #[test]
    fn overrides_fall_back_to_settings() {
        let mut configured = FilterOptions::new();
        configured.insert("initial_header_level".to_string(), json!(3));
        let settings = StaticSettings::default().with_restructuredtext_settings(configured);
        let source = "One\n===\n\nA\n\nTwo\n===\n\nB";

        let html = RestructuredTextFilter
            .render(source, &FilterOptions::new(), &settings)
            .unwrap();
        assert!(html.contains("<h3>One</h3>"));

        // Explicit overrides replace the configured table wholesale
        let html = RestructuredTextFilter
            .render(source, &options(json!({"settings_overrides": {}})), &settings)
            .unwrap();
        assert!(html.contains("<h1>One</h1>"));
    }

    #[test]
    fn rejects_unknown_writer() {
        let err = render("x", json!({"writer_name": "latex"})).unwrap_err();
        assert!(matches!(err, FilterError::InvalidOption { ref option, .. } if option == "writer_name"));
    }

    #[test]
    fn rejects_out_of_range_header_level() {
        let err = render("x", json!({"settings_overrides": {"initial_header_level": 7}})).unwrap_err();
        assert!(
            matches!(err, FilterError::InvalidOption { ref option, .. } if option == "initial_header_level")
        );
    }
}
