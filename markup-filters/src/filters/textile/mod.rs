//! Textile filter
//!
//! Textile → HTML. The source is parsed into the shared document model
//! (see [`parser`]) and rendered through the common HTML serializer.
//!
//! # Options
//!
//! - `encoding`: charset the source text must be representable in.
//! - `output`: charset of the produced HTML. Characters outside it are
//!   written as numeric character references (`&#233;`).
//!
//! Both default to [`Settings::default_charset`] when absent. Supported
//! charsets are the UTF-8, ASCII and Latin-1 families.
//!
//! # Supported Syntax
//!
//! | Textile                  | HTML                         |
//! |--------------------------|------------------------------|
//! | `h1.` … `h6.`            | `<h1>` … `<h6>`              |
//! | `p.` / plain block       | `<p>`                        |
//! | `bq.`                    | `<blockquote><p>`            |
//! | `bc.`                    | `<pre><code>`                |
//! | `*` / `#` lines          | `<ul>` / `<ol>`, nested by repetition |
//! | `*strong*`, `**bold**`   | `<strong>`                   |
//! | `_em_`, `__italic__`     | `<em>`                       |
//! | `@code@`                 | `<code>`                     |
//! | `-del-`, `+ins+`         | `<del>`, `<ins>`             |
//! | `^sup^`, `~sub~`         | `<sup>`, `<sub>`             |
//! | `"text":url`             | `<a href>`                   |
//! | `!src!`, `!src(alt)!`    | `<img>`                      |

pub mod parser;

use crate::error::FilterError;
use crate::filter::MarkupFilter;
use crate::filters::common::html::{render_blocks, SectionStyle};
use crate::options::{str_option, warn_unknown_options, FilterOptions};
use crate::settings::Settings;
use std::fmt::Write;

const NAME: &str = "textile";
const KNOWN_OPTIONS: &[&str] = &["encoding", "output"];

/// Filter implementation for Textile
pub struct TextileFilter;

impl MarkupFilter for TextileFilter {
    fn description(&self) -> &str {
        "Textile to HTML"
    }

    fn render(
        &self,
        text: &str,
        options: &FilterOptions,
        settings: &dyn Settings,
    ) -> Result<String, FilterError> {
        let default_charset = settings.default_charset();
        let encoding = Charset::parse(
            "encoding",
            str_option(NAME, options, "encoding")?.unwrap_or(default_charset.as_str()),
        )?;
        let output = Charset::parse(
            "output",
            str_option(NAME, options, "output")?.unwrap_or(default_charset.as_str()),
        )?;
        warn_unknown_options(NAME, options, KNOWN_OPTIONS);

        if let Some(ch) = text.chars().find(|ch| !encoding.can_represent(*ch)) {
            return Err(FilterError::render(
                NAME,
                format!(
                    "input contains {ch:?} (U+{:04X}) which is not valid {}",
                    ch as u32,
                    encoding.label()
                ),
            ));
        }

        let blocks = parser::parse_textile(text);
        let html = render_blocks(NAME, &blocks, SectionStyle::Div)?;
        Ok(output.encode(&html))
    }
}

/// Charsets understood by the textile filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Latin1,
    Ascii,
}

impl Charset {
    fn parse(option: &str, label: &str) -> Result<Self, FilterError> {
        let normalized = label.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "utf-8" | "utf8" => Ok(Charset::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" | "l1" => Ok(Charset::Latin1),
            "ascii" | "us-ascii" => Ok(Charset::Ascii),
            _ => Err(FilterError::invalid_option(
                NAME,
                option,
                format!("unsupported charset '{label}'"),
            )),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Charset::Utf8 => "utf-8",
            Charset::Latin1 => "latin-1",
            Charset::Ascii => "ascii",
        }
    }

    fn can_represent(self, ch: char) -> bool {
        match self {
            Charset::Utf8 => true,
            Charset::Latin1 => (ch as u32) <= 0xFF,
            Charset::Ascii => ch.is_ascii(),
        }
    }

    /// Replace characters this charset cannot hold with character references
    fn encode(self, html: &str) -> String {
        if self == Charset::Utf8 {
            return html.to_string();
        }
        let mut out = String::with_capacity(html.len());
        for ch in html.chars() {
            if self.can_represent(ch) {
                out.push(ch);
            } else {
                let _ = write!(out, "&#{};", ch as u32);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::StaticSettings;
    use serde_json::json;

    fn render_with(text: &str, settings: &StaticSettings, pairs: &[(&str, &str)]) -> Result<String, FilterError> {
        let options: FilterOptions = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect();
        TextileFilter.render(text, &options, settings)
    }

    #[test]
    fn renders_basic_document() {
        let html = render_with(
            "h1. Title\n\nSome *strong* text.",
            &StaticSettings::default(),
            &[],
        )
        .unwrap();
        assert_eq!(
            html,
            "<h1>Title</h1>\n<p>Some <strong>strong</strong> text.</p>\n"
        );
    }

    #[test]
    fn output_charset_uses_character_references() {
        let html = render_with("café ☕", &StaticSettings::default(), &[("output", "ascii")]).unwrap();
        assert_eq!(html, "<p>caf&#233; &#9749;</p>\n");

        let html = render_with("café ☕", &StaticSettings::default(), &[("output", "latin-1")]).unwrap();
        assert_eq!(html, "<p>café &#9749;</p>\n");
    }

    #[test]
    fn charset_defaults_come_from_settings() {
        let settings = StaticSettings::default().with_default_charset("latin-1");
        let html = render_with("é ☕", &settings, &[("encoding", "utf-8")]).unwrap();
        assert_eq!(html, "<p>é &#9749;</p>\n");

        // The input encoding also defaults to latin-1 here
        assert!(render_with("☕", &settings, &[]).is_err());
    }

    #[test]
    fn rejects_unknown_charset() {
        let err = render_with("x", &StaticSettings::default(), &[("output", "ebcdic")]).unwrap_err();
        assert!(matches!(err, FilterError::InvalidOption { ref option, .. } if option == "output"));
    }
}
