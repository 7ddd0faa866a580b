//! Linebreaks filter
//!
//! Wraps blank-line separated paragraphs in `<p>` and turns the remaining
//! single newlines into `<br />`. No markup language is involved.

use crate::error::FilterError;
use crate::filter::MarkupFilter;
use crate::filters::common::html::escape_text;
use crate::options::{bool_option, warn_unknown_options, FilterOptions};
use crate::settings::Settings;
use once_cell::sync::Lazy;
use regex::Regex;

const NAME: &str = "linebreaks";
const KNOWN_OPTIONS: &[&str] = &["autoescape"];

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());

/// Filter implementation for plain-text line breaks
pub struct LinebreaksFilter;

impl MarkupFilter for LinebreaksFilter {
    fn description(&self) -> &str {
        "Paragraphs and <br /> from plain newlines"
    }

    fn render(
        &self,
        text: &str,
        options: &FilterOptions,
        _settings: &dyn Settings,
    ) -> Result<String, FilterError> {
        let autoescape = bool_option(NAME, options, "autoescape")?.unwrap_or(false);
        warn_unknown_options(NAME, options, KNOWN_OPTIONS);
        linebreaks(text, autoescape)
    }
}

/// Convert newlines into paragraphs and line breaks
///
/// With `autoescape` the text is escaped by the HTML serializer first.
pub fn linebreaks(text: &str, autoescape: bool) -> Result<String, FilterError> {
    let mut normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    if autoescape {
        normalized = escape_text(NAME, &normalized)?;
    }
    let paragraphs: Vec<String> = PARAGRAPH_BREAK
        .split(&normalized)
        .map(|para| format!("<p>{}</p>", para.replace('\n', "<br />")))
        .collect();
    Ok(paragraphs.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_newline_becomes_br() {
        assert_eq!(
            linebreaks("line one\nline two", false).unwrap(),
            "<p>line one<br />line two</p>"
        );
    }

    #[test]
    fn blank_lines_split_paragraphs() {
        assert_eq!(
            linebreaks("first\n\n\nsecond\nthird", false).unwrap(),
            "<p>first</p>\n\n<p>second<br />third</p>"
        );
    }

    #[test]
    fn carriage_returns_are_normalized() {
        assert_eq!(linebreaks("a\r\nb\r\rc", false).unwrap(), "<p>a<br />b</p>\n\n<p>c</p>");
    }

    #[test]
    fn autoescape_escapes_markup() {
        assert_eq!(
            linebreaks("<b>x</b> & y", true).unwrap(),
            "<p>&lt;b&gt;x&lt;/b&gt; &amp; y</p>"
        );
        assert_eq!(linebreaks("<b>x</b>", false).unwrap(), "<p><b>x</b></p>");
    }

    #[test]
    fn escaped_text_keeps_paragraph_structure() {
        assert_eq!(
            linebreaks("a < b\n\nc & d\ne", true).unwrap(),
            "<p>a &lt; b</p>\n\n<p>c &amp; d<br />e</p>"
        );
    }
}
