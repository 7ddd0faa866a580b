//! Textile through the registry

use crate::common::{options, passthrough_registry};
use insta::assert_snapshot;
use markup_filters::{FilterChoice, FilterError, MarkupError};
use serde_json::json;
use std::time::{Duration, Instant};

#[test]
fn test_document_snapshot() {
    let registry = passthrough_registry();
    let source = "h2. Notes\n\n* one\n** nested\n* two\n\nbq. Quoted _text_.\n\nSee \"the site\":https://example.com.";
    let html = registry.apply_named(source, "textile").unwrap();

    assert_snapshot!(html.trim_end(), @r#"
    <h2>Notes</h2>
    <ul><li>one<ul><li>nested</li></ul></li><li>two</li></ul>
    <blockquote><p>Quoted <em>text</em>.</p></blockquote>
    <p>See <a href="https://example.com">the site</a>.</p>
    "#);
}

#[test]
fn test_input_outside_declared_encoding_fails() {
    let registry = passthrough_registry();
    let err = registry
        .apply(
            "naïve",
            FilterChoice::Named("textile"),
            &options(json!({"encoding": "ascii"})),
        )
        .unwrap_err();
    assert!(matches!(err, MarkupError::Filter(FilterError::Render { .. })));
}

#[test]
fn test_list_items_survive_depth_and_marker_changes() {
    let registry = passthrough_registry();

    let html = registry.apply_named("** deep\n* top", "textile").unwrap();
    assert_eq!(html, "<ul><li><ul><li>deep</li></ul></li><li>top</li></ul>\n");

    let html = registry.apply_named("* a\n# b", "textile").unwrap();
    assert_eq!(html, "<ul><li>a</li></ul>\n<ol><li>b</li></ol>\n");
}

#[test]
fn test_unclosed_delimiters_render_in_bounded_time() {
    let registry = passthrough_registry();
    let source = "*a ".repeat(20_000);

    let started = Instant::now();
    let html = registry.apply_named(&source, "textile").unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(html, format!("<p>{}</p>\n", source.trim_end()));
}
