//! Markdown through the registry

use crate::common::{options, passthrough_registry};
use insta::assert_snapshot;
use markup_filters::FilterChoice;
use serde_json::json;

#[test]
fn test_document_with_extensions() {
    let registry = passthrough_registry();
    let source = "# Title\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~ and https://example.com\n";

    let html = registry
        .apply(
            source,
            FilterChoice::Named("markdown"),
            &options(json!({"extensions": ["table", "strikethrough", "autolink"]})),
        )
        .unwrap();

    assert!(html.contains("<h1>Title</h1>"));
    assert!(html.contains("<table>"));
    assert!(html.contains("<del>gone</del>"));
    assert!(html.contains("<a href=\"https://example.com\">https://example.com</a>"));
}

#[test]
fn test_safe_mode_escape() {
    let registry = passthrough_registry();
    let html = registry
        .apply(
            "<script>alert(1)</script>\n",
            FilterChoice::Named("markdown"),
            &options(json!({"safe_mode": "escape"})),
        )
        .unwrap();
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<script>"));
}

#[test]
fn test_plain_document_snapshot() {
    let registry = passthrough_registry();
    let html = registry
        .apply_named("Intro *text*.\n\n- one\n- two\n", "markdown")
        .unwrap();
    assert_snapshot!(html.trim_end(), @r"
    <p>Intro <em>text</em>.</p>
    <ul>
    <li>one</li>
    <li>two</li>
    </ul>
    ");
}
