//! reStructuredText through the registry

use crate::common::{options, passthrough_registry, registry_with_default};
use insta::assert_snapshot;
use markup_filters::FilterChoice;
use serde_json::json;
use std::time::{Duration, Instant};

const GUIDE: &str = "\
Guide
=====

Intro paragraph with ``code``.

Install
-------

- download
- run ``setup``

Usage
-----

Run::

    markup apply notes.rst
";

#[test]
fn test_guide_html4() {
    let registry = passthrough_registry();
    let html = registry.apply_named(GUIDE, "restructuredtext").unwrap();

    assert_snapshot!(html.trim_end(), @r#"
    <p>Intro paragraph with <code>code</code>.</p>
    <div class="section" id="install"><h1>Install</h1><ul><li>download</li><li>run <code>setup</code></li></ul></div>
    <div class="section" id="usage"><h1>Usage</h1><p>Run:</p><pre><code>markup apply notes.rst</code></pre></div>
    "#);
}

#[test]
fn test_guide_html5_without_doctitle() {
    let registry = passthrough_registry();
    let html = registry
        .apply(
            GUIDE,
            FilterChoice::Named("restructuredtext"),
            &options(json!({
                "writer_name": "html5",
                "settings_overrides": {"doctitle_xform": false, "initial_header_level": 2}
            })),
        )
        .unwrap();

    assert!(html.starts_with("<section id=\"guide\"><h2>Guide</h2>"));
    assert!(html.contains("<section id=\"install\"><h3>Install</h3>"));
    assert!(!html.contains("class=\"section\""));
}

#[test]
fn test_configured_overrides_apply_to_default() {
    let registry = registry_with_default(
        "restructuredtext",
        json!({"settings_overrides": {"initial_header_level": 3}}),
    );
    let html = registry.apply_default(GUIDE).unwrap();
    assert!(html.contains("<h3>Install</h3>"));
}

#[test]
fn test_unclosed_delimiters_render_in_bounded_time() {
    let registry = passthrough_registry();
    let source = "*a `b ".repeat(10_000);

    let started = Instant::now();
    let html = registry.apply_named(&source, "restructuredtext").unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(html, format!("<p>{}</p>\n", source.trim_end()));
}
