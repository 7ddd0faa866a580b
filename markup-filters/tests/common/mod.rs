//! Shared helpers for integration tests

use markup_filters::{DefaultSelection, FilterOptions, MarkupRegistry, StaticSettings};
use serde_json::Value;
use std::sync::Arc;

/// Build an option map from a JSON object literal
pub fn options(value: Value) -> FilterOptions {
    match value {
        Value::Object(map) => map.into_iter().collect(),
        other => panic!("options must be a JSON object, got {other}"),
    }
}

/// Registry with the built-in filters and a configured default
pub fn registry_with_default(name: &str, opts: Value) -> MarkupRegistry {
    let selection = DefaultSelection::new(name, options(opts));
    MarkupRegistry::with_defaults(Arc::new(StaticSettings::new(selection)))
}

/// Registry with the built-in filters and no configured default
pub fn passthrough_registry() -> MarkupRegistry {
    MarkupRegistry::with_defaults(Arc::new(StaticSettings::passthrough()))
}
