//! Markup registry for filter lookup and dispatch
//!
//! The registry maps filter names to [`MarkupFilter`] implementations and
//! resolves which one to run for a given call: an explicit choice from the
//! caller, or the default selection read from [`Settings`] at call time.

use crate::error::{FilterError, MarkupError};
use crate::filter::{FnFilter, MarkupFilter};
use crate::options::{merge_options, FilterOptions};
use crate::settings::Settings;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// How the filter for a call is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChoice<'a> {
    /// Use the default selection from settings, merging its options
    Configured,
    /// Use this filter; configured options are ignored
    Named(&'a str),
    /// Explicitly apply no transformation
    Passthrough,
}

impl<'a> From<Option<&'a str>> for FilterChoice<'a> {
    /// An explicit optional name: `None` is the pass-through marker.
    fn from(name: Option<&'a str>) -> Self {
        match name {
            Some(name) => FilterChoice::Named(name),
            None => FilterChoice::Passthrough,
        }
    }
}

/// Registry of markup filters
///
/// Built once by the application and passed to whatever needs to render
/// markup. Registering requires `&mut self`, so sharing a registry across
/// threads while still registering needs an outer lock; `apply` only reads.
///
/// # Examples
///
/// ```ignore
/// let settings = Arc::new(StaticSettings::new(DefaultSelection::new("markdown", FilterOptions::new())));
/// let registry = MarkupRegistry::with_defaults(settings);
///
/// let html = registry.apply_default("**bold**")?;
/// let html = registry.apply("line one\nline two", FilterChoice::Named("linebreaks"), &FilterOptions::new())?;
/// ```
pub struct MarkupRegistry {
    filters: HashMap<String, Box<dyn MarkupFilter>>,
    settings: Arc<dyn Settings>,
}

impl MarkupRegistry {
    /// Create an empty registry reading defaults from `settings`
    pub fn new(settings: Arc<dyn Settings>) -> Self {
        MarkupRegistry {
            filters: HashMap::new(),
            settings,
        }
    }

    /// Create a registry with the built-in filters
    pub fn with_defaults(settings: Arc<dyn Settings>) -> Self {
        let mut registry = Self::new(settings);

        registry.register("markdown", crate::filters::markdown::MarkdownFilter);
        registry.register("textile", crate::filters::textile::TextileFilter);
        registry.register(
            "restructuredtext",
            crate::filters::restructuredtext::RestructuredTextFilter,
        );
        registry.register("linebreaks", crate::filters::linebreaks::LinebreaksFilter);

        registry
    }

    /// Register a filter under `name`
    ///
    /// If a filter with the same name already exists, it will be replaced.
    pub fn register<F: MarkupFilter + 'static>(&mut self, name: impl Into<String>, filter: F) {
        let name = name.into();
        trace!(filter = %name, "registering markup filter");
        self.filters.insert(name, Box::new(filter));
    }

    /// Register a closure under `name`
    pub fn register_fn<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(&str, &FilterOptions) -> Result<String, FilterError> + Send + Sync + 'static,
    {
        self.register(name, FnFilter::new(func));
    }

    /// Get a filter by name
    pub fn get(&self, name: &str) -> Result<&dyn MarkupFilter, MarkupError> {
        self.filters
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| self.unknown_filter(name))
    }

    /// Check if a filter exists
    pub fn has(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// List all registered filter names (sorted)
    pub fn list_filters(&self) -> Vec<String> {
        let mut names: Vec<_> = self.filters.keys().cloned().collect();
        names.sort();
        names
    }

    /// The settings this registry reads defaults from
    pub fn settings(&self) -> &dyn Settings {
        self.settings.as_ref()
    }

    /// Apply a filter to `text`
    ///
    /// With [`FilterChoice::Configured`] the default selection is read from
    /// settings on this call and its options are merged under `options`.
    /// An absent filter name (configured or explicit) returns `text` as-is.
    pub fn apply(
        &self,
        text: &str,
        choice: FilterChoice<'_>,
        options: &FilterOptions,
    ) -> Result<String, MarkupError> {
        let (name, options) = match choice {
            FilterChoice::Passthrough => {
                debug!("explicit pass-through, leaving text unchanged");
                return Ok(text.to_string());
            }
            FilterChoice::Named(name) => {
                debug!(filter = name, "applying explicitly named filter");
                (name.to_string(), options.clone())
            }
            FilterChoice::Configured => {
                let selection = self.settings.markup_filter()?;
                match selection.name {
                    None => {
                        debug!("no default filter configured, leaving text unchanged");
                        return Ok(text.to_string());
                    }
                    Some(name) => {
                        debug!(filter = %name, "applying configured default filter");
                        (name, merge_options(&selection.options, options))
                    }
                }
            }
        };

        let filter = self.get(&name)?;
        Ok(filter.render(text, &options, self.settings.as_ref())?)
    }

    /// Apply the configured default filter with no extra options
    pub fn apply_default(&self, text: &str) -> Result<String, MarkupError> {
        self.apply(text, FilterChoice::Configured, &FilterOptions::new())
    }

    /// Apply the named filter with no options
    pub fn apply_named(&self, text: &str, name: &str) -> Result<String, MarkupError> {
        self.apply(text, FilterChoice::Named(name), &FilterOptions::new())
    }

    fn unknown_filter(&self, name: &str) -> MarkupError {
        MarkupError::UnknownFilter {
            name: name.to_string(),
            available: self.list_filters(),
        }
    }
}
