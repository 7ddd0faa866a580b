//! Settings capability
//!
//! The registry never reads global state. Instead it holds a [`Settings`]
//! implementation and asks it for the default selection on every call, so
//! a provider backed by files or a mutable store sees changes immediately.

use crate::error::SettingsError;
use crate::options::FilterOptions;
use serde::Deserialize;
use std::sync::RwLock;

/// Character encoding assumed when nothing else is configured
pub const DEFAULT_CHARSET: &str = "utf-8";

/// The configured default filter and its options.
///
/// A `None` name means "apply no transformation".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DefaultSelection {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub options: FilterOptions,
}

impl DefaultSelection {
    pub fn new(name: impl Into<String>, options: FilterOptions) -> Self {
        Self {
            name: Some(name.into()),
            options,
        }
    }

    /// A selection that leaves text untouched
    pub fn passthrough() -> Self {
        Self::default()
    }
}

/// Read access to the settings markup filters depend on
pub trait Settings: Send + Sync {
    /// The default filter selection
    fn markup_filter(&self) -> Result<DefaultSelection, SettingsError>;

    /// Charset used by filters that need one (textile)
    fn default_charset(&self) -> String {
        DEFAULT_CHARSET.to_string()
    }

    /// Default `settings_overrides` for the reStructuredText filter
    fn restructuredtext_settings(&self) -> FilterOptions {
        FilterOptions::new()
    }
}

#[derive(Debug, Clone)]
struct StaticState {
    selection: DefaultSelection,
    charset: String,
    restructuredtext: FilterOptions,
}

/// In-memory settings that can be changed while in use
///
/// Every accessor takes a fresh read of the current values, so a registry
/// holding a `StaticSettings` observes updates made through the setters.
#[derive(Debug)]
pub struct StaticSettings {
    state: RwLock<StaticState>,
}

impl StaticSettings {
    pub fn new(selection: DefaultSelection) -> Self {
        Self {
            state: RwLock::new(StaticState {
                selection,
                charset: DEFAULT_CHARSET.to_string(),
                restructuredtext: FilterOptions::new(),
            }),
        }
    }

    /// Settings that select no filter
    pub fn passthrough() -> Self {
        Self::new(DefaultSelection::passthrough())
    }

    pub fn with_default_charset(self, charset: impl Into<String>) -> Self {
        self.set_default_charset(charset);
        self
    }

    pub fn with_restructuredtext_settings(self, overrides: FilterOptions) -> Self {
        self.set_restructuredtext_settings(overrides);
        self
    }

    pub fn set_markup_filter(&self, selection: DefaultSelection) {
        self.write(|state| state.selection = selection);
    }

    pub fn set_default_charset(&self, charset: impl Into<String>) {
        let charset = charset.into();
        self.write(|state| state.charset = charset);
    }

    pub fn set_restructuredtext_settings(&self, overrides: FilterOptions) {
        self.write(|state| state.restructuredtext = overrides);
    }

    fn write(&self, update: impl FnOnce(&mut StaticState)) {
        let mut guard = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        update(&mut guard);
    }

    fn read(&self) -> StaticState {
        match self.state.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for StaticSettings {
    fn default() -> Self {
        Self::passthrough()
    }
}

impl Settings for StaticSettings {
    fn markup_filter(&self) -> Result<DefaultSelection, SettingsError> {
        Ok(self.read().selection)
    }

    fn default_charset(&self) -> String {
        self.read().charset
    }

    fn restructuredtext_settings(&self) -> FilterOptions {
        self.read().restructuredtext
    }
}
