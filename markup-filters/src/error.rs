//! Error types for markup filtering

use thiserror::Error;

/// Errors returned by [`MarkupRegistry::apply`](crate::MarkupRegistry::apply)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarkupError {
    /// The resolved filter name has no registered filter
    #[error(
        "'{name}' is not a registered markup filter. Registered filters are: {}.",
        .available.join(", ")
    )]
    UnknownFilter {
        name: String,
        available: Vec<String>,
    },

    /// The configured default selection could not be read
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The filter itself failed
    #[error(transparent)]
    Filter(#[from] FilterError),
}

/// Errors raised by a filter while rendering text
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// An option had a value the filter cannot use
    #[error("{filter}: invalid value for option '{option}': {reason}")]
    InvalidOption {
        filter: String,
        option: String,
        reason: String,
    },

    /// The conversion library or renderer failed
    #[error("{filter}: {message}")]
    Render { filter: String, message: String },
}

impl FilterError {
    pub fn invalid_option(
        filter: impl Into<String>,
        option: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        FilterError::InvalidOption {
            filter: filter.into(),
            option: option.into(),
            reason: reason.into(),
        }
    }

    pub fn render(filter: impl Into<String>, message: impl Into<String>) -> Self {
        FilterError::Render {
            filter: filter.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while reading settings
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// The setting exists but does not have the expected shape
    #[error("malformed setting: {0}")]
    Malformed(String),

    /// The settings sources could not be loaded
    #[error("failed to load settings: {0}")]
    Load(String),

    /// A setting that was asked for by name is not defined
    #[error("setting '{0}' is not defined")]
    Missing(String),
}

/// Errors raised by the comparison helpers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComparisonError {
    #[error("unknown comparison '{0}'; expected less, less_or_equal, greater_or_equal or greater")]
    UnknownComparison(String),

    #[error("cannot compare {left} with {right}")]
    Incomparable { left: String, right: String },

    #[error("comparison tag takes two arguments, got {0}")]
    ArgumentCount(usize),
}
