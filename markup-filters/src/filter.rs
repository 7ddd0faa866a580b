//! Filter trait definition
//!
//! A filter turns a piece of text into HTML (or any other text). Filters are
//! stateless: everything a call needs arrives through the text, the options
//! and the settings handle.

use crate::error::FilterError;
use crate::options::FilterOptions;
use crate::settings::Settings;

/// A named text transformation
///
/// # Examples
///
/// ```ignore
/// struct Shout;
///
/// impl MarkupFilter for Shout {
///     fn description(&self) -> &str {
///         "Upper-cases everything"
///     }
///
///     fn render(
///         &self,
///         text: &str,
///         _options: &FilterOptions,
///         _settings: &dyn Settings,
///     ) -> Result<String, FilterError> {
///         Ok(text.to_uppercase())
///     }
/// }
/// ```
pub trait MarkupFilter: Send + Sync {
    /// Optional description of this filter
    fn description(&self) -> &str {
        ""
    }

    /// Transform `text` using `options`.
    ///
    /// `settings` gives access to process-wide defaults such as the default
    /// charset; filters that need none can ignore it.
    fn render(
        &self,
        text: &str,
        options: &FilterOptions,
        settings: &dyn Settings,
    ) -> Result<String, FilterError>;
}

/// Adapts a closure into a [`MarkupFilter`]
pub struct FnFilter<F> {
    func: F,
    description: String,
}

impl<F> FnFilter<F>
where
    F: Fn(&str, &FilterOptions) -> Result<String, FilterError> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self {
            func,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl<F> MarkupFilter for FnFilter<F>
where
    F: Fn(&str, &FilterOptions) -> Result<String, FilterError> + Send + Sync,
{
    fn description(&self) -> &str {
        &self.description
    }

    fn render(
        &self,
        text: &str,
        options: &FilterOptions,
        _settings: &dyn Settings,
    ) -> Result<String, FilterError> {
        (self.func)(text, options)
    }
}
