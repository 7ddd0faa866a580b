//! Layered configuration for markup filtering.
//!
//! `defaults/markup.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before building a [`MarkupConfig`].
//!
//! [`MarkupConfig`] is a snapshot: it implements [`Settings`] for the values it
//! was built with. [`LiveSettings`] rebuilds from the loader on every call, so
//! edits to the layered files show up on the next render without a restart.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat};
use markup_filters::settings::DEFAULT_CHARSET;
use markup_filters::{DefaultSelection, FilterOptions, Settings, SettingsError};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, warn};

pub use config::{ConfigError, ValueKind};

const DEFAULT_TOML: &str = include_str!("../defaults/markup.default.toml");

/// Name of the optional per-project configuration file.
pub const PROJECT_CONFIG_FILE: &str = "markup.toml";

/// Configuration consumed by markup applications.
///
/// Keeps the merged source tree around so that settings can be looked up by
/// dotted key, and so that `markup_filter` is only validated when it is read.
#[derive(Debug, Clone)]
pub struct MarkupConfig {
    pub default_charset: String,
    pub media: MediaConfig,
    raw: Config,
}

/// Where static media is served from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MediaConfig {
    pub url: String,
    pub admin_prefix: String,
}

impl MarkupConfig {
    fn from_raw(raw: Config) -> Result<Self, ConfigError> {
        let default_charset = raw.get_string("default_charset")?;
        let media = raw.get::<MediaConfig>("media")?;
        Ok(Self {
            default_charset,
            media,
            raw,
        })
    }

    /// Look up any setting by dotted key (`media.url`, `markup_filter.name`).
    pub fn get_value(&self, key: &str) -> Result<Value, SettingsError> {
        match self.raw.get::<Value>(key) {
            Ok(value) => Ok(value),
            Err(ConfigError::NotFound(_)) => Err(SettingsError::Missing(key.to_string())),
            Err(err) => Err(SettingsError::Malformed(format!("{key}: {err}"))),
        }
    }
}

impl Settings for MarkupConfig {
    fn markup_filter(&self) -> Result<DefaultSelection, SettingsError> {
        match self.raw.get::<DefaultSelection>("markup_filter") {
            Ok(selection) => Ok(selection),
            Err(ConfigError::NotFound(_)) => Ok(DefaultSelection::passthrough()),
            Err(err) => Err(SettingsError::Malformed(format!(
                "markup_filter must be a table with an optional `name` and an `options` table: {err}"
            ))),
        }
    }

    fn default_charset(&self) -> String {
        self.default_charset.clone()
    }

    fn restructuredtext_settings(&self) -> FilterOptions {
        match self.raw.get::<FilterOptions>("restructuredtext") {
            Ok(overrides) => overrides,
            Err(ConfigError::NotFound(_)) => FilterOptions::new(),
            Err(err) => {
                warn!(error = %err, "ignoring malformed [restructuredtext] settings");
                FilterOptions::new()
            }
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder. Files are read here, not when they are layered.
    pub fn build(self) -> Result<MarkupConfig, ConfigError> {
        MarkupConfig::from_raw(self.builder.build()?)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<MarkupConfig, ConfigError> {
    Loader::new().build()
}

/// Settings that re-read every configuration source on each call.
#[derive(Debug, Clone)]
pub struct LiveSettings {
    loader: Loader,
}

impl LiveSettings {
    pub fn new(loader: Loader) -> Self {
        Self { loader }
    }

    fn current(&self) -> Result<MarkupConfig, SettingsError> {
        debug!("reloading markup configuration");
        self.loader
            .clone()
            .build()
            .map_err(|err| SettingsError::Load(err.to_string()))
    }
}

impl Settings for LiveSettings {
    fn markup_filter(&self) -> Result<DefaultSelection, SettingsError> {
        self.current()?.markup_filter()
    }

    fn default_charset(&self) -> String {
        match self.current() {
            Ok(config) => config.default_charset,
            Err(err) => {
                warn!(error = %err, "falling back to the default charset");
                DEFAULT_CHARSET.to_string()
            }
        }
    }

    fn restructuredtext_settings(&self) -> FilterOptions {
        match self.current() {
            Ok(config) => config.restructuredtext_settings(),
            Err(err) => {
                warn!(error = %err, "using empty reStructuredText settings");
                FilterOptions::new()
            }
        }
    }
}

/// Template context entries for media locations.
pub fn media_context(config: &MarkupConfig) -> Map<String, Value> {
    let mut context = Map::new();
    context.insert(
        "MEDIA_URL".to_string(),
        Value::String(config.media.url.clone()),
    );
    context.insert(
        "ADMIN_MEDIA_PREFIX".to_string(),
        Value::String(config.media.admin_prefix.clone()),
    );
    context
}

/// Exposes a fixed list of settings to templates.
///
/// The settings are read each time [`SettingsProcessor::process`] runs, not
/// when the processor is created.
#[derive(Debug, Clone)]
pub struct SettingsProcessor {
    loader: Loader,
    names: Vec<String>,
}

impl SettingsProcessor {
    pub fn new<I, S>(loader: Loader, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            loader,
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Read every configured setting. A missing one is an error.
    pub fn process(&self) -> Result<Map<String, Value>, SettingsError> {
        let config = self
            .loader
            .clone()
            .build()
            .map_err(|err| SettingsError::Load(err.to_string()))?;

        self.names
            .iter()
            .map(|name| Ok((name.clone(), config.get_value(name)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markup_filters::{FilterChoice, MarkupRegistry};
    use serde_json::json;
    use std::fs;
    use std::sync::Arc;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.default_charset, "utf-8");
        assert_eq!(config.media.admin_prefix, "/media/");

        let selection = config.markup_filter().expect("selection to deserialize");
        assert_eq!(selection, DefaultSelection::passthrough());

        let rst = config.restructuredtext_settings();
        assert_eq!(rst.get("initial_header_level"), Some(&json!(1)));
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("markup_filter.name", "markdown")
            .expect("override to apply")
            .set_override("markup_filter.options.safe_mode", true)
            .expect("override to apply")
            .build()
            .expect("config to build");

        let selection = config.markup_filter().unwrap();
        assert_eq!(selection.name.as_deref(), Some("markdown"));
        assert_eq!(selection.options.get("safe_mode"), Some(&json!(true)));
    }

    #[test]
    fn malformed_selection_is_reported_on_read() {
        let config = Loader::new()
            .set_override("markup_filter", "markdown")
            .expect("override to apply")
            .build()
            .expect("a bad selection does not stop the build");

        assert!(matches!(
            config.markup_filter(),
            Err(SettingsError::Malformed(_))
        ));
    }

    #[test]
    fn layers_files_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markup.toml");
        fs::write(
            &path,
            "default_charset = \"latin-1\"\n[markup_filter]\nname = \"textile\"\n",
        )
        .unwrap();

        let config = Loader::new().with_file(&path).build().unwrap();
        assert_eq!(config.default_charset(), "latin-1");
        assert_eq!(
            config.markup_filter().unwrap().name.as_deref(),
            Some("textile")
        );
        // Untouched keys keep their defaults
        assert_eq!(config.media.admin_prefix, "/media/");
    }

    #[test]
    fn missing_required_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = Loader::new().with_file(dir.path().join("absent.toml")).build();
        assert!(result.is_err());

        let result = Loader::new()
            .with_optional_file(dir.path().join("absent.toml"))
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn live_settings_pick_up_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markup.toml");
        fs::write(&path, "").unwrap();

        let settings = Arc::new(LiveSettings::new(Loader::new().with_file(&path)));
        let registry = MarkupRegistry::with_defaults(settings);

        assert_eq!(registry.apply_default("a\nb").unwrap(), "a\nb");

        fs::write(&path, "[markup_filter]\nname = \"linebreaks\"\n").unwrap();
        assert_eq!(registry.apply_default("a\nb").unwrap(), "<p>a<br />b</p>");

        // Explicit choices are unaffected by the configured default
        assert_eq!(
            registry
                .apply("a\nb", FilterChoice::Passthrough, &FilterOptions::new())
                .unwrap(),
            "a\nb"
        );
    }

    #[test]
    fn live_settings_report_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let settings = LiveSettings::new(Loader::new().with_file(dir.path().join("gone.toml")));

        assert!(matches!(settings.markup_filter(), Err(SettingsError::Load(_))));
        assert_eq!(settings.default_charset(), DEFAULT_CHARSET);
    }

    #[test]
    fn media_context_exposes_both_locations() {
        let config = Loader::new()
            .set_override("media.url", "https://cdn.example.com/")
            .unwrap()
            .build()
            .unwrap();

        let context = media_context(&config);
        assert_eq!(context["MEDIA_URL"], json!("https://cdn.example.com/"));
        assert_eq!(context["ADMIN_MEDIA_PREFIX"], json!("/media/"));
    }

    #[test]
    fn settings_processor_reads_named_settings() {
        let processor = SettingsProcessor::new(
            Loader::new(),
            ["default_charset", "media.admin_prefix"],
        );
        let values = processor.process().unwrap();
        assert_eq!(values["default_charset"], json!("utf-8"));
        assert_eq!(values["media.admin_prefix"], json!("/media/"));
    }

    #[test]
    fn settings_processor_rejects_unknown_settings() {
        let processor = SettingsProcessor::new(Loader::new(), ["site_id"]);
        assert_eq!(
            processor.process(),
            Err(SettingsError::Missing("site_id".to_string()))
        );
    }
}
