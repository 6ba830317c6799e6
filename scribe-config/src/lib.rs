//! Shared configuration loader for the scribe toolchain.
//!
//! `defaults/scribe.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`ScribeConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use scribe_babel::{FormatRegistry, ParseOptions};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/scribe.default.toml");

/// Top-level configuration consumed by scribe applications.
#[derive(Debug, Clone, Deserialize)]
pub struct ScribeConfig {
    pub render: RenderConfig,
    pub detect: DetectConfig,
    pub logging: LoggingConfig,
}

/// Options forwarded to every parse.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    pub light_mode: bool,
    pub line_numbers: bool,
    pub highlighting: bool,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectConfig {
    pub sniff_lines: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ScribeConfig {
    /// Parse options for `filename` carrying the render settings
    pub fn parse_options(&self, filename: Option<&str>) -> ParseOptions {
        let mut options = ParseOptions::new()
            .with_line_numbers(self.render.line_numbers)
            .with_highlighting(self.render.highlighting);
        if let Some(filename) = filename {
            options = options.with_filename(filename);
        }
        if !self.render.base_url.is_empty() {
            options = options.with_base_url(self.render.base_url.clone());
        }
        options
    }

    /// Built-in registry honoring the detection settings
    pub fn registry(&self) -> FormatRegistry {
        FormatRegistry::with_defaults().with_sniff_lines(self.detect.sniff_lines)
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

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<ScribeConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<ScribeConfig, ConfigError> {
    Loader::new().build()
}
