//! Shared configuration loader for the docsum tools.
//!
//! `defaults/docsum.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`DocsumConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use docsum::{HandlerError, SummarizerOptions, TileHandlers};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/docsum.default.toml");

/// Top-level configuration consumed by docsum applications.
#[derive(Debug, Clone, Deserialize)]
pub struct DocsumConfig {
    pub summary: SummaryConfig,
    pub logging: LoggingConfig,
}

/// Mirrors the knobs exposed by [`SummarizerOptions`].
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryConfig {
    pub include_model: bool,
    pub minimal: bool,
    pub drawing_svg: bool,
    pub handlers: Vec<String>,
}

impl SummaryConfig {
    /// Build summarizer options, resolving handler names into a chain.
    pub fn to_options(&self) -> Result<SummarizerOptions, HandlerError> {
        let mut handlers = TileHandlers::from_names(&self.handlers)?;
        if self.drawing_svg {
            handlers = handlers.with_drawing_svg();
        }
        Ok(SummarizerOptions {
            include_model: self.include_model,
            minimal: self.minimal,
            tile_handlers: Some(handlers),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// A `tracing` filter directive, e.g. `warn` or `docsum=debug`
    pub level: String,
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
    pub fn build(self) -> Result<DocsumConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<DocsumConfig, ConfigError> {
    Loader::new().build()
}
