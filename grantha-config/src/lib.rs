//! Shared configuration loader for the grantha conversion tools.
//!
//! `defaults/grantha.default.toml` is embedded so that documented defaults and runtime
//! behavior stay in sync. Applications layer user-specific files on top of those defaults
//! via [`Loader`] before deserializing into [`GranthaConfig`], then turn each section into
//! the option struct the library expects.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use grantha_babel::{JsonOptions, MarkdownOptions, ValidatorOptions};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/grantha.default.toml");

/// Top-level configuration consumed by grantha applications.
#[derive(Debug, Clone, Deserialize)]
pub struct GranthaConfig {
    pub markdown: MarkdownConfig,
    pub json: JsonConfig,
    pub validator: ValidatorConfig,
}

/// Mirrors [`MarkdownOptions`].
#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownConfig {
    pub script_tag_prefix: String,
    pub default_script: String,
    pub script_order: Vec<String>,
    pub include_validation_hash: bool,
    pub verify_validation_hash: bool,
}

impl From<MarkdownConfig> for MarkdownOptions {
    fn from(config: MarkdownConfig) -> Self {
        MarkdownOptions {
            script_tag_prefix: config.script_tag_prefix,
            default_script: config.default_script,
            script_order: config.script_order,
            include_validation_hash: config.include_validation_hash,
            verify_validation_hash: config.verify_validation_hash,
        }
    }
}

impl From<&MarkdownConfig> for MarkdownOptions {
    fn from(config: &MarkdownConfig) -> Self {
        config.clone().into()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonConfig {
    pub pretty: bool,
    pub trailing_newline: bool,
}

impl From<&JsonConfig> for JsonOptions {
    fn from(config: &JsonConfig) -> Self {
        JsonOptions {
            pretty: config.pretty,
            trailing_newline: config.trailing_newline,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidatorConfig {
    pub no_diff: bool,
    pub tolerance: usize,
}

impl From<&ValidatorConfig> for ValidatorOptions {
    fn from(config: &ValidatorConfig) -> Self {
        ValidatorOptions {
            no_diff: config.no_diff,
            tolerance: config.tolerance,
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

    /// Apply a single key/value override, e.g. `validator.tolerance`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<GranthaConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<GranthaConfig, ConfigError> {
    Loader::new().build()
}
