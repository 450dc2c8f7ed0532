//! Shared configuration loader for markup conversion.
//!
//! `defaults/markup.default.toml` is embedded so that documented defaults and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`MarkupConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use markup_babel::{
    AdfFormat, FormatRegistry, StorageFormat, StorageOptions, WikiFormat, WikiOptions,
};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/markup.default.toml");

/// Top-level configuration consumed by markup-converting applications.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkupConfig {
    pub site: SiteConfig,
    pub wiki: WikiConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub base_url: String,
}

/// Wiki markup conversion knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct WikiConfig {
    pub translate: bool,
}

/// Storage format conversion knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub heading_anchors: bool,
}

impl MarkupConfig {
    /// Wiki options for this site.
    pub fn wiki_options(&self) -> WikiOptions {
        WikiOptions {
            translate: self.wiki.translate,
            base_url: self.site.base_url.clone(),
        }
    }

    pub fn storage_options(&self) -> StorageOptions {
        StorageOptions::from(&self.storage)
    }

    /// A registry whose formats carry this configuration.
    pub fn registry(&self) -> FormatRegistry {
        let mut registry = FormatRegistry::new();
        registry.register(AdfFormat);
        registry.register(WikiFormat::new(self.wiki_options()));
        registry.register(StorageFormat::new(
            self.storage_options(),
            self.site.base_url.clone(),
        ));
        registry
    }
}

impl From<&StorageConfig> for StorageOptions {
    fn from(config: &StorageConfig) -> Self {
        StorageOptions {
            heading_anchors: config.heading_anchors,
        }
    }
}

impl From<StorageConfig> for StorageOptions {
    fn from(config: StorageConfig) -> Self {
        StorageOptions::from(&config)
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

    /// Apply a single key/value override.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<MarkupConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
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
