//! Shared configuration loader for the SLDS validator.
//!
//! `defaults/slds.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`SldsConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
pub use config::ConfigError;
use serde::Deserialize;
use slds_analysis::{Catalog, ComponentRegistry, Context, RuleTable, Runner};
use std::path::Path;
use std::sync::Arc;

const DEFAULT_TOML: &str = include_str!("../defaults/slds.default.toml");

/// Top-level configuration consumed by SLDS applications.
#[derive(Debug, Clone, Deserialize)]
pub struct SldsConfig {
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    pub disabled: Vec<String>,
    pub workers: usize,
}

impl AnalysisConfig {
    /// The analysis context these settings describe. Unknown flag names are ignored.
    pub fn context(&self) -> Context {
        Context::with_disabled(&self.disabled).with_workers(self.workers)
    }
}

/// Alternative data files. Unset entries fall back to the bundled data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    pub path: Option<String>,
    pub rules: Option<String>,
    pub registry: Option<String>,
}

impl CatalogConfig {
    pub fn runner(&self) -> slds_analysis::Result<Runner> {
        let catalog = match &self.path {
            Some(path) => Catalog::load(path)?,
            None => Catalog::bundled()?,
        };
        let rules = match &self.rules {
            Some(path) => RuleTable::load(path)?,
            None => RuleTable::bundled()?,
        };
        let registry = match &self.registry {
            Some(path) => ComponentRegistry::load(path)?,
            None => ComponentRegistry::bundled()?,
        };
        Runner::new(Arc::new(catalog), rules, registry)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    pub format: ReportFormat,
    pub show_related: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    Text,
    Json,
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
    pub fn build(self) -> Result<SldsConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<SldsConfig, ConfigError> {
    Loader::new().build()
}
