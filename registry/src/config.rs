//! Registry configuration.
//!
//! The registry reads a single option when it is constructed:
//! `FILTER_BY_DEFAULT`. The value `"false"` turns filtering and sorting off
//! for field-registered columns by default; any other value, or no value at
//! all, turns them on. Later changes to the source have no effect on an
//! existing registry.
//!
//! # Example YAML
//!
//! ```yaml
//! filter_by_default: "false"
//! ```

use std::collections::HashMap;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use schema_registry_core::DecoratorDefaults;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

/// Configuration key for the filter/sort default.
pub const FILTER_BY_DEFAULT: &str = "FILTER_BY_DEFAULT";

/// Provider of raw string configuration values.
pub trait ConfigSource {
    /// Returns the value for `key`, or `None` if unset.
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads configuration from process environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfig;

impl ConfigSource for EnvConfig {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Options resolved once at registry construction.
///
/// # Examples
///
/// ```
/// use schema_registry::RegistryConfig;
///
/// assert!(!RegistryConfig::from_flag(Some("false")).filter_by_default);
/// assert!(RegistryConfig::from_flag(Some("FALSE")).filter_by_default);
/// assert!(RegistryConfig::from_flag(Some("0")).filter_by_default);
/// assert!(RegistryConfig::from_flag(None).filter_by_default);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Whether field-registered columns are filterable and sortable unless
    /// they opt out.
    #[serde(default = "default_filter_by_default", deserialize_with = "flag_value")]
    pub filter_by_default: bool,
}

fn default_filter_by_default() -> bool {
    true
}

/// Accepts either a YAML boolean or the raw string flag.
fn flag_value<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Text(text) => flag_enabled(Some(&text)),
    })
}

fn flag_enabled(value: Option<&str>) -> bool {
    value != Some("false")
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            filter_by_default: default_filter_by_default(),
        }
    }
}

impl RegistryConfig {
    /// Interprets the raw flag value. Only the exact string `"false"` opts out.
    pub fn from_flag(value: Option<&str>) -> Self {
        Self {
            filter_by_default: flag_enabled(value),
        }
    }

    /// Reads the flag from any [`ConfigSource`].
    pub fn from_source(source: &impl ConfigSource) -> Self {
        Self::from_flag(source.get(FILTER_BY_DEFAULT).as_deref())
    }

    /// Reads the flag from the `FILTER_BY_DEFAULT` environment variable.
    pub fn from_env() -> Self {
        Self::from_source(&EnvConfig)
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RegistryError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::RegistryError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Decorator defaults derived from this configuration.
    pub fn decorator_defaults(&self) -> DecoratorDefaults {
        DecoratorDefaults::new(self.filter_by_default)
    }
}
