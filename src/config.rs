//! Configuration file support
//!
//! Handles parsing of `.odata-metadata.toml` configuration files and
//! environment variable overrides. Configuration is handed to the validator
//! and loader explicitly; nothing here is global.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::validation::ValidationOptions;
use crate::validation::input::MAX_METADATA_DOCUMENT_SIZE;

/// Default configuration filename
pub const CONFIG_FILENAME: &str = ".odata-metadata.toml";

/// Environment variable for fail-fast validation
pub const ENV_FAIL_FAST: &str = "ODATA_METADATA_FAIL_FAST";

/// Environment variable requiring V4 documents on load
pub const ENV_REQUIRE_V4: &str = "ODATA_METADATA_REQUIRE_V4";

/// Environment variable for the document size limit in bytes
pub const ENV_MAX_DOCUMENT_SIZE: &str = "ODATA_METADATA_MAX_DOCUMENT_SIZE";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Config error: {0}")]
    ParseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// `[validation]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSection {
    /// Stop at the first violation
    #[serde(default = "default_true")]
    pub fail_fast: bool,

    /// Reject containers that declare singletons
    #[serde(default = "default_true")]
    pub reject_singletons: bool,

    /// Accept binding targets typed with a base of the navigation type
    #[serde(default = "default_true")]
    pub allow_base_type_binding_targets: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ValidationSection {
    fn default() -> Self {
        Self {
            fail_fast: true,
            reject_singletons: true,
            allow_base_type_binding_targets: true,
        }
    }
}

impl From<&ValidationSection> for ValidationOptions {
    fn from(section: &ValidationSection) -> Self {
        Self {
            fail_fast: section.fail_fast,
            reject_singletons: section.reject_singletons,
            allow_base_type_binding_targets: section.allow_base_type_binding_targets,
        }
    }
}

/// `[loader]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderSection {
    /// Refuse documents whose schemas are not CSDL V4
    #[serde(default)]
    pub require_v4: bool,

    /// Largest accepted document, in bytes
    #[serde(default = "default_max_document_size")]
    pub max_document_size: u64,

    /// Run the metadata validator after resolving
    #[serde(default = "default_true")]
    pub validate_on_load: bool,
}

fn default_max_document_size() -> u64 {
    MAX_METADATA_DOCUMENT_SIZE
}

impl Default for LoaderSection {
    fn default() -> Self {
        Self {
            require_v4: false,
            max_document_size: default_max_document_size(),
            validate_on_load: true,
        }
    }
}

/// Complete configuration (`.odata-metadata.toml`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataConfig {
    #[serde(default)]
    pub validation: ValidationSection,

    #[serde(default)]
    pub loader: LoaderSection,
}

impl MetadataConfig {
    /// Load configuration from a directory
    ///
    /// Looks for `.odata-metadata.toml` in `dir` and falls back to defaults
    /// if it is missing. Environment overrides are applied either way.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let config_path = dir.join(CONFIG_FILENAME);
        let mut config = if config_path.exists() {
            Self::from_file(&config_path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Read an explicit configuration file, without environment overrides
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::IoError(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```rust
    /// use odata_metadata_sdk::config::MetadataConfig;
    ///
    /// let config = MetadataConfig::parse("[validation]\nreject_singletons = false\n").unwrap();
    /// assert!(!config.validation.reject_singletons);
    /// assert!(config.validation.fail_fast);
    /// ```
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("Failed to parse config: {}", e)))
    }

    /// Convert configuration to a TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to serialize config: {}", e))
        })
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable source. Unparseable values
    /// are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(ENV_FAIL_FAST)
            && let Some(flag) = parse_flag(&value)
        {
            self.validation.fail_fast = flag;
        }

        if let Some(value) = lookup(ENV_REQUIRE_V4)
            && let Some(flag) = parse_flag(&value)
        {
            self.loader.require_v4 = flag;
        }

        if let Some(value) = lookup(ENV_MAX_DOCUMENT_SIZE)
            && let Ok(size) = value.trim().parse()
        {
            self.loader.max_document_size = size;
        }
    }

    /// Validator options derived from the `[validation]` section
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions::from(&self.validation)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Generate a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# OData Metadata SDK Configuration

[validation]
# Stop at the first violation
fail_fast = true

# Reject containers that declare singletons
reject_singletons = true

# Accept binding targets typed with a base type of the navigation property
allow_base_type_binding_targets = true

[loader]
# Refuse V2/V3 documents
require_v4 = false

# Largest accepted document in bytes
max_document_size = 10485760

# Validate every document after it is resolved
validate_on_load = true
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_sample() {
        let parsed = MetadataConfig::parse(sample_config()).unwrap();
        assert_eq!(parsed, MetadataConfig::default());
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config = MetadataConfig::parse("[loader]\nrequire_v4 = true\n").unwrap();
        assert!(config.loader.require_v4);
        assert!(config.loader.validate_on_load);
        assert_eq!(config.loader.max_document_size, MAX_METADATA_DOCUMENT_SIZE);
        assert_eq!(config.validation, ValidationSection::default());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(matches!(
            MetadataConfig::parse("[validation\nfail_fast = 1"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn overrides_apply_parseable_values() {
        let vars: HashMap<&str, &str> = [
            (ENV_FAIL_FAST, "false"),
            (ENV_REQUIRE_V4, "1"),
            (ENV_MAX_DOCUMENT_SIZE, "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = MetadataConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert!(!config.validation.fail_fast);
        assert!(config.loader.require_v4);
        assert_eq!(config.loader.max_document_size, MAX_METADATA_DOCUMENT_SIZE);
    }

    #[test]
    fn validation_options_follow_section() {
        let mut config = MetadataConfig::default();
        config.validation.reject_singletons = false;
        let options = config.validation_options();
        assert!(!options.reject_singletons);
        assert!(options.fail_fast);
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = MetadataConfig::default();
        config.loader.max_document_size = 1024;
        let parsed = MetadataConfig::parse(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
