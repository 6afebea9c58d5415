//! YAML configuration for the menufeed pipeline.
//!
//! One file describes how fetched content is normalized, which include depth
//! each endpoint fetches with, and where the delivery API lives. Every
//! section is optional.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//!
//! delivery:
//!   space_id: "abc123"
//!   access_token: "token"
//!   environment: "master"
//!
//! normalize:
//!   max_depth: 6
//!   promote_containers: true
//!   reserved_keys: ["internalTitle"]
//!   rename_tables:
//!     drink:
//!       softDrinks: "Soft Drinks"
//!       hotDrinks: "Hot Drinks"
//!   extra_rules:
//!     promo:
//!       - op: default_if_absent
//!         field: active
//!         value: true
//!
//! endpoints:
//!   deals: 2
//!
//! locale:
//!   language_field: "localeId"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use content::MAX_INCLUDE_DEPTH;
use delivery::{DeliveryConfig, DEFAULT_LANGUAGE_FIELD};
use normalize::{Normalizer, RenameTable, Transform, TransformRegistry, UnwrapOptions};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Endpoint;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MenufeedConfig {
    /// Configuration format version
    pub version: String,

    /// Delivery API connection. Credentials may also come from the
    /// environment; see the snapshot binary.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    #[serde(default)]
    pub normalize: NormalizeYamlConfig,

    /// Include depth overrides keyed by endpoint name.
    #[serde(default)]
    pub endpoints: BTreeMap<String, u8>,

    #[serde(default)]
    pub locale: LocaleYamlConfig,
}

impl MenufeedConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: MenufeedConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.normalize.validate()?;

        for (name, include) in &self.endpoints {
            if name.parse::<Endpoint>().is_err() {
                return Err(ConfigLoadError::Validation(format!(
                    "unknown endpoint `{name}`"
                )));
            }
            if *include > MAX_INCLUDE_DEPTH {
                return Err(ConfigLoadError::Validation(format!(
                    "endpoint `{name}` include must be <= {MAX_INCLUDE_DEPTH}"
                )));
            }
        }

        if self.locale.language_field.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "locale.language_field must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Include depth an endpoint fetches with: the configured override, else
    /// the endpoint's own default.
    pub fn include_for(&self, endpoint: Endpoint) -> Option<u8> {
        self.endpoints
            .get(endpoint.name())
            .copied()
            .or_else(|| endpoint.default_include())
    }

    /// Build the normalizer this configuration describes.
    pub fn normalizer(&self) -> Normalizer {
        self.normalize.normalizer()
    }
}

impl Default for MenufeedConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            delivery: DeliveryConfig::default(),
            normalize: NormalizeYamlConfig::default(),
            endpoints: BTreeMap::new(),
            locale: LocaleYamlConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizeYamlConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: u8,

    #[serde(default = "true_value")]
    pub promote_containers: bool,

    #[serde(default = "default_reserved_keys")]
    pub reserved_keys: Vec<String>,

    /// Label tables merged over the built-in ones. Only `drink` is known.
    #[serde(default)]
    pub rename_tables: BTreeMap<String, RenameTable>,

    /// Rules appended after the built-in chain of each content type.
    #[serde(default)]
    pub extra_rules: BTreeMap<String, Vec<Transform>>,
}

impl NormalizeYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.max_depth == 0 {
            return Err(ConfigLoadError::Validation(
                "normalize.max_depth must be >= 1".into(),
            ));
        }
        if self.max_depth > MAX_INCLUDE_DEPTH {
            return Err(ConfigLoadError::Validation(format!(
                "normalize.max_depth must be <= {MAX_INCLUDE_DEPTH}"
            )));
        }
        if let Some(name) = self.rename_tables.keys().find(|name| *name != "drink") {
            return Err(ConfigLoadError::Validation(format!(
                "unknown rename table `{name}`"
            )));
        }
        Ok(())
    }

    pub fn unwrap_options(&self) -> UnwrapOptions {
        UnwrapOptions {
            max_depth: self.max_depth,
            promote_containers: self.promote_containers,
            reserved_keys: self.reserved_keys.clone(),
        }
    }

    pub fn normalizer(&self) -> Normalizer {
        let mut drinks = RenameTable::drink_categories();
        if let Some(extra) = self.rename_tables.get("drink") {
            drinks.extend(extra);
        }
        let mut registry = TransformRegistry::standard_with_drinks(&drinks);
        for (content_type, rules) in &self.extra_rules {
            for rule in rules {
                registry.register(content_type, rule.clone());
            }
        }
        Normalizer::new(self.unwrap_options(), registry)
    }
}

impl Default for NormalizeYamlConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            promote_containers: true,
            reserved_keys: default_reserved_keys(),
            rename_tables: BTreeMap::new(),
            extra_rules: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleYamlConfig {
    /// Field a language path segment filters on.
    #[serde(default = "default_language_field")]
    pub language_field: String,
}

impl Default for LocaleYamlConfig {
    fn default() -> Self {
        Self {
            language_field: default_language_field(),
        }
    }
}

fn default_max_depth() -> u8 {
    UnwrapOptions::default().max_depth
}
fn default_reserved_keys() -> Vec<String> {
    UnwrapOptions::default().reserved_keys
}
fn default_language_field() -> String {
    DEFAULT_LANGUAGE_FIELD.to_string()
}
fn true_value() -> bool {
    true
}
