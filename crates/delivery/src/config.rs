//! Connection settings for the delivery API.
//!
//! [`DeliveryConfig`] deserializes from any serde format and is usually
//! embedded in a larger server or pipeline configuration.
//!
//! ```rust
//! use delivery::DeliveryConfig;
//!
//! let config = DeliveryConfig::new("space-1", "token-1");
//! assert_eq!(config.environment, "master");
//! config.validate().expect("valid configuration");
//! assert_eq!(
//!     config.entries_url(),
//!     "https://cdn.contentful.com/spaces/space-1/environments/master/entries"
//! );
//! ```
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://cdn.contentful.com";
pub const DEFAULT_ENVIRONMENT: &str = "master";

/// Where to fetch from and how to authenticate.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default)]
    pub space_id: String,

    #[serde(default)]
    pub access_token: String,

    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl DeliveryConfig {
    pub fn new(space_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            space_id: space_id.into(),
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The collection endpoint entries are listed from.
    pub fn entries_url(&self) -> String {
        format!(
            "{}/spaces/{}/environments/{}/entries",
            self.base_url.trim_end_matches('/'),
            self.space_id,
            self.environment
        )
    }

    pub fn validate(&self) -> Result<(), DeliveryConfigError> {
        if self.space_id.trim().is_empty() {
            return Err(DeliveryConfigError::MissingSpaceId);
        }
        if self.access_token.trim().is_empty() {
            return Err(DeliveryConfigError::MissingAccessToken);
        }
        if self.environment.trim().is_empty() {
            return Err(DeliveryConfigError::MissingEnvironment);
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(DeliveryConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.timeout_secs == 0 {
            return Err(DeliveryConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            space_id: String::new(),
            access_token: String::new(),
            environment: default_environment(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// Keeps the token out of logs.
impl fmt::Debug for DeliveryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryConfig")
            .field("space_id", &self.space_id)
            .field("access_token", &"<redacted>")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryConfigError {
    #[error("space_id is required")]
    MissingSpaceId,
    #[error("access_token is required")]
    MissingAccessToken,
    #[error("environment must not be empty")]
    MissingEnvironment,
    #[error("base_url `{0}` is not an http(s) URL")]
    InvalidBaseUrl(String),
    #[error("timeout_secs must be greater than zero")]
    ZeroTimeout,
}
