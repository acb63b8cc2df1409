//! Broadcast configuration
//!
//! Loaded from a JSON file or from `HERALD_*` environment variables.
//!
//! ```json
//! {
//!     "unique_app_key": "billing",
//!     "account": { "access_key": "AKIA...", "secret_key": "...", "region": "eu-west-1" },
//!     "publish": { "log_failures": true }
//! }
//! ```

use herald_core::validate_app_key;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

pub const ENV_APP_KEY: &str = "HERALD_APP_KEY";
pub const ENV_ACCESS_KEY: &str = "HERALD_ACCESS_KEY";
pub const ENV_SECRET_KEY: &str = "HERALD_SECRET_KEY";
pub const ENV_REGION: &str = "HERALD_REGION";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Missing setting: {0}")]
    Missing(&'static str),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    /// Namespaces topic names so applications sharing a backend do not collide
    pub unique_app_key: String,

    /// Backend credentials, consumed by the topic service only
    #[serde(default)]
    pub account: AccountSettings,

    #[serde(default)]
    pub publish: PublishSettings,
}

/// Backend account settings
///
/// Opaque to the broadcast core; handed to the topic service factory passed
/// to `BroadcastDispatcher::connect`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccountSettings {
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for AccountSettings {
    fn default() -> Self {
        AccountSettings {
            access_key: String::new(),
            secret_key: String::new(),
            region: default_region(),
        }
    }
}

impl fmt::Debug for AccountSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountSettings")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

/// Background publish behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishSettings {
    /// Log publish failures at warn level; otherwise they are dropped silently
    #[serde(default = "default_true")]
    pub log_failures: bool,
}

impl Default for PublishSettings {
    fn default() -> Self {
        PublishSettings {
            log_failures: default_true(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl BroadcastConfig {
    pub fn new(unique_app_key: impl Into<String>) -> Self {
        BroadcastConfig {
            unique_app_key: unique_app_key.into(),
            account: AccountSettings::default(),
            publish: PublishSettings::default(),
        }
    }

    pub fn with_account(mut self, account: AccountSettings) -> Self {
        self.account = account;
        self
    }

    pub fn with_log_failures(mut self, log_failures: bool) -> Self {
        self.publish.log_failures = log_failures;
        self
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: BroadcastConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `HERALD_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let app_key = lookup(ENV_APP_KEY).ok_or(ConfigError::Missing(ENV_APP_KEY))?;
        let account = AccountSettings {
            access_key: lookup(ENV_ACCESS_KEY).unwrap_or_default(),
            secret_key: lookup(ENV_SECRET_KEY).unwrap_or_default(),
            region: lookup(ENV_REGION).unwrap_or_else(default_region),
        };

        let config = BroadcastConfig::new(app_key).with_account(account);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_app_key(&self.unique_app_key)
            .map_err(|e| ConfigError::Invalid(format!("unique_app_key: {}", e)))
    }
}
