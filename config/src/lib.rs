//! # Configuration Management for soft-deletable
//!
//! This crate provides the configuration structures shared by the ORM host
//! layer and the lifecycle event manager.
//!
//! ## Quick Start
//!
//! ### Programmatic Configuration
//! ```rust
//! use config::{AppConfig, EventConfig, OrmConfig};
//!
//! let config = AppConfig {
//!     orm: OrmConfig::new("app".to_string(), true),
//!     events: EventConfig::new(16, true),
//! };
//! assert!(config.orm.strict_fields);
//! ```
//!
//! ### TOML File Configuration
//! ```toml
//! [orm]
//! name = "app"
//! strict_fields = true
//!
//! [events]
//! max_subscribers = 16
//! deduplicate_subscribers = true
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from soft_deletable.toml (or the path in SOFT_DELETABLE_CONFIG)
//! let config = AppConfig::load()?;
//!
//! // Or load from custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::{
    env,
    path::{Path, PathBuf},
};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./soft_deletable.toml";
const CONFIG_PATH_ENV: &str = "SOFT_DELETABLE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Environment variable error: {0}")]
    Env(#[from] env::VarError),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub orm: OrmConfig,
    #[serde(default)]
    pub events: EventConfig,
}

/// ORM host configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrmConfig {
    /// Name used in log output
    pub name: String,
    /// Reject field substitutions that name a field the entity does not have
    pub strict_fields: bool,
}

/// Lifecycle event manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    pub max_subscribers: usize,
    /// Ignore a subscriber whose name is already registered
    pub deduplicate_subscribers: bool,
}

impl AppConfig {
    /// Load configuration from TOML file specified in .env or defaults
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(err.into());
            }
        }

        let path = Self::resolve_path(env::var(CONFIG_PATH_ENV))?;
        Self::from_file(path)
    }

    /// Config file named by the environment lookup, else the default file
    fn resolve_path(from_env: Result<String, env::VarError>) -> Result<PathBuf, ConfigError> {
        match from_env {
            Ok(path) => Ok(PathBuf::from(path)),
            Err(env::VarError::NotPresent) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Ok(PathBuf::from(DEFAULT_CONFIG_PATH))
            }
            Err(env::VarError::NotPresent) => Err(ConfigError::Invalid(format!(
                "Config path must be specified in .env file as {} or in {} file",
                CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH
            ))),
            Err(err) => Err(err.into()),
        }
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.orm.name.trim().is_empty() {
            return Err(ConfigError::Invalid("ORM name cannot be empty".to_string()));
        }
        if self.events.max_subscribers == 0 {
            return Err(ConfigError::Invalid(
                "Events max_subscribers must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl OrmConfig {
    /// Create a new ORM configuration
    pub fn new(name: String, strict_fields: bool) -> Self {
        Self {
            name,
            strict_fields,
        }
    }
}

impl Default for OrmConfig {
    fn default() -> Self {
        Self::new("default".to_string(), false)
    }
}

impl EventConfig {
    /// Create a new event manager configuration
    pub fn new(max_subscribers: usize, deduplicate_subscribers: bool) -> Self {
        Self {
            max_subscribers,
            deduplicate_subscribers,
        }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self::new(64, true)
    }
}
