//! Configuration management for minutebook.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::document::PageSize;
use crate::error::{Error, Result};
use crate::storage::DEFAULT_SLOT;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "minutebook";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "minutebook.db";

/// Prefix of minutebook's environment variables.
const ENV_PREFIX: &str = "MINUTEBOOK_";

/// Unprefixed variable that also carries the generation credential.
const API_KEY_VAR: &str = "API_KEY";

/// Upper bound on generation retries.
const MAX_RETRIES_LIMIT: usize = 10;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. The `API_KEY` environment variable (generation credential only)
/// 2. Environment variables (prefixed with `MINUTEBOOK_`, sections split by `__`)
/// 3. TOML config file at `~/.config/minutebook/config.toml`
/// 4. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Text generation configuration.
    pub generation: GenerationConfig,
    /// Document export configuration.
    pub export: ExportConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/minutebook/minutebook.db`
    pub database_path: Option<PathBuf>,
    /// Key-value slot holding the meeting collection.
    pub slot: String,
}

/// Text generation service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Credential for the generation service.
    pub api_key: Option<String>,
    /// Model used to draft minutes.
    pub model: String,
    /// Base URL of the generation API.
    pub endpoint: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries after a failed attempt (transport errors, 429 and 5xx only).
    pub max_retries: usize,
    /// Base of the exponential backoff between retries, in milliseconds.
    pub retry_base_ms: u64,
}

/// Document export configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Paper size of exported PDFs.
    pub page_size: PageSize,
    /// Directory exported files are written to.
    /// Defaults to the current directory.
    pub output_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            slot: DEFAULT_SLOT.to_string(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 60,
            max_retries: 3,
            retry_base_ms: 250,
        }
    }
}

impl GenerationConfig {
    /// The credential, if one is set and non-blank.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(
                Env::raw()
                    .only(&[API_KEY_VAR])
                    .map(|_| "generation.api_key".into()),
            );

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.slot.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "storage.slot must not be empty".to_string(),
            });
        }

        if self.generation.model.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "generation.model must not be empty".to_string(),
            });
        }

        let endpoint = self.generation.endpoint.trim();
        if endpoint.is_empty() {
            return Err(Error::ConfigValidation {
                message: "generation.endpoint must not be empty".to_string(),
            });
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(Error::ConfigValidation {
                message: format!("generation.endpoint must be an http(s) URL: {endpoint}"),
            });
        }

        if self.generation.timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "generation.timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.generation.max_retries > MAX_RETRIES_LIMIT {
            return Err(Error::ConfigValidation {
                message: format!(
                    "generation.max_retries ({}) cannot be greater than {MAX_RETRIES_LIMIT}",
                    self.generation.max_retries
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the export directory, resolving defaults if not set.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.export
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// A copy safe to print: the credential is masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.generation.api_key.is_some() {
            copy.generation.api_key = Some("********".to_string());
        }
        copy
    }
}
