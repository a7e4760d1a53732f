// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Console configuration module
//!
//! This module provides the configuration of the operator console: where the
//! node list is stored, request and probe timeouts, the watch interval and
//! the default log filter.

use std::{path::PathBuf, time::Duration};

use anyhow::{Result, ensure};
use config::{Config, ConfigError, Environment as ConfigEnv, File, builder::DefaultState};
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::error::{DashError, DashResult};

/// Prefix of environment variables overriding configuration values
pub const ENV_PREFIX: &str = "LEDGER_DASH";

/// A validated timeout duration in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeoutSeconds(Duration);

impl TimeoutSeconds {
    /// Create a new `TimeoutSeconds`, ensuring the value is within valid bounds
    ///
    /// # Errors
    ///
    /// Returns an error if timeout is 0 or greater than 300 seconds
    pub fn new(seconds: u64) -> Result<Self> {
        ensure!(seconds != 0, "timeout must be greater than 0");
        ensure!(seconds <= 300, "timeout cannot exceed 300");
        Ok(Self(Duration::from_secs(seconds)))
    }

    /// Default request timeout (15 seconds)
    pub const fn default_value() -> Self {
        Self(Duration::from_secs(15))
    }

    /// Default probe timeout (5 seconds)
    pub const fn probe_default() -> Self {
        Self(Duration::from_secs(5))
    }

    /// Get the timeout value
    pub fn value(&self) -> Duration {
        self.0
    }
}

impl<'de> Deserialize<'de> for TimeoutSeconds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = u64::deserialize(deserializer)?;
        Self::new(seconds).map_err(|e| de::Error::custom(e.to_string()))
    }
}

impl Default for TimeoutSeconds {
    fn default() -> Self {
        Self::default_value()
    }
}

/// Environment types for configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production environment
    Production,
    /// Development environment
    Development,
    /// Testing environment
    Testing,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Development => write!(f, "development"),
            Environment::Testing => write!(f, "testing"),
        }
    }
}

/// Operator console configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashConfig {
    /// Directory holding the persisted node list
    pub storage_dir: PathBuf,
    /// Timeout for reads and writes (validated range: 1-300)
    pub request_timeout_seconds: TimeoutSeconds,
    /// Timeout for node probes (validated range: 1-300)
    pub probe_timeout_seconds: TimeoutSeconds,
    /// Seconds between watch refreshes
    pub poll_interval_seconds: u64,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Environment type
    pub environment: Environment,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(".ledger-dash"),
            request_timeout_seconds: TimeoutSeconds::default(),
            probe_timeout_seconds: TimeoutSeconds::probe_default(),
            poll_interval_seconds: 10,
            log_level: "info".to_string(),
            environment: Environment::Development,
        }
    }
}

impl DashConfig {
    /// Create configuration from environment variables and optional configuration files
    ///
    /// # Errors
    ///
    /// Returns `DashError::Config` if configuration is invalid or cannot be loaded.
    pub fn from_env() -> DashResult<Self> {
        Self::load().map_err(|e| DashError::Config {
            message: format!("failed to load configuration: {e}"),
        })
    }

    /// Load configuration using the config crate with hierarchical sources
    ///
    /// Configuration is loaded in the following order (later sources override earlier ones):
    /// 1. Default values
    /// 2. Configuration file (ledger-dash.json)
    /// 3. Environment-specific files (ledger-dash.{env}.json)
    /// 4. Environment variables with `LEDGER_DASH_` prefix
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let env_var = std::env::var(format!("{ENV_PREFIX}_ENVIRONMENT"))
            .unwrap_or_else(|_| "development".to_string());

        let config = Self::defaults()?
            .add_source(File::with_name("ledger-dash.json").required(false))
            .add_source(
                File::with_name(&format!("ledger-dash.{}.json", env_var.to_lowercase()))
                    .required(false),
            )
            .add_source(ConfigEnv::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Self::from_config(config)
    }

    /// Builder seeded with the default values
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a default cannot be set.
    pub fn defaults() -> Result<config::ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = Self::default();
        Config::builder()
            .set_default("storage_dir", defaults.storage_dir.to_string_lossy().into_owned())?
            .set_default("request_timeout_seconds", 15)?
            .set_default("probe_timeout_seconds", 5)?
            .set_default("poll_interval_seconds", defaults.poll_interval_seconds)?
            .set_default("log_level", defaults.log_level)?
            .set_default("environment", defaults.environment.to_string())
    }

    /// Deserialize and validate a built configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value is missing, malformed or out of range.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let dash_config: Self = config.try_deserialize()?;
        if dash_config.poll_interval_seconds == 0 {
            return Err(ConfigError::Message(
                "poll interval must be greater than 0".to_string(),
            ));
        }
        Ok(dash_config)
    }

    /// Configuration for tests, storing nodes under `storage_dir`
    pub fn for_testing(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            request_timeout_seconds: TimeoutSeconds::probe_default(),
            probe_timeout_seconds: TimeoutSeconds::probe_default(),
            poll_interval_seconds: 1,
            log_level: "debug".to_string(),
            environment: Environment::Testing,
        }
    }

    /// Watch refresh interval
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}
