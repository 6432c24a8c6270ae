//! Configuration loading logic
//!
//! Precedence order (highest to lowest):
//! 1. Command line flags (applied by the caller)
//! 2. Environment variable overrides
//! 3. Config file
//! 4. Built-in defaults

use super::{paths, schema::Config};
use anyhow::{Context, Result};
use std::path::Path;

/// Environment variable overriding `concurrency`
pub const CONCURRENCY_ENV: &str = "KUBEDUMP_CONCURRENCY";
/// Environment variable overriding `requestTimeoutSeconds`
pub const REQUEST_TIMEOUT_ENV: &str = "KUBEDUMP_REQUEST_TIMEOUT";
/// Environment variable overriding `captureLogs`
pub const CAPTURE_LOGS_ENV: &str = "KUBEDUMP_CAPTURE_LOGS";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged and validate the result.
    ///
    /// An explicit `path` must exist; the default config file is optional.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let mut config = match path {
            Some(path) => Self::load_file(path)?,
            None => {
                let default_path = paths::root_config_path();
                if default_path.exists() {
                    Self::load_file(&default_path)?
                } else {
                    tracing::debug!(
                        "No config file at {}, using defaults",
                        default_path.display()
                    );
                    Self::load_defaults()
                }
            }
        };

        config = Self::apply_env_overrides(config);
        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!("Loaded config file {}", path.display());
        Ok(config)
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        Config::default()
    }

    /// Check values serde cannot check on its own
    pub fn validate(config: &Config) -> Result<()> {
        if config.concurrency == 0 {
            return Err(anyhow::anyhow!("concurrency must be at least 1"));
        }
        if config.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("requestTimeoutSeconds must be at least 1"));
        }
        for (group_version, plurals) in &config.exclusions {
            if group_version.is_empty() || plurals.iter().any(String::is_empty) {
                return Err(anyhow::anyhow!(
                    "exclusions must not contain empty group versions or plural names"
                ));
            }
        }
        config
            .name_sanitizer()
            .context("Invalid sanitizer configuration")?;
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(config: Config) -> Config {
        Self::apply_overrides(config, |key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    ///
    /// Unparseable values are reported and ignored.
    pub fn apply_overrides<F>(mut config: Config, lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(CONCURRENCY_ENV) {
            match value.parse() {
                Ok(concurrency) => config.concurrency = concurrency,
                Err(_) => tracing::warn!("Ignoring {}={:?}: not a number", CONCURRENCY_ENV, value),
            }
        }

        if let Some(value) = lookup(REQUEST_TIMEOUT_ENV) {
            match value.parse() {
                Ok(seconds) => config.request_timeout_seconds = seconds,
                Err(_) => {
                    tracing::warn!("Ignoring {}={:?}: not a number", REQUEST_TIMEOUT_ENV, value)
                }
            }
        }

        if let Some(value) = lookup(CAPTURE_LOGS_ENV) {
            match value.parse() {
                Ok(capture) => config.capture_logs = capture,
                Err(_) => tracing::warn!(
                    "Ignoring {}={:?}: expected 'true' or 'false'",
                    CAPTURE_LOGS_ENV,
                    value
                ),
            }
        }

        config
    }
}
