//! Configuration schema definitions
//!
//! Defines the structure of the configuration file using serde for serialization.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::ExportError;
use crate::export::exclusion::ExclusionPolicy;
use crate::export::options::{DEFAULT_CONCURRENCY, DEFAULT_REQUEST_TIMEOUT};
use crate::export::paths::{DEFAULT_HAZARDOUS_CHARACTERS, DEFAULT_REPLACEMENT, NameSanitizer};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Resource kinds exported concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Deadline for every API call, in seconds
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// Write container logs next to exported pods
    #[serde(default = "default_true")]
    pub capture_logs: bool,

    /// Start from the built-in exclusion table
    #[serde(default = "default_true")]
    pub exclude_defaults: bool,

    /// Extra exclusions: groupVersion -> plural names
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub exclusions: BTreeMap<String, Vec<String>>,

    /// File name sanitizer
    #[serde(default)]
    pub sanitizer: SanitizerConfig,
}

/// Sanitizer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SanitizerConfig {
    /// Characters replaced in file names
    #[serde(default = "default_hazardous_characters")]
    pub hazardous_characters: String,

    #[serde(default = "default_replacement")]
    pub replacement: char,
}

// Default value functions
fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_request_timeout_seconds() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}

fn default_true() -> bool {
    true
}

fn default_hazardous_characters() -> String {
    DEFAULT_HAZARDOUS_CHARACTERS.to_string()
}

fn default_replacement() -> char {
    DEFAULT_REPLACEMENT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            request_timeout_seconds: default_request_timeout_seconds(),
            capture_logs: default_true(),
            exclude_defaults: default_true(),
            exclusions: BTreeMap::new(),
            sanitizer: SanitizerConfig::default(),
        }
    }
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            hazardous_characters: default_hazardous_characters(),
            replacement: default_replacement(),
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Built-in table (unless disabled) plus the configured extras
    pub fn exclusion_policy(&self) -> ExclusionPolicy {
        let base = if self.exclude_defaults {
            ExclusionPolicy::default()
        } else {
            ExclusionPolicy::empty()
        };
        base.with_exclusions(self.exclusions.clone())
    }

    pub fn name_sanitizer(&self) -> Result<NameSanitizer, ExportError> {
        NameSanitizer::new(
            &self.sanitizer.hazardous_characters,
            self.sanitizer.replacement,
        )
    }
}
