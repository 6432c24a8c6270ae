//! Error types
//!
//! `ExportError` covers the fatal tier: anything that stops a run before (or instead of)
//! writing output. Everything below that tier is recorded as a `Failure` in the run result.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("output directory {0:?} already exists")]
    OutputExists(PathBuf),

    #[error("failed to remove out-dir {path:?}")]
    RemoveOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to inspect out-dir {path:?}")]
    InspectOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to discover resources")]
    Discovery(#[source] anyhow::Error),

    #[error("failed to read manifest file {path:?}")]
    ReadManifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML document {index} of {path:?}")]
    ParseManifest {
        path: PathBuf,
        index: usize,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid sanitizer policy: {0}")]
    InvalidSanitizer(String),
}

/// Structural problems with a fetched object.
///
/// Only the fields needed to place the object in the tree are checked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectError {
    #[error("metadata not found in object")]
    MissingMetadata,

    #[error("metadata.name not found in object")]
    MissingName,

    #[error("metadata.namespace not found in namespaced object {0:?}")]
    MissingNamespace(String),

    #[error("apiVersion or kind not found in object {0:?}")]
    MissingTypeInfo(String),

    #[error("{0:?} cannot be used as a path component")]
    UnsafePathComponent(String),
}
