//! Run options and output root preparation

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ExportError;

/// Default number of resource kinds processed concurrently
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default deadline for each API call
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings fixed for the duration of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub output_root: PathBuf,
    /// Suppress per-file and per-failure console output
    pub quiet: bool,
    /// Keep `data`/`stringData` of secrets
    pub include_secrets: bool,
    /// Keep `metadata.managedFields`
    pub include_managed_fields: bool,
    /// Delete the output root before starting instead of refusing to run
    pub remove_existing_output: bool,
    /// Write container logs next to exported pods
    pub capture_logs: bool,
    /// Maximum resource kinds in flight
    pub concurrency: usize,
    pub request_timeout: Duration,
}

impl ExportOptions {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            quiet: false,
            include_secrets: false,
            include_managed_fields: false,
            remove_existing_output: false,
            capture_logs: true,
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new("out")
    }
}

/// Enforce the fresh-tree rule before anything touches the network.
///
/// With `remove_existing_output` the root is deleted first; otherwise an existing root is
/// a fatal error.
pub fn prepare_output_root(options: &ExportOptions) -> Result<(), ExportError> {
    let root = options.output_root.as_path();

    if options.remove_existing_output {
        remove_output_root(root)?;
    }

    match root.try_exists() {
        Ok(true) => Err(ExportError::OutputExists(root.to_path_buf())),
        Ok(false) => Ok(()),
        Err(source) => Err(ExportError::InspectOutput {
            path: root.to_path_buf(),
            source,
        }),
    }
}

fn remove_output_root(root: &Path) -> Result<(), ExportError> {
    match std::fs::remove_dir_all(root) {
        Ok(()) => {
            tracing::debug!("Removed existing output directory {}", root.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ExportError::RemoveOutput {
            path: root.to_path_buf(),
            source,
        }),
    }
}
