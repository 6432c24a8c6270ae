//! Logging initialization

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initialize logging based on debug flag.
///
/// Without `debug`, warnings (one per skipped kind, instance or container) go to stderr so
/// they never mix with the `Written:` lines on stdout. With `debug`, everything down to
/// debug level goes to a temp file whose path is returned. `RUST_LOG` overrides the level
/// in both modes.
pub fn init_logging(debug: bool) -> Result<Option<PathBuf>> {
    if !debug {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter("warn"))
            .with_target(false)
            .without_time()
            .init();
        return Ok(None);
    }

    // Named temp file that outlives the process so it can be inspected afterwards
    let (file, path) = tempfile::Builder::new()
        .prefix("kubedump-")
        .suffix(".log")
        .tempfile()
        .context("Failed to create debug log file")?
        .keep()
        .context("Failed to keep debug log file")?;

    tracing_subscriber::fmt()
        .with_writer(file)
        .with_env_filter(env_filter("debug"))
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    Ok(Some(path))
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}
