//! CLI command handling module
//!
//! Handles the config subcommand, logging setup and the end-of-run summary.

mod commands;
mod logging;
mod report;

pub use commands::{ConfigSubcommand, handle_config_command};
pub use logging::init_logging;
pub use report::render_summary;
