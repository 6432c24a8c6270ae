//! CLI command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::Path;

use kubedump::config::{ConfigLoader, paths};

/// Configuration management subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigSubcommand {
    /// Show configuration file path
    Path,
    /// Print the effective configuration (file, defaults and environment merged)
    Show,
    /// Validate configuration
    Validate,
}

/// Handle configuration subcommands.
///
/// `config_file` is the `--config` override, if any.
pub fn handle_config_command(cmd: ConfigSubcommand, config_file: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigSubcommand::Path => {
            let path = config_file
                .map(Path::to_path_buf)
                .unwrap_or_else(paths::root_config_path);
            println!("{}", path.display());
        }
        ConfigSubcommand::Show => {
            let config = ConfigLoader::load(config_file).context("Failed to load configuration")?;
            let yaml =
                serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
            print!("{}", yaml);
        }
        ConfigSubcommand::Validate => {
            ConfigLoader::load(config_file).context("Configuration validation failed")?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}
