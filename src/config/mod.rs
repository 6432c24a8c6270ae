//! Configuration system for kubedump
//!
//! A single optional YAML file in the platform config directory, overridable through
//! environment variables and, last, command line flags.

pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, SanitizerConfig};
