//! kubedump library
//!
//! Exports every readable resource of a Kubernetes cluster into a deterministic tree of YAML
//! files. The binary is a thin clap front-end over this library; integration tests drive
//! the same pipeline against an in-memory cluster.

pub mod config;
pub mod error;
pub mod export;
pub mod kube;
pub mod models;

// Re-export commonly used types for convenience
pub use error::{ExportError, ObjectError};
pub use export::{
    Catalog, ExclusionPolicy, ExportOptions, Exporter, Failure, FailureTier, NameSanitizer,
    RunResult, export_manifest, prepare_output_root,
};
pub use kube::{ClusterApi, KubeCluster};
pub use models::ResourceKindDescriptor;
