//! Export pipeline
//!
//! Discovery, path resolution, redaction, writing and log capture. `Exporter` drives a
//! cluster export; `export_manifest` runs the same write path over a manifest file.

pub mod catalog;
pub mod exclusion;
pub mod exporter;
pub mod logs;
pub mod manifest;
pub mod options;
pub mod paths;
pub mod result;
pub mod transform;
pub mod writer;

pub use catalog::Catalog;
pub use exclusion::{DEFAULT_EXCLUSIONS, ExclusionPolicy};
pub use exporter::Exporter;
pub use logs::{LogCapturer, container_names};
pub use manifest::{export_manifest, parse_documents};
pub use options::{DEFAULT_CONCURRENCY, DEFAULT_REQUEST_TIMEOUT, ExportOptions, prepare_output_root};
pub use paths::{CLUSTER_SCOPE, ExportTarget, NameSanitizer, PathResolver, Scope};
pub use result::{Failure, FailureTier, ItemOutcome, RunResult};
pub use transform::Transformer;
pub use writer::{InstanceWriter, WrittenInstance};
