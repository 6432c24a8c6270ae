//! Output path resolution
//!
//! Every exported file lands at `root/<scope>/<group_kind-or-kind>/<sanitized-name>.yaml`.
//! Cluster-scoped kinds use the `_cluster` scope label.
//!
//! Two names that differ only in hazardous characters (e.g. `a:b` and `a!b`) sanitize to the
//! same file name; the later write wins. A real namespace literally called `_cluster` shares
//! its directory with cluster-scoped kinds. Both are known limitations.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use crate::error::{ExportError, ObjectError};

/// Scope label for cluster-scoped kinds
pub const CLUSTER_SCOPE: &str = "_cluster";

/// Characters replaced by the default sanitizer
pub const DEFAULT_HAZARDOUS_CHARACTERS: &str = "\\/:*?\"'<>|!@#$%^&()+={}[];,";

/// Replacement used by the default sanitizer
pub const DEFAULT_REPLACEMENT: char = '_';

/// Where an instance lives: a namespace or the cluster-wide bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Cluster,
    Namespace(String),
}

impl Scope {
    /// Directory label for this scope
    pub fn label(&self) -> &str {
        match self {
            Scope::Cluster => CLUSTER_SCOPE,
            Scope::Namespace(ns) => ns,
        }
    }

    /// Namespace for API calls, if any
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Scope::Cluster => None,
            Scope::Namespace(ns) => Some(ns),
        }
    }
}

/// Accept `component` only if joining it onto a directory stays inside that directory.
///
/// Empty strings, `.`, `..`, absolute paths and anything holding a separator are rejected.
pub fn check_path_component(component: &str) -> Result<(), ObjectError> {
    let mut parts = Path::new(component).components();
    let single_normal = matches!(
        (parts.next(), parts.next()),
        (Some(Component::Normal(_)), None)
    );
    if single_normal && !component.contains(['/', '\\', '\0']) {
        Ok(())
    } else {
        Err(ObjectError::UnsafePathComponent(component.to_string()))
    }
}

/// Maps unsafe file name characters to a fixed replacement.
///
/// The replacement is never itself hazardous, so sanitizing twice is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSanitizer {
    hazardous: BTreeSet<char>,
    replacement: char,
}

impl NameSanitizer {
    pub fn new(hazardous: &str, replacement: char) -> Result<Self, ExportError> {
        let hazardous: BTreeSet<char> = hazardous.chars().collect();
        if hazardous.contains(&replacement) {
            return Err(ExportError::InvalidSanitizer(format!(
                "replacement {:?} is itself in the hazardous set",
                replacement
            )));
        }
        if replacement == '.' || replacement.is_control() {
            return Err(ExportError::InvalidSanitizer(format!(
                "replacement {:?} is not usable in file names",
                replacement
            )));
        }
        Ok(Self {
            hazardous,
            replacement,
        })
    }

    /// Replace every hazardous character in `name`
    pub fn sanitize(&self, name: &str) -> String {
        name.chars()
            .map(|c| {
                if self.hazardous.contains(&c) {
                    self.replacement
                } else {
                    c
                }
            })
            .collect()
    }

    pub fn replacement(&self) -> char {
        self.replacement
    }
}

impl Default for NameSanitizer {
    fn default() -> Self {
        Self {
            hazardous: DEFAULT_HAZARDOUS_CHARACTERS.chars().collect(),
            replacement: DEFAULT_REPLACEMENT,
        }
    }
}

/// Directory and file name for one exported instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub directory: PathBuf,
    pub file_name: String,
}

impl ExportTarget {
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

/// Resolves export paths below a fixed output root
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    sanitizer: NameSanitizer,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>, sanitizer: NameSanitizer) -> Self {
        Self {
            root: root.into(),
            sanitizer,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sanitizer(&self) -> &NameSanitizer {
        &self.sanitizer
    }

    /// `root/scope/group_kind`, or `root/scope/kind` for the core group
    pub fn resolve_directory(&self, scope: &Scope, group: &str, kind: &str) -> PathBuf {
        let bucket = if group.is_empty() {
            kind.to_string()
        } else {
            format!("{}_{}", group, kind)
        };
        self.root.join(scope.label()).join(bucket)
    }

    /// Full target for an instance's YAML file
    pub fn resolve(&self, scope: &Scope, group: &str, kind: &str, name: &str) -> ExportTarget {
        ExportTarget {
            directory: self.resolve_directory(scope, group, kind),
            file_name: format!("{}.yaml", self.sanitizer.sanitize(name)),
        }
    }

    /// File name for one container's logs, placed next to the pod's YAML
    pub fn log_file_name(&self, pod: &str, container: &str) -> String {
        format!(
            "{}_{}_logs.txt",
            self.sanitizer.sanitize(pod),
            self.sanitizer.sanitize(container)
        )
    }
}
