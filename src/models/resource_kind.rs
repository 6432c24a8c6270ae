//! Resource kind descriptors
//!
//! A `ResourceKindDescriptor` names one kind served by the API server (group/version,
//! kind, plural) together with its scope. Descriptors drive enumeration: nothing in the
//! exporter hardcodes kind names apart from the pod special case.

use std::fmt;

/// Kind name of the only resource that gets companion log files
pub const POD_KIND: &str = "Pod";

/// One resource kind as served by the API server
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKindDescriptor {
    /// `group/version`, or just `version` for the core group (e.g. "v1", "apps/v1")
    pub group_version: String,
    /// CamelCase kind (e.g. "Deployment")
    pub kind: String,
    /// Lowercase plural resource name used in URLs (e.g. "deployments")
    pub plural: String,
    /// Whether instances are partitioned by namespace
    pub namespaced: bool,
}

impl ResourceKindDescriptor {
    pub fn new(group_version: &str, kind: &str, plural: &str, namespaced: bool) -> Self {
        Self {
            group_version: group_version.to_string(),
            kind: kind.to_string(),
            plural: plural.to_string(),
            namespaced,
        }
    }

    /// API group, empty for the core group
    pub fn group(&self) -> &str {
        split_group_version(&self.group_version).0
    }

    /// API version (e.g. "v1")
    pub fn version(&self) -> &str {
        split_group_version(&self.group_version).1
    }

    /// Stable identifier used in logs and failure records: `group_version/plural`
    pub fn identifier(&self) -> String {
        format!("{}/{}", self.group_version, self.plural)
    }

    /// Pods in the core group are the only kind with container logs
    pub fn is_pod(&self) -> bool {
        self.group().is_empty() && self.kind == POD_KIND
    }
}

impl fmt::Display for ResourceKindDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

/// Split an apiVersion string into (group, version).
///
/// The core group has no slash: "v1" -> ("", "v1").
pub fn split_group_version(group_version: &str) -> (&str, &str) {
    match group_version.rsplit_once('/') {
        Some((group, version)) => (group, version),
        None => ("", group_version),
    }
}

/// A single entry of a discovery response, before any filtering.
///
/// `namespaced` and `verbs` are optional because aggregated or third-party API servers
/// occasionally omit them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResource {
    pub name: String,
    pub kind: String,
    pub namespaced: Option<bool>,
    pub verbs: Option<Vec<String>>,
}

/// Resources served by one group/version, as returned by discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResourceList {
    pub group_version: String,
    pub resources: Vec<RawResource>,
}
