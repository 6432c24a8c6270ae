//! Exclusion policy
//!
//! Some kinds are never worth exporting: review objects that only exist for the
//! duration of a request, high-churn bookkeeping like leases and events, and
//! replicasets that just mirror their deployments.

use std::collections::{BTreeMap, BTreeSet};

/// Built-in exclusions, keyed by group/version
pub const DEFAULT_EXCLUSIONS: &[(&str, &[&str])] = &[
    ("apps/v1", &["replicasets"]),
    (
        "authentication.k8s.io/v1",
        &["selfsubjectreviews", "tokenreviews"],
    ),
    (
        "authorization.k8s.io/v1",
        &[
            "selfsubjectaccessreviews",
            "subjectaccessreviews",
            "selfsubjectrulesreviews",
            "localsubjectaccessreviews",
        ],
    ),
    ("coordination.k8s.io/v1", &["leases"]),
    ("discovery.k8s.io/v1", &["endpointslices"]),
    ("events.k8s.io/v1", &["events"]),
    ("v1", &["events", "bindings", "componentstatuses"]),
];

/// Immutable table of group/version -> plural names that must never be exported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionPolicy {
    table: BTreeMap<String, BTreeSet<String>>,
}

impl ExclusionPolicy {
    /// A policy that excludes nothing
    pub fn empty() -> Self {
        Self {
            table: BTreeMap::new(),
        }
    }

    /// Build a policy from an arbitrary table
    pub fn from_table<I, G, P>(table: I) -> Self
    where
        I: IntoIterator<Item = (G, Vec<P>)>,
        G: Into<String>,
        P: Into<String>,
    {
        Self::empty().with_exclusions(table)
    }

    /// Return a copy of this policy with more exclusions merged in
    pub fn with_exclusions<I, G, P>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (G, Vec<P>)>,
        G: Into<String>,
        P: Into<String>,
    {
        for (group_version, plurals) in extra {
            self.table
                .entry(group_version.into())
                .or_default()
                .extend(plurals.into_iter().map(Into::into));
        }
        self
    }

    /// Whether `plural` in `group_version` must be skipped.
    ///
    /// Unknown group/versions exclude nothing.
    pub fn is_excluded(&self, group_version: &str, plural: &str) -> bool {
        self.table
            .get(group_version)
            .is_some_and(|plurals| plurals.contains(plural))
    }

    /// Iterate over every excluded (group_version, plural) pair in sorted order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.table.iter().flat_map(|(group_version, plurals)| {
            plurals
                .iter()
                .map(move |plural| (group_version.as_str(), plural.as_str()))
        })
    }
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self::from_table(
            DEFAULT_EXCLUSIONS
                .iter()
                .map(|(group_version, plurals)| (*group_version, plurals.to_vec())),
        )
    }
}
