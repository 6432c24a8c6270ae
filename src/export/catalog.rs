//! Catalog discovery
//!
//! Turns the server's preferred resource lists into the ordered work list for a run.
//! The order (group/version, then plural) is what makes two exports of an unchanged
//! cluster enumerate kinds identically, whatever order the server answered in.

use crate::error::ExportError;
use crate::export::exclusion::ExclusionPolicy;
use crate::kube::ClusterApi;
use crate::models::{RawResourceList, ResourceKindDescriptor};

const LIST_VERB: &str = "list";

/// Builds the ordered list of kinds to export
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    policy: ExclusionPolicy,
}

impl Catalog {
    pub fn new(policy: ExclusionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ExclusionPolicy {
        &self.policy
    }

    /// Query the cluster and build the work list.
    ///
    /// A failed discovery call is fatal: without a catalog there is nothing to export.
    pub async fn discover<C>(&self, cluster: &C) -> Result<Vec<ResourceKindDescriptor>, ExportError>
    where
        C: ClusterApi + ?Sized,
    {
        let lists = cluster
            .preferred_resources()
            .await
            .map_err(ExportError::Discovery)?;
        let catalog = self.build(lists);
        tracing::debug!("Discovered {} exportable resource kinds", catalog.len());
        Ok(catalog)
    }

    /// Filter and order raw discovery results
    pub fn build(&self, lists: Vec<RawResourceList>) -> Vec<ResourceKindDescriptor> {
        let mut catalog = Vec::new();

        for list in lists {
            for resource in list.resources {
                if resource.name.contains('/') {
                    // Subresources like pods/log are not listable kinds
                    continue;
                }
                if resource.name.is_empty() || resource.kind.is_empty() {
                    tracing::warn!(
                        group_version = %list.group_version,
                        "Ignoring malformed resource entry {:?}",
                        resource
                    );
                    continue;
                }
                if self.policy.is_excluded(&list.group_version, &resource.name) {
                    tracing::debug!("Excluding {}/{}", list.group_version, resource.name);
                    continue;
                }

                let namespaced = resource.namespaced.unwrap_or_else(|| {
                    tracing::debug!(
                        "{}/{} has no namespaced flag, treating as cluster-scoped",
                        list.group_version,
                        resource.name
                    );
                    false
                });
                let listable = resource
                    .verbs
                    .as_ref()
                    .is_none_or(|verbs| verbs.iter().any(|v| v == LIST_VERB));
                if !listable {
                    tracing::debug!(
                        "Skipping {}/{}: list verb not supported",
                        list.group_version,
                        resource.name
                    );
                    continue;
                }

                catalog.push(ResourceKindDescriptor {
                    group_version: list.group_version.clone(),
                    kind: resource.kind,
                    plural: resource.name,
                    namespaced,
                });
            }
        }

        catalog.sort_by(|a, b| {
            a.group_version
                .cmp(&b.group_version)
                .then_with(|| a.plural.cmp(&b.plural))
        });
        catalog.dedup_by(|a, b| a.group_version == b.group_version && a.plural == b.plural);
        catalog
    }
}
