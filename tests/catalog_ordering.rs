//! Catalog ordering tests
//!
//! The work list must not depend on the order in which the API server returns groups or
//! the resources inside them.

mod common;

use common::FakeCluster;
use kubedump::export::{Catalog, ExclusionPolicy};
use kubedump::models::{RawResource, RawResourceList, ResourceKindDescriptor};

fn resource(name: &str, kind: &str, namespaced: Option<bool>) -> RawResource {
    RawResource {
        name: name.to_string(),
        kind: kind.to_string(),
        namespaced,
        verbs: Some(vec!["list".to_string()]),
    }
}

fn server_lists() -> Vec<RawResourceList> {
    vec![
        RawResourceList {
            group_version: "v1".to_string(),
            resources: vec![
                resource("services", "Service", Some(true)),
                resource("namespaces", "Namespace", Some(false)),
                resource("pods", "Pod", Some(true)),
                resource("pods/log", "Pod", Some(true)),
                resource("events", "Event", Some(true)),
            ],
        },
        RawResourceList {
            group_version: "apps/v1".to_string(),
            resources: vec![
                resource("statefulsets", "StatefulSet", Some(true)),
                resource("deployments", "Deployment", Some(true)),
                resource("replicasets", "ReplicaSet", Some(true)),
            ],
        },
        RawResourceList {
            group_version: "rbac.authorization.k8s.io/v1".to_string(),
            resources: vec![
                resource("roles", "Role", Some(true)),
                resource("clusterroles", "ClusterRole", None),
            ],
        },
    ]
}

fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let first = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, first.clone());
            out.push(tail);
        }
    }
    out
}

fn identifiers(catalog: &[ResourceKindDescriptor]) -> Vec<String> {
    catalog.iter().map(ResourceKindDescriptor::identifier).collect()
}

#[test]
fn test_catalog_sorted_by_group_version_then_plural() {
    let catalog = Catalog::default().build(server_lists());
    assert_eq!(
        identifiers(&catalog),
        vec![
            "apps/v1/deployments",
            "apps/v1/statefulsets",
            "rbac.authorization.k8s.io/v1/clusterroles",
            "rbac.authorization.k8s.io/v1/roles",
            "v1/namespaces",
            "v1/pods",
            "v1/services",
        ]
    );
}

#[test]
fn test_catalog_invariant_under_permutation() {
    let catalog = Catalog::default();
    let expected = catalog.build(server_lists());

    for mut lists in permutations(&server_lists()) {
        for list in &mut lists {
            list.resources.reverse();
        }
        assert_eq!(catalog.build(lists), expected);
    }
}

#[test]
fn test_missing_namespaced_flag_means_cluster_scoped() {
    let catalog = Catalog::default().build(server_lists());
    let clusterroles = catalog
        .iter()
        .find(|d| d.plural == "clusterroles")
        .unwrap();
    assert!(!clusterroles.namespaced);
}

#[test]
fn test_empty_policy_keeps_everything_listable() {
    let catalog = Catalog::new(ExclusionPolicy::empty()).build(server_lists());
    // Only the pods/log subresource is dropped
    assert_eq!(catalog.len(), 9);
}

#[tokio::test]
async fn test_discovery_through_cluster_matches_build() {
    let cluster = FakeCluster::new()
        .with_kind("v1", "Pod", "pods", true)
        .with_kind("apps/v1", "Deployment", "deployments", true)
        .with_kind("v1", "Namespace", "namespaces", false)
        .with_kind("apps/v1", "ReplicaSet", "replicasets", true);

    let catalog = Catalog::default().discover(&cluster).await.unwrap();
    assert_eq!(
        identifiers(&catalog),
        vec!["apps/v1/deployments", "v1/namespaces", "v1/pods"]
    );
}
