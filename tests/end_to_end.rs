//! End-to-end export tests
//!
//! Runs discovery and the exporter against an in-memory cluster and checks the resulting
//! directory tree on disk.

mod common;

use std::path::{Path, PathBuf};

use common::{FakeCluster, list_tree, read_yaml};
use insta::assert_snapshot;
use kubedump::export::{
    Catalog, ExclusionPolicy, ExportOptions, Exporter, FailureTier, NameSanitizer, RunResult,
    prepare_output_root,
};
use kubedump::ExportError;
use serde_json::json;

fn quiet_options(root: &Path) -> ExportOptions {
    ExportOptions {
        quiet: true,
        ..ExportOptions::new(root)
    }
}

async fn export(
    cluster: FakeCluster,
    policy: ExclusionPolicy,
    options: ExportOptions,
) -> RunResult {
    prepare_output_root(&options).unwrap();
    let catalog = Catalog::new(policy).discover(&cluster).await.unwrap();
    Exporter::new(cluster, options, NameSanitizer::default())
        .run(&catalog)
        .await
}

fn demo_cluster() -> FakeCluster {
    FakeCluster::new()
        .with_kind("v1", "Namespace", "namespaces", false)
        .with_kind("v1", "ConfigMap", "configmaps", true)
        .with_kind("apps/v1", "Deployment", "deployments", true)
        .with_object(
            "v1",
            "namespaces",
            json!({
                "apiVersion": "v1",
                "kind": "Namespace",
                "metadata": {
                    "name": "demo",
                    "managedFields": [{"manager": "kubectl", "operation": "Apply"}]
                }
            }),
        )
        .with_object(
            "apps/v1",
            "deployments",
            json!({
                "apiVersion": "apps/v1",
                "kind": "Deployment",
                "metadata": {"name": "web", "namespace": "prod"},
                "spec": {"replicas": 2}
            }),
        )
        .with_object(
            "v1",
            "configmaps",
            json!({
                "apiVersion": "v1",
                "kind": "ConfigMap",
                "metadata": {"name": "weird:name!", "namespace": "default"},
                "data": {"key": "value"}
            }),
        )
}

#[tokio::test]
async fn test_cluster_scoped_namespace_written() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("out");

    let result = export(demo_cluster(), ExclusionPolicy::default(), quiet_options(&root)).await;

    let path = root.join("_cluster/Namespace/demo.yaml");
    assert!(path.exists());
    assert_eq!(result.files_written, 3);
    assert!(result.failures.is_empty());

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_snapshot!(contents, @r"
    apiVersion: v1
    kind: Namespace
    metadata:
      name: demo
    ");
}

#[tokio::test]
async fn test_namespaced_deployment_in_group_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("out");

    export(demo_cluster(), ExclusionPolicy::default(), quiet_options(&root)).await;

    let doc = read_yaml(&root.join("prod/apps_Deployment/web.yaml"));
    assert_eq!(doc["spec"]["replicas"], 2);
    assert_eq!(doc["metadata"]["namespace"], "prod");
}

#[tokio::test]
async fn test_hazardous_name_sanitized_in_path_only() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("out");

    export(demo_cluster(), ExclusionPolicy::default(), quiet_options(&root)).await;

    let doc = read_yaml(&root.join("default/ConfigMap/weird_name_.yaml"));
    assert_eq!(doc["metadata"]["name"], "weird:name!");
}

#[tokio::test]
async fn test_forbidden_kind_does_not_stop_run() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("out");

    let cluster = demo_cluster()
        .with_kind("apps/v1", "ReplicaSet", "replicasets", true)
        .forbid("apps/v1", "replicasets");
    // replicasets are excluded by default, so start from an empty table
    let result = export(cluster, ExclusionPolicy::empty(), quiet_options(&root)).await;

    assert_eq!(result.files_written, 3);
    assert_eq!(result.kinds_processed, 4);
    let kind_failures: Vec<_> = result.failures_in(FailureTier::Kind).collect();
    assert_eq!(kind_failures.len(), 1);
    assert_eq!(kind_failures[0].subject, "apps/v1/replicasets");
    assert!(kind_failures[0].reason.contains("forbidden"));
    assert!(!root.join("prod/apps_ReplicaSet").exists());
}

#[tokio::test]
async fn test_pod_logs_captured_per_container() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("out");

    let cluster = FakeCluster::new()
        .with_kind("v1", "Pod", "pods", true)
        .with_pod("prod", "web-0", &["app", "sidecar"])
        .with_log("prod", "web-0", "app", "started\nlistening on :8080\n");

    let result = export(cluster, ExclusionPolicy::default(), quiet_options(&root)).await;

    assert_eq!(result.files_written, 1);
    assert_eq!(result.log_files_written, 1);
    assert_eq!(
        list_tree(&root),
        vec![
            PathBuf::from("prod/Pod/web-0.yaml"),
            PathBuf::from("prod/Pod/web-0_app_logs.txt"),
        ]
    );
    assert_eq!(
        std::fs::read_to_string(root.join("prod/Pod/web-0_app_logs.txt")).unwrap(),
        "started\nlistening on :8080\n"
    );

    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].tier, FailureTier::Container);
    assert_eq!(result.failures[0].subject, "prod/web-0/sidecar");
}

#[tokio::test]
async fn test_logs_skipped_when_capture_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("out");

    let cluster = FakeCluster::new()
        .with_kind("v1", "Pod", "pods", true)
        .with_pod("prod", "web-0", &["app"])
        .with_log("prod", "web-0", "app", "hello\n");
    let options = ExportOptions {
        capture_logs: false,
        ..quiet_options(&root)
    };

    let result = export(cluster, ExclusionPolicy::default(), options).await;
    assert_eq!(result.log_files_written, 0);
    assert_eq!(list_tree(&root), vec![PathBuf::from("prod/Pod/web-0.yaml")]);
}

#[tokio::test]
async fn test_secret_payload_redacted_by_default() {
    let secret = json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {"name": "db", "namespace": "prod"},
        "type": "Opaque",
        "data": {"password": "aHVudGVyMg=="}
    });
    let cluster = FakeCluster::new()
        .with_kind("v1", "Secret", "secrets", true)
        .with_object("v1", "secrets", secret);

    let dir = tempfile::tempdir().unwrap();
    let redacted_root = dir.path().join("redacted");
    export(cluster.clone(), ExclusionPolicy::default(), quiet_options(&redacted_root)).await;
    let doc = read_yaml(&redacted_root.join("prod/Secret/db.yaml"));
    assert!(doc.get("data").is_none());
    assert_eq!(doc["type"], "Opaque");

    let full_root = dir.path().join("full");
    let options = ExportOptions {
        include_secrets: true,
        ..quiet_options(&full_root)
    };
    export(cluster, ExclusionPolicy::default(), options).await;
    let doc = read_yaml(&full_root.join("prod/Secret/db.yaml"));
    assert_eq!(doc["data"]["password"], "aHVudGVyMg==");
}

#[tokio::test]
async fn test_excluded_kinds_never_listed() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("out");

    // Forbidden but excluded: no failure because it is never listed
    let cluster = demo_cluster()
        .with_kind("v1", "Event", "events", true)
        .forbid("v1", "events");
    let result = export(cluster, ExclusionPolicy::default(), quiet_options(&root)).await;

    assert!(result.failures.is_empty());
    assert_eq!(result.kinds_processed, 3);
}

#[tokio::test]
async fn test_existing_output_root_refused() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("out");
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("keep.txt"), "previous export").unwrap();

    let err = prepare_output_root(&quiet_options(&root)).unwrap_err();
    assert!(matches!(err, ExportError::OutputExists(_)));
    assert_eq!(list_tree(&root), vec![PathBuf::from("keep.txt")]);
}

#[tokio::test]
async fn test_remove_out_dir_gives_fresh_tree() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("out");
    std::fs::create_dir_all(root.join("stale/ConfigMap")).unwrap();
    std::fs::write(root.join("stale/ConfigMap/old.yaml"), "old").unwrap();

    let options = ExportOptions {
        remove_existing_output: true,
        ..quiet_options(&root)
    };
    export(demo_cluster(), ExclusionPolicy::default(), options).await;

    assert_eq!(
        list_tree(&root),
        vec![
            PathBuf::from("_cluster/Namespace/demo.yaml"),
            PathBuf::from("default/ConfigMap/weird_name_.yaml"),
            PathBuf::from("prod/apps_Deployment/web.yaml"),
        ]
    );
}

#[tokio::test]
async fn test_repeated_exports_are_identical() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first");
    let second = dir.path().join("second");

    let serial = ExportOptions {
        concurrency: 1,
        ..quiet_options(&first)
    };
    export(demo_cluster(), ExclusionPolicy::default(), serial).await;
    export(demo_cluster(), ExclusionPolicy::default(), quiet_options(&second)).await;

    let tree = list_tree(&first);
    assert_eq!(tree, list_tree(&second));
    for file in tree {
        assert_eq!(
            std::fs::read(first.join(&file)).unwrap(),
            std::fs::read(second.join(&file)).unwrap(),
            "{} differs",
            file.display()
        );
    }
}
