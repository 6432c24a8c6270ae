//! In-memory cluster shared by the integration tests

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kubedump::ClusterApi;
use kubedump::kube::LogStream;
use kubedump::models::{RawResource, RawResourceList, ResourceKindDescriptor};
use serde_json::{Value, json};

/// A cluster whose discovery, objects and logs are fixed up front
#[derive(Debug, Default, Clone)]
pub struct FakeCluster {
    resources: BTreeMap<String, Vec<RawResource>>,
    objects: BTreeMap<String, Vec<Value>>,
    forbidden: BTreeSet<String>,
    pods: BTreeMap<(String, String), Value>,
    logs: BTreeMap<(String, String, String), String>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a kind in discovery
    pub fn with_kind(
        mut self,
        group_version: &str,
        kind: &str,
        plural: &str,
        namespaced: bool,
    ) -> Self {
        self.resources
            .entry(group_version.to_string())
            .or_default()
            .push(RawResource {
                name: plural.to_string(),
                kind: kind.to_string(),
                namespaced: Some(namespaced),
                verbs: Some(vec!["get".to_string(), "list".to_string(), "watch".to_string()]),
            });
        self
    }

    /// Add an instance, returned by `list` for `group_version/plural`
    pub fn with_object(mut self, group_version: &str, plural: &str, object: Value) -> Self {
        self.objects
            .entry(format!("{}/{}", group_version, plural))
            .or_default()
            .push(object);
        self
    }

    /// Make listing `group_version/plural` fail with a permission error
    pub fn forbid(mut self, group_version: &str, plural: &str) -> Self {
        self.forbidden.insert(format!("{}/{}", group_version, plural));
        self
    }

    /// Add a pod (listed and fetchable) with the given containers
    pub fn with_pod(mut self, namespace: &str, name: &str, containers: &[&str]) -> Self {
        let containers: Vec<Value> = containers
            .iter()
            .map(|c| json!({"name": c, "image": "busybox"}))
            .collect();
        let pod = json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {"name": name, "namespace": namespace},
            "spec": {"containers": containers}
        });
        self.pods
            .insert((namespace.to_string(), name.to_string()), pod.clone());
        self.with_object("v1", "pods", pod)
    }

    /// Log text served for one container; containers without logs fail to stream
    pub fn with_log(mut self, namespace: &str, pod: &str, container: &str, text: &str) -> Self {
        self.logs.insert(
            (namespace.to_string(), pod.to_string(), container.to_string()),
            text.to_string(),
        );
        self
    }
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn preferred_resources(&self) -> Result<Vec<RawResourceList>> {
        Ok(self
            .resources
            .iter()
            .map(|(group_version, resources)| RawResourceList {
                group_version: group_version.clone(),
                resources: resources.clone(),
            })
            .collect())
    }

    async fn list(&self, kind: &ResourceKindDescriptor) -> Result<Vec<Value>> {
        let identifier = kind.identifier();
        if self.forbidden.contains(&identifier) {
            anyhow::bail!(
                "{} is forbidden: User \"viewer\" cannot list resource \"{}\"",
                identifier,
                kind.plural
            );
        }
        Ok(self.objects.get(&identifier).cloned().unwrap_or_default())
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod> {
        let pod = self
            .pods
            .get(&(namespace.to_string(), name.to_string()))
            .ok_or_else(|| anyhow::anyhow!("pods \"{}\" not found", name))?;
        Ok(serde_json::from_value(pod.clone())?)
    }

    async fn log_stream(&self, namespace: &str, pod: &str, container: &str) -> Result<LogStream> {
        let text = self
            .logs
            .get(&(namespace.to_string(), pod.to_string(), container.to_string()))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "container \"{}\" in pod \"{}\" is waiting to start",
                    container,
                    pod
                )
            })?;
        Ok(Box::pin(futures::io::Cursor::new(text.clone().into_bytes())))
    }
}

/// Every file below `root`, relative and sorted
pub fn list_tree(root: &Path) -> Vec<PathBuf> {
    fn walk(dir: &Path, root: &Path, out: &mut Vec<PathBuf>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(&path, root, out);
            } else if let Ok(relative) = path.strip_prefix(root) {
                out.push(relative.to_path_buf());
            }
        }
    }

    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}

/// Parse one exported file back into a document
pub fn read_yaml(path: &Path) -> Value {
    let contents = std::fs::read_to_string(path).unwrap();
    serde_yaml::from_str(&contents).unwrap()
}
