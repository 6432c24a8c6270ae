//! Cluster access used by the export pipeline
//!
//! `ClusterApi` is the seam between the exporter and the API server. `KubeCluster`
//! implements it with kube-rs; tests substitute an in-memory cluster.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::AsyncBufRead;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResourceList;
use kube::Client;
use kube::api::{Api, ListParams, LogParams};
use kube::core::Request;
use serde_json::{Map, Value};

use crate::models::{RawResource, RawResourceList, ResourceKindDescriptor};

/// Raw byte stream of one container's log
pub type LogStream = Pin<Box<dyn AsyncBufRead + Send>>;

/// Objects requested per list call
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Everything the exporter needs from a control plane
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Resource lists for the preferred version of every served group
    async fn preferred_resources(&self) -> Result<Vec<RawResourceList>>;

    /// All instances of a kind across all namespaces
    async fn list(&self, kind: &ResourceKindDescriptor) -> Result<Vec<Value>>;

    /// Fetch one pod
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod>;

    /// Open the (non-following) log stream of one container
    async fn log_stream(&self, namespace: &str, pod: &str, container: &str) -> Result<LogStream>;
}

/// `ClusterApi` backed by a live kube-rs client
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
    request_timeout: Duration,
    page_size: u32,
}

impl KubeCluster {
    pub fn new(client: Client, request_timeout: Duration) -> Self {
        Self {
            client,
            request_timeout,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Run one API call under the request deadline
    async fn with_deadline<T, F>(&self, what: &str, call: F) -> Result<T>
    where
        F: Future<Output = kube::Result<T>>,
    {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => result.with_context(|| format!("Failed to {}", what)),
            Err(_) => Err(anyhow::anyhow!(
                "Timed out after {:?} trying to {}",
                self.request_timeout,
                what
            )),
        }
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn preferred_resources(&self) -> Result<Vec<RawResourceList>> {
        let mut lists = Vec::new();

        let core = self
            .with_deadline(
                "list core API versions",
                self.client.list_core_api_versions(),
            )
            .await?;
        if let Some(version) = core.versions.first() {
            let resources = self
                .with_deadline(
                    "list core API resources",
                    self.client.list_core_api_resources(version),
                )
                .await?;
            lists.push(convert_resource_list(resources));
        }

        let groups = self
            .with_deadline("list API groups", self.client.list_api_groups())
            .await?;
        for group in groups.groups {
            let Some(preferred) = group
                .preferred_version
                .as_ref()
                .or_else(|| group.versions.first())
            else {
                tracing::warn!("API group {} advertises no versions", group.name);
                continue;
            };

            // An unavailable aggregated API (e.g. metrics-server down) should not hide the rest
            match self
                .with_deadline(
                    "list API group resources",
                    self.client.list_api_group_resources(&preferred.group_version),
                )
                .await
            {
                Ok(resources) => lists.push(convert_resource_list(resources)),
                Err(e) => {
                    tracing::warn!(
                        group_version = %preferred.group_version,
                        "Skipping API group: {:#}",
                        e
                    );
                }
            }
        }

        Ok(lists)
    }

    async fn list(&self, kind: &ResourceKindDescriptor) -> Result<Vec<Value>> {
        // Pages are read as raw JSON so every object keeps the key order the server sent
        let request = Request::new(collection_path(kind));

        let mut documents = Vec::new();
        let mut params = ListParams::default().limit(self.page_size);
        loop {
            let http_request = request
                .list(&params)
                .with_context(|| format!("Failed to build list request for {}", kind))?;
            let mut page: Value = self
                .with_deadline(
                    &format!("list {}", kind.identifier()),
                    self.client.request::<Value>(http_request),
                )
                .await?;

            let next = page
                .pointer("/metadata/continue")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_string);

            if let Some(Value::Array(items)) = page.get_mut("items").map(Value::take) {
                for object in items {
                    documents.push(to_document(object, kind)?);
                }
            }

            match next {
                Some(token) => params = params.continue_token(&token),
                None => break,
            }
        }

        tracing::debug!("Listed {} instances of {}", documents.len(), kind);
        Ok(documents)
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        self.with_deadline(&format!("get pod {}/{}", namespace, name), api.get(name))
            .await
    }

    async fn log_stream(&self, namespace: &str, pod: &str, container: &str) -> Result<LogStream> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let params = LogParams {
            container: Some(container.to_string()),
            ..Default::default()
        };
        let stream = self
            .with_deadline(
                &format!("open log stream {}/{}/{}", namespace, pod, container),
                api.log_stream(pod, &params),
            )
            .await?;
        Ok(Box::pin(stream))
    }
}

fn convert_resource_list(list: APIResourceList) -> RawResourceList {
    RawResourceList {
        group_version: list.group_version,
        resources: list
            .resources
            .into_iter()
            .map(|r| RawResource {
                name: r.name,
                kind: r.kind,
                namespaced: Some(r.namespaced),
                verbs: Some(r.verbs),
            })
            .collect(),
    }
}

/// Cluster-wide collection URL of a kind
fn collection_path(kind: &ResourceKindDescriptor) -> String {
    if kind.group().is_empty() {
        format!("/api/{}/{}", kind.version(), kind.plural)
    } else {
        format!("/apis/{}/{}", kind.group_version, kind.plural)
    }
}

/// Convert a listed object into a document with `apiVersion` and `kind` first.
///
/// List responses usually omit the type of each item, so it is filled in from the descriptor.
/// Every other key keeps its position.
fn to_document(object: Value, kind: &ResourceKindDescriptor) -> Result<Value> {
    let Value::Object(mut fields) = object else {
        anyhow::bail!("{} list item is not a mapping", kind);
    };

    let mut document = Map::with_capacity(fields.len() + 2);
    let api_version = fields
        .shift_remove("apiVersion")
        .unwrap_or_else(|| Value::String(kind.group_version.clone()));
    let kind_value = fields
        .shift_remove("kind")
        .unwrap_or_else(|| Value::String(kind.kind.clone()));
    document.insert("apiVersion".to_string(), api_version);
    document.insert("kind".to_string(), kind_value);
    document.extend(fields);

    Ok(Value::Object(document))
}
