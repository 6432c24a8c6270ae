//! Pod log capture
//!
//! Writes one `<pod>_<container>_logs.txt` per declared container next to the pod's YAML.
//! A container whose log cannot be opened or copied is recorded and skipped; the others
//! are still attempted.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Pod;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::compat::FuturesAsyncReadCompatExt;

use crate::export::paths::{PathResolver, check_path_component};
use crate::export::result::{Failure, FailureTier, ItemOutcome};
use crate::kube::ClusterApi;

/// Captures container logs for one pod at a time
pub struct LogCapturer<'a, C: ClusterApi + ?Sized> {
    cluster: &'a C,
    resolver: &'a PathResolver,
    timeout: Duration,
    quiet: bool,
}

impl<'a, C: ClusterApi + ?Sized> LogCapturer<'a, C> {
    pub fn new(cluster: &'a C, resolver: &'a PathResolver, timeout: Duration, quiet: bool) -> Self {
        Self {
            cluster,
            resolver,
            timeout,
            quiet,
        }
    }

    /// Capture every container of `namespace/pod` into `directory`
    pub async fn capture(&self, namespace: &str, pod: &str, directory: &Path) -> Vec<ItemOutcome> {
        let live = match self.cluster.get_pod(namespace, pod).await {
            Ok(live) => live,
            Err(e) => {
                return vec![ItemOutcome::Skipped(Failure::new(
                    FailureTier::Container,
                    format!("{}/{}", namespace, pod),
                    format!("failed to fetch pod: {:#}", e),
                ))];
            }
        };

        let mut outcomes = Vec::new();
        for container in container_names(&live) {
            let file_name = self.resolver.log_file_name(pod, &container);
            if let Err(e) = check_path_component(&file_name) {
                outcomes.push(ItemOutcome::Skipped(Failure::new(
                    FailureTier::Container,
                    format!("{}/{}/{}", namespace, pod, container),
                    e,
                )));
                continue;
            }
            let path = directory.join(file_name);
            match self.capture_container(namespace, pod, &container, &path).await {
                Ok(bytes) => {
                    if !self.quiet {
                        println!("Written: {}", path.display());
                    }
                    tracing::debug!("Wrote {} bytes of logs to {}", bytes, path.display());
                    outcomes.push(ItemOutcome::Written(path));
                }
                Err(e) => {
                    // Drop whatever was partially copied
                    match tokio::fs::remove_file(&path).await {
                        Ok(()) => {}
                        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                        Err(err) => tracing::warn!(
                            "Failed to remove partial log file {}: {}",
                            path.display(),
                            err
                        ),
                    }
                    outcomes.push(ItemOutcome::Skipped(Failure::new(
                        FailureTier::Container,
                        format!("{}/{}/{}", namespace, pod, container),
                        format!("{:#}", e),
                    )));
                }
            }
        }
        outcomes
    }

    async fn capture_container(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
        path: &Path,
    ) -> Result<u64> {
        let mut stream = self
            .cluster
            .log_stream(namespace, pod, container)
            .await?
            .compat();

        let file = tokio::fs::File::create(path)
            .await
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut sink = BufWriter::new(file);

        let copied = tokio::time::timeout(self.timeout, tokio::io::copy_buf(&mut stream, &mut sink))
            .await
            .map_err(|_| anyhow::anyhow!("timed out after {:?} copying log stream", self.timeout))?
            .context("failed to copy log stream")?;
        sink.flush().await.context("failed to flush log file")?;

        Ok(copied)
    }
}

/// Init containers first, then regular containers, in declaration order
pub fn container_names(pod: &Pod) -> Vec<String> {
    let Some(spec) = pod.spec.as_ref() else {
        return Vec::new();
    };
    spec.init_containers
        .iter()
        .flatten()
        .chain(spec.containers.iter())
        .map(|c| c.name.clone())
        .collect()
}
