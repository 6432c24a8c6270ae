//! Kubernetes client module
//!
//! Builds the `kube::Client` the exporter talks through. The connection is chosen in this
//! order:
//! 1. An explicit kubeconfig file (`--kubeconfig`), optionally with a named context
//! 2. A named context from the default kubeconfig (`--context`)
//! 3. The default loading strategy: in-cluster config, `KUBECONFIG`, then `~/.kube/config`
//!
//! Proxies declared in the kubeconfig (`proxy-url`, HTTP or SOCKS5) are honoured.

pub mod cluster;

pub use cluster::{ClusterApi, DEFAULT_PAGE_SIZE, KubeCluster, LogStream};

#[cfg(test)]
pub use cluster::MockClusterApi;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

/// Initialize and return a Kubernetes client
pub async fn create_client(
    context: Option<&str>,
    kubeconfig: Option<&Path>,
    connect_timeout: Duration,
) -> Result<Client> {
    let options = KubeConfigOptions {
        context: context.map(str::to_string),
        ..Default::default()
    };

    let mut config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .with_context(|| format!("Failed to read kubeconfig {}", path.display()))?;
            Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .with_context(|| format!("Failed to load kubeconfig {}", path.display()))?
        }
        None if context.is_some() => Config::from_kubeconfig(&options)
            .await
            .with_context(|| format!("Failed to load context {}", context.unwrap_or_default()))?,
        None => Config::infer()
            .await
            .context("Failed to infer Kubernetes configuration")?,
    };
    config.connect_timeout = Some(connect_timeout);

    tracing::debug!("Connecting to {}", config.cluster_url);
    let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
    Ok(client)
}

/// Name of the context that will be used, for display only.
///
/// Returns `None` when running with in-cluster config or when no kubeconfig is readable.
pub fn current_context(context: Option<&str>, kubeconfig: Option<&Path>) -> Option<String> {
    if let Some(context) = context {
        return Some(context.to_string());
    }
    let kubeconfig = match kubeconfig {
        Some(path) => Kubeconfig::read_from(path).ok()?,
        None => Kubeconfig::read().ok()?,
    };
    kubeconfig.current_context
}
