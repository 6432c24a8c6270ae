//! Export pipeline
//!
//! Drives the catalog through a bounded pool of in-flight kinds. Each kind is listed, every
//! instance is written by one worker, and pods additionally get their container logs
//! captured. Nothing below the fatal tier stops the run; it only lands in the `RunResult`.

use std::future::Future;

use futures::StreamExt;

use crate::export::logs::LogCapturer;
use crate::export::options::ExportOptions;
use crate::export::paths::{NameSanitizer, PathResolver};
use crate::export::result::{Failure, FailureTier, ItemOutcome, RunAccumulator, RunResult};
use crate::export::transform::Transformer;
use crate::export::writer::InstanceWriter;
use crate::kube::ClusterApi;
use crate::models::ResourceKindDescriptor;
use serde_json::Value;

/// Exports catalog kinds from one cluster
pub struct Exporter<C: ClusterApi> {
    cluster: C,
    writer: InstanceWriter,
    options: ExportOptions,
}

impl<C: ClusterApi> Exporter<C> {
    pub fn new(cluster: C, options: ExportOptions, sanitizer: NameSanitizer) -> Self {
        let writer = InstanceWriter::new(
            PathResolver::new(&options.output_root, sanitizer),
            Transformer::new(options.include_managed_fields, options.include_secrets),
            options.quiet,
        );
        Self {
            cluster,
            writer,
            options,
        }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Export every kind in `catalog`
    pub async fn run(&self, catalog: &[ResourceKindDescriptor]) -> RunResult {
        self.run_until(catalog, std::future::pending()).await
    }

    /// Export every kind in `catalog`, stopping early once `shutdown` resolves.
    ///
    /// Kinds are handed out in catalog order. On shutdown the kinds still in flight are
    /// abandoned and the partial result is returned with `cancelled` set.
    pub async fn run_until<F>(&self, catalog: &[ResourceKindDescriptor], shutdown: F) -> RunResult
    where
        F: Future<Output = ()>,
    {
        let acc = RunAccumulator::default();
        let concurrency = self.options.concurrency.max(1);
        tracing::debug!(
            "Exporting {} resource kinds with {} workers",
            catalog.len(),
            concurrency
        );

        let cancelled = {
            let work = futures::stream::iter(catalog)
                .map(|kind| self.export_kind(kind, &acc))
                .buffer_unordered(concurrency)
                .for_each(|()| async {});

            tokio::select! {
                biased;
                () = shutdown => {
                    tracing::warn!("Export interrupted, returning partial results");
                    true
                }
                () = work => false,
            }
        };

        acc.finish(cancelled)
    }

    async fn export_kind(&self, kind: &ResourceKindDescriptor, acc: &RunAccumulator) {
        tracing::debug!("Listing {}", kind);

        match self.cluster.list(kind).await {
            Ok(objects) => {
                for object in objects {
                    self.export_instance(kind, object, acc).await;
                }
            }
            Err(e) => {
                acc.record_failure(Failure::new(
                    FailureTier::Kind,
                    kind.identifier(),
                    format!("{:#}", e),
                ));
            }
        }

        acc.kind_done();
    }

    async fn export_instance(
        &self,
        kind: &ResourceKindDescriptor,
        object: Value,
        acc: &RunAccumulator,
    ) {
        let written = match self
            .writer
            .write_instance(kind.group(), &kind.kind, kind.namespaced, object)
            .await
        {
            Ok(written) => written,
            Err(failure) => {
                acc.record_instance(ItemOutcome::Skipped(failure));
                return;
            }
        };
        acc.record_instance(ItemOutcome::Written(written.target.path()));

        if !(kind.is_pod() && self.options.capture_logs) {
            return;
        }
        let Some(namespace) = written.scope.namespace() else {
            return;
        };

        let capturer = LogCapturer::new(
            &self.cluster,
            self.writer.resolver(),
            self.options.request_timeout,
            self.options.quiet,
        );
        for outcome in capturer
            .capture(namespace, &written.name, &written.target.directory)
            .await
        {
            acc.record_log(outcome);
        }
    }
}
