//! Offline export of a manifest file
//!
//! Reads a `---` separated multi-document YAML file and places every object in the output
//! tree exactly as a cluster export would. No cluster is contacted, so there is no log
//! capture. Documents are all parsed before anything is written: one unreadable document
//! makes the whole file unusable.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ExportError, ObjectError};
use crate::export::options::ExportOptions;
use crate::export::paths::{NameSanitizer, PathResolver};
use crate::export::result::{Failure, FailureTier, ItemOutcome, RunAccumulator, RunResult};
use crate::export::transform::{Transformer, object_name, object_namespace};
use crate::export::writer::InstanceWriter;
use crate::models::split_group_version;

/// Parse every document of a manifest file.
///
/// Empty documents (a leading `---`, trailing separators) are skipped.
pub fn parse_documents(path: &Path, contents: &str) -> Result<Vec<Value>, ExportError> {
    let mut documents = Vec::new();
    for (index, document) in serde_yaml::Deserializer::from_str(contents).enumerate() {
        let value = Value::deserialize(document).map_err(|source| ExportError::ParseManifest {
            path: path.to_path_buf(),
            index,
            source,
        })?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

/// Export the objects of `manifest` below `options.output_root`
pub async fn export_manifest(
    manifest: &Path,
    options: &ExportOptions,
    sanitizer: NameSanitizer,
) -> Result<RunResult, ExportError> {
    let contents =
        tokio::fs::read_to_string(manifest)
            .await
            .map_err(|source| ExportError::ReadManifest {
                path: manifest.to_path_buf(),
                source,
            })?;
    let documents = parse_documents(manifest, &contents)?;
    tracing::debug!(
        "Parsed {} documents from {}",
        documents.len(),
        manifest.display()
    );

    let writer = InstanceWriter::new(
        PathResolver::new(&options.output_root, sanitizer),
        Transformer::new(options.include_managed_fields, options.include_secrets),
        options.quiet,
    );
    let acc = RunAccumulator::default();
    let mut kinds = BTreeSet::new();

    for document in documents {
        let (api_version, kind) = match type_info(&document) {
            Ok(type_info) => type_info,
            Err(e) => {
                let subject = format!(
                    "{} document {}",
                    manifest.display(),
                    object_name(&document).unwrap_or("<unnamed>")
                );
                acc.record_instance(ItemOutcome::Skipped(Failure::new(
                    FailureTier::Instance,
                    subject,
                    e,
                )));
                continue;
            }
        };
        let (group, _) = split_group_version(&api_version);
        let namespaced = object_namespace(&document).is_some();
        if kinds.insert((group.to_string(), kind.clone())) {
            acc.kind_done();
        }

        let outcome = match writer
            .write_instance(group, &kind, namespaced, document)
            .await
        {
            Ok(written) => ItemOutcome::Written(written.target.path()),
            Err(failure) => ItemOutcome::Skipped(failure),
        };
        acc.record_instance(outcome);
    }

    Ok(acc.finish(false))
}

fn type_info(document: &Value) -> Result<(String, String), ObjectError> {
    let field = |key: &str| {
        document
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    match (field("apiVersion"), field("kind")) {
        (Some(api_version), Some(kind)) => Ok((api_version, kind)),
        _ => Err(ObjectError::MissingTypeInfo(
            object_name(document).unwrap_or("<unnamed>").to_string(),
        )),
    }
}
