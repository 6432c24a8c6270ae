//! Instance writer
//!
//! Places one object in the output tree: scope, directory, sanitized file name,
//! redaction, YAML serialization. Each failing step turns into a `Failure` carrying the
//! most specific subject known at that point.

use serde_json::Value;

use crate::export::paths::{ExportTarget, PathResolver, Scope, check_path_component};
use crate::export::result::{Failure, FailureTier};
use crate::export::transform::{Transformer, object_name, object_namespace};

/// An instance that made it to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenInstance {
    pub scope: Scope,
    /// Original, unsanitized `metadata.name`
    pub name: String,
    pub target: ExportTarget,
}

/// Writes transformed instances below the output root
#[derive(Debug, Clone)]
pub struct InstanceWriter {
    resolver: PathResolver,
    transformer: Transformer,
    quiet: bool,
}

impl InstanceWriter {
    pub fn new(resolver: PathResolver, transformer: Transformer, quiet: bool) -> Self {
        Self {
            resolver,
            transformer,
            quiet,
        }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Transform `object` and write it to `<scope>/<group_kind>/<name>.yaml`
    pub async fn write_instance(
        &self,
        group: &str,
        kind: &str,
        namespaced: bool,
        object: Value,
    ) -> Result<WrittenInstance, Failure> {
        let bucket = if group.is_empty() {
            kind.to_string()
        } else {
            format!("{}/{}", group, kind)
        };

        let name = object_name(&object)
            .map_err(|e| Failure::new(FailureTier::Instance, format!("{} <unnamed>", bucket), e))?
            .to_string();

        let scope = if namespaced {
            match object_namespace(&object) {
                Some(ns) => Scope::Namespace(ns.to_string()),
                None => {
                    return Err(Failure::new(
                        FailureTier::Instance,
                        format!("{} {}", bucket, name),
                        crate::error::ObjectError::MissingNamespace(name.clone()),
                    ));
                }
            }
        } else {
            Scope::Cluster
        };

        // Scope, group and kind come from the object itself in offline mode
        let target = self.resolver.resolve(&scope, group, kind, &name);
        let group_component = (!group.is_empty()).then_some(group);
        [
            Some(scope.label()),
            group_component,
            Some(kind),
            Some(target.file_name.as_str()),
        ]
        .into_iter()
        .flatten()
        .try_for_each(check_path_component)
            .map_err(|e| Failure::new(FailureTier::Instance, format!("{} {}", bucket, name), e))?;
        let path = target.path();

        tokio::fs::create_dir_all(&target.directory)
            .await
            .map_err(|e| {
                Failure::new(
                    FailureTier::Instance,
                    target.directory.display().to_string(),
                    format!("failed to create directory: {}", e),
                )
            })?;

        let transformed = self
            .transformer
            .transform(group, kind, object)
            .map_err(|e| Failure::new(FailureTier::Instance, path.display().to_string(), e))?;

        let yaml = serde_yaml::to_string(&transformed).map_err(|e| {
            Failure::new(
                FailureTier::Instance,
                path.display().to_string(),
                format!("failed to serialize YAML: {}", e),
            )
        })?;

        tokio::fs::write(&path, yaml).await.map_err(|e| {
            Failure::new(
                FailureTier::Instance,
                path.display().to_string(),
                format!("failed to write file: {}", e),
            )
        })?;

        if !self.quiet {
            println!("Written: {}", path.display());
        }
        tracing::debug!("Wrote {}", path.display());

        Ok(WrittenInstance {
            scope,
            name,
            target,
        })
    }
}
