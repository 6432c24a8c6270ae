//! Object redaction before serialization
//!
//! Objects are handled as untyped `serde_json::Value` documents since their schema varies
//! per kind. Key order is preserved (serde_json `preserve_order`), so removing an entry never
//! reshuffles its siblings.

use serde_json::{Map, Value};

use crate::error::ObjectError;

const MANAGED_FIELDS: &str = "managedFields";
const SECRET_KIND: &str = "Secret";
const SECRET_PAYLOAD_FIELDS: &[&str] = &["data", "stringData"];

/// Redaction settings applied to every exported object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transformer {
    pub include_managed_fields: bool,
    pub include_secrets: bool,
}

impl Transformer {
    pub fn new(include_managed_fields: bool, include_secrets: bool) -> Self {
        Self {
            include_managed_fields,
            include_secrets,
        }
    }

    /// Redact `object` of the given group and kind.
    ///
    /// Fails only when the object has no `metadata` mapping.
    pub fn transform(
        &self,
        group: &str,
        kind: &str,
        mut object: Value,
    ) -> Result<Value, ObjectError> {
        let root = object.as_object_mut().ok_or(ObjectError::MissingMetadata)?;
        let metadata = root
            .get_mut("metadata")
            .and_then(Value::as_object_mut)
            .ok_or(ObjectError::MissingMetadata)?;

        if !self.include_managed_fields {
            metadata.shift_remove(MANAGED_FIELDS);
        }

        if !self.include_secrets && is_secret(group, kind) {
            redact_secret_payload(root);
        }

        Ok(object)
    }
}

fn is_secret(group: &str, kind: &str) -> bool {
    group.is_empty() && kind == SECRET_KIND
}

fn redact_secret_payload(root: &mut Map<String, Value>) {
    for field in SECRET_PAYLOAD_FIELDS {
        if root.shift_remove(*field).is_some() {
            tracing::debug!("Redacted secret field {}", field);
        }
    }
}

/// `metadata.name` of an object
pub fn object_name(object: &Value) -> Result<&str, ObjectError> {
    let metadata = object
        .get("metadata")
        .filter(|m| m.is_object())
        .ok_or(ObjectError::MissingMetadata)?;
    metadata
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or(ObjectError::MissingName)
}

/// `metadata.namespace` of an object, `None` when absent or empty
pub fn object_namespace(object: &Value) -> Option<&str> {
    object
        .get("metadata")
        .and_then(|m| m.get("namespace"))
        .and_then(Value::as_str)
        .filter(|ns| !ns.is_empty())
}
