//! Project properties and patch documents
//!
//! Projects carry a free-form key/value property bag. Mutations are expressed as an
//! ordered list of patch operations sent in a single request so the platform applies
//! them as one unit. This module provides the operation types and the builder that
//! guarantees one document never carries two operations for the same key.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Property bag for one project, ordered by key.
pub type PropertyMap = BTreeMap<String, String>;

/// Well-known property keys.
///
/// These are conventions used when stamping projects created by this client; the
/// platform accepts any key.
pub struct ProjectProperties;

impl ProjectProperties {
    /// Who created the project
    pub const CREATED_BY: &'static str = "Created By";

    /// When the project was created (RFC 3339)
    pub const CREATED_DATE: &'static str = "Created Date";

    /// Billing cost code
    pub const COST_CODE: &'static str = "Cost Code";

    /// All well-known keys
    pub const ALL: [&'static str; 3] = [Self::CREATED_BY, Self::CREATED_DATE, Self::COST_CODE];

    /// Build the provenance properties for a newly created project.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use devops_model::ProjectProperties;
    ///
    /// let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
    /// let props = ProjectProperties::provenance("provisioner", at);
    /// assert_eq!(props[ProjectProperties::CREATED_BY], "provisioner");
    /// assert_eq!(props[ProjectProperties::CREATED_DATE], "2026-03-01T09:30:00Z");
    /// ```
    pub fn provenance(created_by: &str, at: DateTime<Utc>) -> PropertyMap {
        let mut properties = PropertyMap::new();
        properties.insert(Self::CREATED_BY.to_string(), created_by.to_string());
        properties.insert(
            Self::CREATED_DATE.to_string(),
            at.to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        properties
    }
}

/// Patch operation kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    /// Add or replace the value at the path
    Add,

    /// Remove the path
    Remove,
}

/// One add/remove instruction in a patch document.
///
/// `path` is always `/` followed by the property key. Remove operations carry no
/// value, and the `value` field is omitted from the wire form entirely so that a
/// removal can never be mistaken for an add with an empty string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatchOperation {
    /// Operation kind
    pub op: PatchOp,

    /// Target path (`/` + key)
    pub path: String,

    /// New value, present only for adds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl PatchOperation {
    /// Creates an add operation for a property key.
    pub fn add(key: &str, value: impl Into<String>) -> Self {
        Self {
            op: PatchOp::Add,
            path: Self::path_for(key),
            value: Some(value.into()),
        }
    }

    /// Creates a remove operation for a property key.
    pub fn remove(key: &str) -> Self {
        Self {
            op: PatchOp::Remove,
            path: Self::path_for(key),
            value: None,
        }
    }

    /// The property key this operation targets.
    pub fn key(&self) -> &str {
        self.path.strip_prefix('/').unwrap_or(&self.path)
    }

    fn path_for(key: &str) -> String {
        format!("/{}", key)
    }
}

/// An ordered list of patch operations submitted as one request body.
///
/// Pushing an operation whose path is already present replaces the earlier one in
/// place, keeping the original position.
///
/// # Examples
///
/// ```
/// use devops_model::{PatchDocument, PatchOperation};
///
/// let mut doc = PatchDocument::new();
/// doc.push(PatchOperation::add("Cost Code", "X1"));
/// doc.push(PatchOperation::remove("Cost Code"));
/// assert_eq!(doc.len(), 1);
/// assert!(doc.operations()[0].value.is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PatchDocument {
    operations: Vec<PatchOperation>,
}

impl PatchDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// One add operation per entry, in key order.
    pub fn additions(properties: &PropertyMap) -> Self {
        let mut doc = Self::new();
        for (key, value) in properties {
            doc.push(PatchOperation::add(key, value.as_str()));
        }
        doc
    }

    /// One remove operation per key, in the order given.
    pub fn removals<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut doc = Self::new();
        for key in keys {
            doc.push(PatchOperation::remove(key.as_ref()));
        }
        doc
    }

    /// Append an operation, replacing any earlier operation on the same path.
    pub fn push(&mut self, operation: PatchOperation) {
        match self.operations.iter_mut().find(|op| op.path == operation.path) {
            Some(existing) => *existing = operation,
            None => self.operations.push(operation),
        }
    }

    /// The operations in submission order.
    pub fn operations(&self) -> &[PatchOperation] {
        &self.operations
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the document has no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_add_wire_form() {
        let op = PatchOperation::add("Cost Code", "X123");
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"op": "add", "path": "/Cost Code", "value": "X123"})
        );
    }

    #[test]
    fn test_remove_omits_value() {
        let json = serde_json::to_value(PatchOperation::remove("CostCode")).unwrap();
        assert_eq!(json, serde_json::json!({"op": "remove", "path": "/CostCode"}));
        assert!(json.get("value").is_none());
    }

    #[test]
    fn test_add_with_empty_value_keeps_value() {
        let json = serde_json::to_value(PatchOperation::add("Notes", "")).unwrap();
        assert_eq!(json["value"], "");
    }

    #[test]
    fn test_additions_follow_key_order() {
        let mut properties = PropertyMap::new();
        properties.insert("b".to_string(), "2".to_string());
        properties.insert("a".to_string(), "1".to_string());

        let doc = PatchDocument::additions(&properties);
        let paths: Vec<&str> = doc.operations().iter().map(|op| op.path.as_str()).collect();
        assert_eq!(paths, vec!["/a", "/b"]);
        assert!(doc.operations().iter().all(|op| op.op == PatchOp::Add));
    }

    #[test]
    fn test_removals_deduplicate_keys() {
        let doc = PatchDocument::removals(["Cost Code", "Created By", "Cost Code"]);
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.operations()[0].key(), "Cost Code");
        assert_eq!(doc.operations()[1].key(), "Created By");
    }

    #[test]
    fn test_push_replaces_in_place() {
        let mut doc = PatchDocument::new();
        doc.push(PatchOperation::add("a", "1"));
        doc.push(PatchOperation::add("b", "2"));
        doc.push(PatchOperation::add("a", "3"));

        assert_eq!(doc.len(), 2);
        assert_eq!(doc.operations()[0], PatchOperation::add("a", "3"));
    }

    #[test]
    fn test_document_serializes_as_array() {
        let doc = PatchDocument::removals(["x"]);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json, serde_json::json!([{"op": "remove", "path": "/x"}]));
    }

    #[test]
    fn test_provenance() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let props = ProjectProperties::provenance("dashboard", at);

        assert_eq!(props.len(), 2);
        assert_eq!(props["Created By"], "dashboard");
        assert_eq!(props["Created Date"], "2026-01-02T03:04:05Z");
        assert!(!props.contains_key(ProjectProperties::COST_CODE));
    }
}
