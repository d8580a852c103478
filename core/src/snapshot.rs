use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ClassEntry, EnumMetadata, ModelMetadata};

/// Owned, serializable view of a registry after the registration phase.
///
/// Generators receive a snapshot instead of live registry references. Maps
/// are ordered so two snapshots of the same declarations serialize
/// identically.
///
/// # Examples
///
/// ```
/// use schema_registry_core::*;
///
/// let mut snapshot = SchemaSnapshot::new("2024-01-15T10:30:00Z");
/// snapshot
///     .models
///     .insert("User".into(), ModelMetadata::new("User", base_columns()));
///
/// assert_eq!(snapshot.model_count(), 1);
/// assert_eq!(snapshot.uniques_for_model("User"), Some(vec!["id"]));
/// assert!(snapshot.get_enum("User", "status").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    /// Snapshot contract version (populated from
    /// [`SCHEMA_CONTRACT_VERSION`](crate::SCHEMA_CONTRACT_VERSION)).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// ISO-8601 timestamp for snapshot creation.
    pub generated_at: String,
    /// SHA-256 of the snapshot content, excluding this field and `generated_at`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_hash: Option<String>,
    /// Names excluded from the model map, sorted.
    #[serde(default)]
    pub interfaces: Vec<String>,
    pub models: BTreeMap<String, ModelMetadata>,
    /// Model name -> column name -> enum.
    #[serde(default)]
    pub enums: BTreeMap<String, BTreeMap<String, EnumMetadata>>,
    #[serde(default)]
    pub classes: BTreeMap<String, ClassEntry>,
}

impl SchemaSnapshot {
    /// Creates an empty snapshot.
    pub fn new(generated_at: impl Into<String>) -> Self {
        Self {
            schema_version: Some(crate::SCHEMA_CONTRACT_VERSION.to_string()),
            generated_at: generated_at.into(),
            snapshot_hash: None,
            interfaces: Vec::new(),
            models: BTreeMap::new(),
            enums: BTreeMap::new(),
            classes: BTreeMap::new(),
        }
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn get_model(&self, name: &str) -> Option<&ModelMetadata> {
        self.models.get(name)
    }

    pub fn get_enum(&self, model_name: &str, column_name: &str) -> Option<&EnumMetadata> {
        self.enums.get(model_name)?.get(column_name)
    }

    /// Unique column names of `model_name`, or `None` if it is not a model.
    pub fn uniques_for_model(&self, model_name: &str) -> Option<Vec<&str>> {
        self.models.get(model_name).map(|m| m.unique_columns())
    }

    /// Iterates over `(model, column, enum)` triples in name order.
    pub fn enums_iter(&self) -> impl Iterator<Item = (&str, &str, &EnumMetadata)> {
        self.enums.iter().flat_map(|(model, columns)| {
            columns
                .iter()
                .map(move |(column, meta)| (model.as_str(), column.as_str(), meta))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColumnMetadata, FieldType};

    fn status_enum() -> EnumMetadata {
        EnumMetadata {
            name: "StatusEnum".into(),
            values: vec!["ACTIVE".into(), "INACTIVE".into()],
            location: Some("models/user.rs".into()),
        }
    }

    #[test]
    fn test_enums_iter_in_name_order() {
        let mut snapshot = SchemaSnapshot::new("2024-01-01T00:00:00Z");
        snapshot
            .enums
            .entry("User".into())
            .or_default()
            .insert("status".into(), status_enum());
        snapshot
            .enums
            .entry("Order".into())
            .or_default()
            .insert("state".into(), status_enum());

        let keys: Vec<(&str, &str)> = snapshot.enums_iter().map(|(m, c, _)| (m, c)).collect();
        assert_eq!(keys, vec![("Order", "state"), ("User", "status")]);
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let mut a = SchemaSnapshot::new("2024-01-01T00:00:00Z");
        let mut b = SchemaSnapshot::new("2024-01-01T00:00:00Z");
        for name in ["Post", "User", "Comment"] {
            a.models.insert(name.into(), ModelMetadata::new(name, Vec::new()));
        }
        for name in ["Comment", "User", "Post"] {
            b.models.insert(name.into(), ModelMetadata::new(name, Vec::new()));
        }

        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_yaml_roundtrip_keeps_columns() {
        let mut snapshot = SchemaSnapshot::new("2024-01-01T00:00:00Z");
        let mut model = ModelMetadata::new("User", Vec::new());
        model.columns.push(ColumnMetadata::new("email", FieldType::Email));
        snapshot.models.insert("User".into(), model);

        let yaml = serde_yaml::to_string(&snapshot).unwrap();
        let decoded: SchemaSnapshot = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(decoded, snapshot);
    }
}
