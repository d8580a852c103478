//! Snapshot diagnostics.
//!
//! The registry accepts every declaration it is given: duplicate columns,
//! relations to models that were never declared, enum columns without
//! values. Generators that cannot tolerate those call [`validate_snapshot`]
//! (or [`validate_model`]) and decide what to do with the findings.
//!
//! # Examples
//!
//! ```
//! use schema_registry_core::*;
//!
//! let mut snapshot = SchemaSnapshot::new("2024-01-01T00:00:00Z");
//! let mut post = ModelMetadata::new("Post", base_columns());
//! post.relations.push(RelationMetadata {
//!     rel_model_name: "User".into(),
//!     property_name: "author".into(),
//!     is_list: false,
//! });
//! snapshot.models.insert("Post".into(), post);
//!
//! let errors = validate_snapshot(&snapshot);
//! assert!(errors.iter().any(|e| matches!(e, ValidationError::UnknownRelationTarget { .. })));
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{FieldType, ModelMetadata, SchemaSnapshot};

/// A structural finding in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A model is keyed under an empty name.
    #[error("model name cannot be empty")]
    EmptyModelName,
    /// The map key and the model's own name disagree.
    #[error("model keyed as {key} is named {name}")]
    ModelNameMismatch { key: String, name: String },
    /// Two or more columns share a property name.
    #[error("duplicate column {column} in model {model}")]
    DuplicateColumn { model: String, column: String },
    /// Two or more relations share a property name.
    #[error("duplicate relation {property} in model {model}")]
    DuplicateRelation { model: String, property: String },
    /// A relation points at a name that is not a model.
    #[error("relation {model}.{property} targets unknown model {target}")]
    UnknownRelationTarget {
        model: String,
        property: String,
        target: String,
    },
    /// An enum column carries no allowed values.
    #[error("enum column {model}.{column} has no values")]
    EnumWithoutValues { model: String, column: String },
    /// An enum column has no matching entry in the enum map.
    #[error("enum column {model}.{column} has no enum entry")]
    MissingEnumEntry { model: String, column: String },
}

/// Validates every model in a snapshot, in model name order.
///
/// Unlike [`validate_model`], this also checks relation targets and the enum
/// map, which need the whole snapshot.
pub fn validate_snapshot(snapshot: &SchemaSnapshot) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (key, model) in &snapshot.models {
        if key.trim().is_empty() {
            errors.push(ValidationError::EmptyModelName);
            continue;
        }
        if *key != model.name {
            errors.push(ValidationError::ModelNameMismatch {
                key: key.clone(),
                name: model.name.clone(),
            });
        }

        errors.extend(validate_model(model));

        for relation in &model.relations {
            if !snapshot.models.contains_key(&relation.rel_model_name) {
                errors.push(ValidationError::UnknownRelationTarget {
                    model: model.name.clone(),
                    property: relation.property_name.clone(),
                    target: relation.rel_model_name.clone(),
                });
            }
        }

        let mut seen_enums = HashSet::new();
        for column in model.columns.iter().filter(|c| c.is_enum()) {
            if !seen_enums.insert(column.property_name.as_str()) {
                continue;
            }
            if snapshot.get_enum(key, &column.property_name).is_none() {
                errors.push(ValidationError::MissingEnumEntry {
                    model: model.name.clone(),
                    column: column.property_name.clone(),
                });
            }
        }
    }

    errors
}

/// Validates one model in isolation.
///
/// Each duplicated name is reported once.
pub fn validate_model(model: &ModelMetadata) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for column in &model.columns {
        let name = column.property_name.as_str();
        if !seen.insert(name) && reported.insert(name) {
            errors.push(ValidationError::DuplicateColumn {
                model: model.name.clone(),
                column: name.to_string(),
            });
        }

        if column.field_type == FieldType::Enum
            && column.enum_values.as_ref().is_none_or(Vec::is_empty)
        {
            errors.push(ValidationError::EnumWithoutValues {
                model: model.name.clone(),
                column: name.to_string(),
            });
        }
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for relation in &model.relations {
        let name = relation.property_name.as_str();
        if !seen.insert(name) && reported.insert(name) {
            errors.push(ValidationError::DuplicateRelation {
                model: model.name.clone(),
                property: name.to_string(),
            });
        }
    }

    errors
}
