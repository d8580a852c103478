//! Column de-duplication for consumers.
//!
//! Registration is append-only, so a model may carry several columns with the
//! same property name. Generators that need one column per name pick a
//! [`DedupeStrategy`] and call [`dedupe_columns`] or [`deduplicate_snapshot`].
//!
//! # Example
//!
//! ```
//! use schema_registry_core::*;
//!
//! let mut first = ColumnMetadata::new("email", FieldType::String);
//! first.nullable = true;
//! let second = ColumnMetadata::new("email", FieldType::Email);
//!
//! let kept = dedupe_columns(&[first, second], DedupeStrategy::KeepLast);
//! assert_eq!(kept.len(), 1);
//! assert_eq!(kept[0].field_type, FieldType::Email);
//! ```

use std::collections::HashMap;

use crate::{ColumnMetadata, SchemaSnapshot};

/// Which declaration wins when a property name repeats.
///
/// Both strategies keep the position of the first occurrence, so base
/// columns stay at the front of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupeStrategy {
    /// Keep the earliest registration.
    KeepFirst,
    /// Keep the latest registration's metadata.
    KeepLast,
}

/// Collapses columns sharing a property name into one.
///
/// # Examples
///
/// ```
/// use schema_registry_core::*;
///
/// let columns = vec![
///     ColumnMetadata::new("email", FieldType::String),
///     ColumnMetadata::new("name", FieldType::String),
///     ColumnMetadata::new("email", FieldType::Email),
/// ];
///
/// let kept = dedupe_columns(&columns, DedupeStrategy::KeepFirst);
/// let names: Vec<&str> = kept.iter().map(|c| c.property_name.as_str()).collect();
/// assert_eq!(names, vec!["email", "name"]);
/// assert_eq!(kept[0].field_type, FieldType::String);
/// ```
pub fn dedupe_columns(columns: &[ColumnMetadata], strategy: DedupeStrategy) -> Vec<ColumnMetadata> {
    let mut by_name: HashMap<&str, usize> = HashMap::new();
    let mut kept: Vec<ColumnMetadata> = Vec::new();

    for column in columns {
        match by_name.get(column.property_name.as_str()) {
            Some(&index) => {
                if strategy == DedupeStrategy::KeepLast {
                    kept[index] = column.clone();
                }
            }
            None => {
                by_name.insert(column.property_name.as_str(), kept.len());
                kept.push(column.clone());
            }
        }
    }

    kept
}

/// Returns a copy of `snapshot` with every model's columns de-duplicated.
///
/// The snapshot hash is cleared since the content changed.
pub fn deduplicate_snapshot(snapshot: &SchemaSnapshot, strategy: DedupeStrategy) -> SchemaSnapshot {
    let mut deduped = snapshot.clone();
    deduped.snapshot_hash = None;
    for model in deduped.models.values_mut() {
        model.columns = dedupe_columns(&model.columns, strategy);
    }
    deduped
}

impl SchemaSnapshot {
    /// Shorthand for [`deduplicate_snapshot`].
    pub fn deduplicated(&self, strategy: DedupeStrategy) -> SchemaSnapshot {
        deduplicate_snapshot(self, strategy)
    }
}
