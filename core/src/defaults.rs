//! Default column catalog.
//!
//! Two sets of defaults exist:
//!
//! - [`base_columns`]: identity, audit, ownership, soft-delete and version
//!   columns that every concrete model carries. Their facets are fully
//!   explicit and never pass through decorator defaults.
//! - [`DecoratorDefaults`]: baseline facets applied to every column
//!   registered through the field registrar, before explicit options.

use serde::{Deserialize, Serialize};

use crate::{ColumnMetadata, ColumnOptions, FieldType, FilterSpec};

/// Property names of the base columns, in catalog order.
pub const BASE_COLUMN_NAMES: [&str; 8] = [
    "id",
    "createdAt",
    "createdById",
    "updatedAt",
    "updatedById",
    "deletedAt",
    "deletedById",
    "version",
];

/// Baseline facet values for field-registered columns.
///
/// # Examples
///
/// ```
/// use schema_registry_core::{DecoratorDefaults, FieldType};
///
/// let defaults = DecoratorDefaults::new(true);
/// let column = defaults.column(FieldType::String, "title");
/// assert!(column.editable);
/// assert!(column.sort);
/// assert!(column.filter.is_enabled());
/// assert!(!column.unique);
///
/// let opt_out = DecoratorDefaults::new(false);
/// assert!(!opt_out.filter);
/// assert!(!opt_out.sort);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoratorDefaults {
    pub api_only: bool,
    pub db_only: bool,
    pub editable: bool,
    pub filter: bool,
    pub nullable: bool,
    pub readonly: bool,
    pub sort: bool,
    pub unique: bool,
    pub writeonly: bool,
    pub is_array: bool,
}

impl DecoratorDefaults {
    /// Computes the defaults; `filter_by_default` drives both `filter` and
    /// `sort`.
    pub fn new(filter_by_default: bool) -> Self {
        Self {
            api_only: false,
            db_only: false,
            editable: true,
            filter: filter_by_default,
            nullable: false,
            readonly: false,
            sort: filter_by_default,
            unique: false,
            writeonly: false,
            is_array: false,
        }
    }

    /// Builds a column carrying these defaults.
    pub fn column(&self, field_type: FieldType, property_name: impl Into<String>) -> ColumnMetadata {
        let mut column = ColumnMetadata::new(property_name, field_type);
        column.api_only = self.api_only;
        column.db_only = self.db_only;
        column.editable = self.editable;
        column.filter = FilterSpec::Enabled(self.filter);
        column.nullable = self.nullable;
        column.readonly = self.readonly;
        column.sort = self.sort;
        column.unique = self.unique;
        column.writeonly = self.writeonly;
        column.is_array = self.is_array;
        column
    }

    /// Builds a column from these defaults with `options` applied on top.
    pub fn resolve(
        &self,
        field_type: FieldType,
        property_name: impl Into<String>,
        options: &ColumnOptions,
    ) -> ColumnMetadata {
        let mut column = self.column(field_type, property_name);
        options.apply_to(&mut column);
        column
    }
}

impl Default for DecoratorDefaults {
    fn default() -> Self {
        Self::new(true)
    }
}

fn base_column(
    property_name: &str,
    field_type: FieldType,
    nullable: bool,
    filter: bool,
    sort: bool,
    unique: bool,
) -> ColumnMetadata {
    let mut column = ColumnMetadata::new(property_name, field_type);
    column.nullable = nullable;
    column.filter = FilterSpec::Enabled(filter);
    column.sort = sort;
    column.unique = unique;
    column.editable = false;
    column
}

/// Columns every concrete model implicitly carries, in fixed order.
///
/// Each call returns fresh values; models own their copy.
///
/// # Examples
///
/// ```
/// use schema_registry_core::{base_columns, BASE_COLUMN_NAMES, FieldType};
///
/// let columns = base_columns();
/// let names: Vec<&str> = columns.iter().map(|c| c.property_name.as_str()).collect();
/// assert_eq!(names, BASE_COLUMN_NAMES);
///
/// assert_eq!(columns[0].field_type, FieldType::Id);
/// assert!(columns[0].unique);
/// assert!(columns.iter().all(|c| !c.editable));
/// ```
pub fn base_columns() -> Vec<ColumnMetadata> {
    vec![
        base_column("id", FieldType::Id, false, true, false, true),
        base_column("createdAt", FieldType::Date, false, true, true, false),
        base_column("createdById", FieldType::Id, false, true, false, false),
        base_column("updatedAt", FieldType::Date, true, true, true, false),
        base_column("updatedById", FieldType::Id, true, true, false, false),
        base_column("deletedAt", FieldType::Date, true, true, true, false),
        base_column("deletedById", FieldType::Id, true, true, false, false),
        base_column("version", FieldType::Integer, false, false, false, false),
    ]
}

/// Returns `true` if `columns` starts with exactly `base`.
pub fn has_base_prefix(columns: &[ColumnMetadata], base: &[ColumnMetadata]) -> bool {
    columns.len() >= base.len() && columns[..base.len()] == *base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_nullability_mirrors_ownership() {
        let columns = base_columns();
        let nullable = |name: &str| {
            columns
                .iter()
                .find(|c| c.property_name == name)
                .map(|c| c.nullable)
                .unwrap()
        };

        assert!(!nullable("createdAt"));
        assert!(!nullable("createdById"));
        assert!(nullable("updatedAt"));
        assert!(nullable("updatedById"));
        assert!(nullable("deletedAt"));
        assert!(nullable("deletedById"));
    }

    #[test]
    fn test_timestamps_sortable_identifiers_not() {
        for column in base_columns() {
            match column.field_type {
                FieldType::Date => assert!(column.sort, "{} should sort", column.property_name),
                _ => assert!(!column.sort, "{} should not sort", column.property_name),
            }
        }
    }

    #[test]
    fn test_version_column_not_filterable() {
        let columns = base_columns();
        let version = columns.last().unwrap();
        assert_eq!(version.property_name, "version");
        assert_eq!(version.field_type, FieldType::Integer);
        assert!(!version.filter.is_enabled());
        assert!(!version.nullable);
    }

    #[test]
    fn test_base_columns_ignore_decorator_defaults() {
        // Decorator defaults make columns editable; base columns never are.
        let defaults = DecoratorDefaults::new(true);
        assert!(defaults.editable);
        assert!(base_columns().iter().all(|c| !c.editable));
    }

    #[test]
    fn test_resolve_explicit_beats_default() {
        let defaults = DecoratorDefaults::new(false);
        let column = defaults.resolve(
            FieldType::Integer,
            "rank",
            &ColumnOptions::new().sort(true).nullable(true),
        );

        assert!(column.sort);
        assert!(column.nullable);
        assert!(!column.filter.is_enabled());
        assert!(column.editable);
    }

    #[test]
    fn test_has_base_prefix() {
        let base = base_columns();
        let mut columns = base_columns();
        columns.push(ColumnMetadata::new("name", FieldType::String));

        assert!(has_base_prefix(&columns, &base));
        assert!(!has_base_prefix(&columns[1..], &base));
    }
}
