//! Core metadata types for the schema registry.
//!
//! This crate defines the structural information the registry aggregates
//! while models are declared:
//!
//! - [`ColumnMetadata`]: one field of a model with its type and access
//!   facets; [`ColumnOptions`] is the typed partial update applied on top of
//!   defaults.
//! - [`RelationMetadata`]: a to-one or to-many association between models.
//! - [`EnumMetadata`]: allowed values and synthesized name of an enum column.
//! - [`ModelMetadata`]: the per-model aggregate of columns and relations.
//! - [`SchemaSnapshot`]: an owned, serializable view handed to generators.
//!
//! The default catalog ([`base_columns`], [`DecoratorDefaults`]) supplies the
//! implicit columns and baseline facets.
//!
//! Diagnostics ([`validate_snapshot`], [`validate_model`]) and
//! de-duplication ([`dedupe_columns`]) are consumer-side helpers: the registry
//! itself never rejects or collapses declarations.
//!
//! # Example
//!
//! ```
//! use schema_registry_core::*;
//!
//! let defaults = DecoratorDefaults::new(true);
//! let mut user = ModelMetadata::new("User", base_columns());
//! user.columns.push(defaults.resolve(
//!     FieldType::Email,
//!     "email",
//!     &ColumnOptions::new().unique(true),
//! ));
//!
//! assert_eq!(user.unique_columns(), vec!["id", "email"]);
//! assert!(validate_model(&user).is_empty());
//! ```

mod defaults;
mod merge;
mod snapshot;
mod types;
mod validate;

pub use defaults::{BASE_COLUMN_NAMES, DecoratorDefaults, base_columns, has_base_prefix};
pub use merge::{DedupeStrategy, dedupe_columns, deduplicate_snapshot};
pub use snapshot::SchemaSnapshot;
pub use types::*;
pub use validate::{ValidationError, validate_model, validate_snapshot};
