//! Model metadata registry.
//!
//! Declarations (typed [`DeclareModel`] impls, declaration files, or direct
//! calls) register columns, enums and relations into a [`Registry`]. Once the
//! registration phase is over, generators read a [`SchemaSnapshot`] taken from
//! it.
//!
//! # Quick start
//!
//! ```
//! use schema_registry::{Registry, RegistryConfig};
//! use schema_registry_core::{ColumnOptions, FieldType};
//!
//! let mut registry = Registry::new(RegistryConfig::from_env());
//! registry.mark_interface("Timestamped");
//! registry.add_field(FieldType::String, "User", "name", &ColumnOptions::new());
//! registry.add_field(FieldType::String, "Timestamped", "note", &ColumnOptions::new());
//! registry.add_relation("User", "Post", "posts", true).unwrap();
//!
//! let snapshot = registry.snapshot("2024-01-15T10:30:00Z");
//! assert_eq!(snapshot.model_count(), 1);
//! assert_eq!(snapshot.interfaces, vec!["Timestamped"]);
//! ```
//!
//! Programs that register from many places share one instance through
//! [`shared::global`].
//!
//! [`SchemaSnapshot`]: schema_registry_core::SchemaSnapshot

mod config;
mod declare;
mod error;
mod loader;
mod registry;
pub mod shared;
mod snapshot;

pub use config::{ConfigSource, EnvConfig, FILTER_BY_DEFAULT, RegistryConfig};
pub use declare::{DeclareModel, ModelBuilder};
pub use error::{RegistryError, Result};
pub use loader::{
    ClassDeclaration, DeclarationFile, DeclarationSet, FieldDeclaration, ModelDeclaration,
    RelationDeclaration,
};
pub use registry::Registry;
pub use shared::SharedRegistry;
pub use snapshot::{
    compute_snapshot_hash, load_snapshot, save_snapshot, seal_snapshot, verify_snapshot,
};
