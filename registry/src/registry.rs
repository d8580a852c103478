//! The model registry.
//!
//! [`Registry`] accumulates model metadata from registration calls and
//! exposes the consolidated view to generators. Columns and relations are
//! appended, never replaced; the base-column opt-out in [`ModelOptions`] is
//! the only removal. Nothing is validated beyond the relation argument
//! contract.
//!
//! # Example
//!
//! ```
//! use schema_registry::{Registry, RegistryConfig};
//! use schema_registry_core::{ColumnOptions, FieldType};
//!
//! let mut registry = Registry::new(RegistryConfig::default());
//! registry.add_field(FieldType::Email, "User", "email", &ColumnOptions::new().unique(true));
//! registry.add_relation("User", "Post", "posts", true).unwrap();
//!
//! let user = registry.get_model("User").unwrap();
//! assert_eq!(registry.uniques_for_model(user), vec!["id", "email"]);
//! assert_eq!(registry.get_model_relation("User").unwrap().len(), 1);
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};

use schema_registry_core::{
    ClassEntry, ColumnMetadata, ColumnOptions, DeclarationRef, DecoratorDefaults, EnumMetadata,
    FieldType, ModelMetadata, ModelOptions, RelationMetadata, RelationOptions, SchemaSnapshot,
    has_base_prefix,
};
use tracing::{debug, warn};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};

/// Aggregate of every model declared so far.
///
/// Decorator defaults and base columns are resolved once from the
/// [`RegistryConfig`] passed to [`Registry::new`].
#[derive(Debug, Clone)]
pub struct Registry {
    config: RegistryConfig,
    defaults: DecoratorDefaults,
    base_columns: Vec<ColumnMetadata>,
    models: HashMap<String, ModelMetadata>,
    enums: HashMap<String, HashMap<String, EnumMetadata>>,
    classes: HashMap<String, ClassEntry>,
    interfaces: HashSet<String>,
}

impl Registry {
    /// Creates an empty registry, freezing the defaults derived from `config`.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            defaults: config.decorator_defaults(),
            base_columns: schema_registry_core::base_columns(),
            models: HashMap::new(),
            enums: HashMap::new(),
            classes: HashMap::new(),
            interfaces: HashSet::new(),
        }
    }

    /// Creates an empty registry configured from the environment.
    pub fn from_env() -> Self {
        Self::new(RegistryConfig::from_env())
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Baseline facets applied to field-registered columns.
    pub fn decorator_defaults(&self) -> &DecoratorDefaults {
        &self.defaults
    }

    /// Columns every new model is seeded with.
    pub fn base_columns(&self) -> &[ColumnMetadata] {
        &self.base_columns
    }

    // -----------------------------------------------------------------------
    // Interfaces
    // -----------------------------------------------------------------------

    /// Excludes `name` from the model map.
    ///
    /// Later registrations against `name` are ignored. A model that already
    /// exists under `name` is kept.
    pub fn mark_interface(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.models.contains_key(&name) {
            debug!(model = %name, "interface marked after model registration; model kept");
        }
        self.interfaces.insert(name);
    }

    pub fn is_interface(&self, name: &str) -> bool {
        self.interfaces.contains(name)
    }

    /// Interface names, in no particular order.
    pub fn interfaces(&self) -> impl Iterator<Item = &str> {
        self.interfaces.iter().map(String::as_str)
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Records a class generators must be able to import.
    pub fn add_class(
        &mut self,
        name: impl Into<String>,
        declaration: Option<DeclarationRef>,
        location: impl Into<String>,
    ) {
        let name = name.into();
        self.classes.insert(
            name.clone(),
            ClassEntry {
                name,
                declaration,
                location: location.into(),
            },
        );
    }

    /// Creates or updates the model `name`.
    ///
    /// Records the declaration in the class map and merges `options` into the
    /// model flags. `options.base_columns == Some(false)` strips the default
    /// catalog from the model. No-op for interface names.
    pub fn add_model(
        &mut self,
        name: &str,
        declaration: Option<DeclarationRef>,
        location: impl Into<String>,
        options: &ModelOptions,
    ) {
        if self.is_interface(name) {
            debug!(model = %name, "skipping model registration for interface");
            return;
        }

        let location = location.into();
        let class = self
            .classes
            .entry(name.to_string())
            .or_insert_with(|| ClassEntry {
                name: name.to_string(),
                declaration: None,
                location: String::new(),
            });
        if declaration.is_some() {
            class.declaration.clone_from(&declaration);
        }
        if !location.is_empty() {
            class.location.clone_from(&location);
        }

        let with_base = options.base_columns != Some(false);
        let base_len = self.base_columns.len();
        let strip = !with_base
            && self
                .models
                .get(name)
                .is_some_and(|m| has_base_prefix(&m.columns, &self.base_columns));

        let model = self.model_entry(name, with_base);
        if strip {
            model.columns.drain(..base_len);
        }
        if declaration.is_some() {
            model.declaration = declaration;
        }
        if !location.is_empty() {
            model.location = Some(location);
        }
        options.merge_into(model);
    }

    /// Registers an abstract model entry under `name`.
    pub fn add_interface_type(&mut self, name: &str) {
        self.add_model(name, None, "", &ModelOptions::new().abstract_model(true));
    }

    /// Appends a column to `model_name`.
    ///
    /// The column starts from the decorator defaults and `options` are applied
    /// on top. An existing column with the same name is not replaced. No-op for
    /// interface names.
    pub fn add_field(
        &mut self,
        field_type: FieldType,
        model_name: &str,
        column_name: &str,
        options: &ColumnOptions,
    ) {
        if self.is_interface(model_name) {
            debug!(model = %model_name, column = %column_name, "skipping field on interface");
            return;
        }

        let column = self.defaults.resolve(field_type, column_name, options);
        let model = self.model_entry(model_name, true);
        if model.get_column(column_name).is_some() {
            debug!(model = %model_name, column = %column_name, "appending duplicate column");
        }
        model.columns.push(column);
        debug!(model = %model_name, column = %column_name, %field_type, "registered field");
    }

    /// Records an enum for `(model_name, column_name)` and appends the enum
    /// column.
    ///
    /// The enum entry is recorded even when `model_name` is an interface; the
    /// column is not.
    pub fn add_enum<V: Into<String>>(
        &mut self,
        model_name: &str,
        column_name: &str,
        enum_name: &str,
        values: impl IntoIterator<Item = V>,
        location: Option<&str>,
        options: &ColumnOptions,
    ) {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();

        self.enums.entry(model_name.to_string()).or_default().insert(
            column_name.to_string(),
            EnumMetadata {
                name: enum_name.to_string(),
                values: values.clone(),
                location: location.map(str::to_string),
            },
        );

        let mut options = options.clone();
        options.enum_name = Some(enum_name.to_string());
        options.enum_values = Some(values);
        self.add_field(FieldType::Enum, model_name, column_name, &options);
    }

    /// Appends a relation to `options.model_name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MissingRelationOptions`] listing every absent
    /// argument when any of `model_name`, `rel_model_name`, `property_name`
    /// or `is_list` is missing or empty. Nothing is appended in that case.
    pub fn add_model_relation(&mut self, options: RelationOptions) -> Result<()> {
        let missing = options.missing();

        match (
            options.model_name,
            options.rel_model_name,
            options.property_name,
            options.is_list,
        ) {
            (Some(model_name), Some(rel_model_name), Some(property_name), Some(is_list))
                if missing.is_empty() =>
            {
                if self.is_interface(&model_name) {
                    debug!(model = %model_name, property = %property_name, "skipping relation on interface");
                    return Ok(());
                }

                let model = self.model_entry(&model_name, true);
                model.relations.push(RelationMetadata {
                    rel_model_name,
                    property_name,
                    is_list,
                });
                debug!(model = %model_name, "registered relation");
                Ok(())
            }
            (model_name, ..) => {
                warn!(model = ?model_name, ?missing, "rejected relation registration");
                Err(RegistryError::MissingRelationOptions {
                    model: model_name.filter(|name| !name.is_empty()),
                    missing,
                })
            }
        }
    }

    /// Typed shorthand for [`add_model_relation`](Registry::add_model_relation).
    pub fn add_relation(
        &mut self,
        model_name: &str,
        rel_model_name: &str,
        property_name: &str,
        is_list: bool,
    ) -> Result<()> {
        self.add_model_relation(RelationOptions::new(
            model_name,
            rel_model_name,
            property_name,
            is_list,
        ))
    }

    fn model_entry(&mut self, name: &str, with_base: bool) -> &mut ModelMetadata {
        let base_columns = &self.base_columns;
        self.models.entry(name.to_string()).or_insert_with(|| {
            debug!(model = %name, with_base, "creating model");
            let columns = if with_base {
                base_columns.clone()
            } else {
                Vec::new()
            };
            ModelMetadata::new(name, columns)
        })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Property names of `model`'s unique columns, in column order.
    pub fn uniques_for_model<'m>(&self, model: &'m ModelMetadata) -> Vec<&'m str> {
        model.unique_columns()
    }

    pub fn get_models(&self) -> &HashMap<String, ModelMetadata> {
        &self.models
    }

    pub fn get_model(&self, name: &str) -> Option<&ModelMetadata> {
        self.models.get(name)
    }

    pub fn get_model_relation(&self, name: &str) -> Option<&[RelationMetadata]> {
        self.models.get(name).map(|m| m.relations.as_slice())
    }

    /// Enum registered for `(model_name, column_name)`, or `None`.
    pub fn get_enum(&self, model_name: &str, column_name: &str) -> Option<&EnumMetadata> {
        self.enums.get(model_name)?.get(column_name)
    }

    pub fn get_class(&self, name: &str) -> Option<&ClassEntry> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Number of models (interfaces excluded).
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Returns an iterator over model names.
    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Owned copy of the current state for generators.
    pub fn snapshot(&self, generated_at: impl Into<String>) -> SchemaSnapshot {
        let mut snapshot = SchemaSnapshot::new(generated_at);

        let mut interfaces: Vec<String> = self.interfaces.iter().cloned().collect();
        interfaces.sort();
        snapshot.interfaces = interfaces;

        snapshot.models = self
            .models
            .iter()
            .map(|(name, model)| (name.clone(), model.clone()))
            .collect();
        snapshot.enums = self
            .enums
            .iter()
            .map(|(model, columns)| {
                let columns: BTreeMap<String, EnumMetadata> = columns
                    .iter()
                    .map(|(column, meta)| (column.clone(), meta.clone()))
                    .collect();
                (model.clone(), columns)
            })
            .collect();
        snapshot.classes = self
            .classes
            .iter()
            .map(|(name, class)| (name.clone(), class.clone()))
            .collect();

        snapshot
    }

    /// Snapshot with [`snapshot_hash`](SchemaSnapshot::snapshot_hash) set.
    pub fn snapshot_with_hash(&self, generated_at: impl Into<String>) -> Result<SchemaSnapshot> {
        crate::snapshot::seal_snapshot(self.snapshot(generated_at))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use schema_registry_core::{BASE_COLUMN_NAMES, FilterSpec};

    use super::*;

    fn column_names(model: &ModelMetadata) -> Vec<&str> {
        model
            .columns
            .iter()
            .map(|c| c.property_name.as_str())
            .collect()
    }

    #[test]
    fn test_add_field_seeds_base_columns() {
        let mut registry = Registry::default();
        registry.add_field(FieldType::String, "User", "name", &ColumnOptions::new());

        let user = registry.get_model("User").unwrap();
        let names = column_names(user);
        assert_eq!(names[..BASE_COLUMN_NAMES.len()], BASE_COLUMN_NAMES);
        assert_eq!(names.last(), Some(&"name"));
        assert_eq!(user.columns[..8], *registry.base_columns());
    }

    #[test]
    fn test_models_do_not_share_base_columns() {
        let mut registry = Registry::default();
        registry.add_field(FieldType::String, "User", "name", &ColumnOptions::new());
        registry.add_field(FieldType::String, "Post", "title", &ColumnOptions::new());

        registry.models.get_mut("User").unwrap().columns[0].unique = false;
        assert!(registry.get_model("Post").unwrap().columns[0].unique);
        assert!(registry.base_columns()[0].unique);
    }

    #[test]
    fn test_add_field_applies_defaults_then_options() {
        let mut registry = Registry::new(RegistryConfig::from_flag(Some("false")));
        registry.add_field(
            FieldType::Integer,
            "Post",
            "rank",
            &ColumnOptions::new().sort(true),
        );

        let rank = registry.get_model("Post").unwrap().get_column("rank").unwrap();
        assert!(rank.sort);
        assert_eq!(rank.filter, FilterSpec::Enabled(false));
        assert!(rank.editable);
        assert!(!rank.unique);
    }

    #[test]
    fn test_duplicate_fields_are_appended() {
        let mut registry = Registry::default();
        registry.add_field(FieldType::String, "User", "email", &ColumnOptions::new());
        registry.add_field(FieldType::String, "User", "email", &ColumnOptions::new());

        let user = registry.get_model("User").unwrap();
        assert_eq!(user.columns_named("email").count(), 2);
    }

    #[test]
    fn test_interface_blocks_model_and_field() {
        let mut registry = Registry::default();
        registry.mark_interface("BaseEntity");
        registry.add_model("BaseEntity", None, "base.rs", &ModelOptions::new());
        registry.add_field(FieldType::String, "BaseEntity", "name", &ColumnOptions::new());
        registry
            .add_relation("BaseEntity", "User", "owner", false)
            .unwrap();

        assert!(registry.get_model("BaseEntity").is_none());
        assert!(registry.get_class("BaseEntity").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_interface_marking_is_not_retroactive() {
        let mut registry = Registry::default();
        registry.add_field(FieldType::String, "Shared", "name", &ColumnOptions::new());
        registry.mark_interface("Shared");
        registry.add_field(FieldType::String, "Shared", "title", &ColumnOptions::new());

        let shared = registry.get_model("Shared").unwrap();
        assert!(shared.get_column("name").is_some());
        assert!(shared.get_column("title").is_none());
    }

    #[test]
    fn test_add_model_merges_options() {
        let mut registry = Registry::default();
        registry.add_field(FieldType::String, "User", "name", &ColumnOptions::new());
        registry.add_model(
            "User",
            Some(DeclarationRef::new("app::models::User")),
            "src/models/user.rs",
            &ModelOptions::new().api_only(true),
        );
        registry.add_model("User", None, "", &ModelOptions::new().db_only(false));

        let user = registry.get_model("User").unwrap();
        assert_eq!(user.api_only, Some(true));
        assert_eq!(user.db_only, Some(false));
        assert_eq!(user.location.as_deref(), Some("src/models/user.rs"));
        assert_eq!(
            user.declaration.as_ref().map(DeclarationRef::as_str),
            Some("app::models::User")
        );
        assert!(user.get_column("name").is_some());
        assert!(registry.get_class("User").is_some());
    }

    #[test]
    fn test_add_model_without_base_columns() {
        let mut registry = Registry::default();
        registry.add_model("Setting", None, "", &ModelOptions::new().base_columns(false));
        registry.add_field(FieldType::String, "Setting", "key", &ColumnOptions::new());

        assert_eq!(column_names(registry.get_model("Setting").unwrap()), vec!["key"]);
    }

    #[test]
    fn test_add_model_strips_base_columns_after_fields() {
        let mut registry = Registry::default();
        registry.add_field(FieldType::String, "Setting", "key", &ColumnOptions::new());
        registry.add_model("Setting", None, "", &ModelOptions::new().base_columns(false));

        assert_eq!(column_names(registry.get_model("Setting").unwrap()), vec!["key"]);
    }

    #[test]
    fn test_add_interface_type_registers_abstract_model() {
        let mut registry = Registry::default();
        registry.add_interface_type("Node");

        let node = registry.get_model("Node").unwrap();
        assert!(node.is_abstract());
        assert_eq!(node.columns.len(), registry.base_columns().len());
    }

    #[test]
    fn test_add_enum_records_enum_and_column() {
        let mut registry = Registry::default();
        registry.add_enum(
            "User",
            "status",
            "StatusEnum",
            ["ACTIVE", "INACTIVE"],
            Some("src/models/user.rs"),
            &ColumnOptions::new().nullable(true),
        );

        let status = registry.get_enum("User", "status").unwrap();
        assert_eq!(status.name, "StatusEnum");
        assert_eq!(status.values, vec!["ACTIVE", "INACTIVE"]);

        let column = registry.get_model("User").unwrap().get_column("status").unwrap();
        assert_eq!(column.field_type, FieldType::Enum);
        assert_eq!(column.enum_name.as_deref(), Some("StatusEnum"));
        assert!(column.nullable);
    }

    #[test]
    fn test_add_enum_on_interface_keeps_enum_entry() {
        let mut registry = Registry::default();
        registry.mark_interface("Shared");
        registry.add_enum("Shared", "kind", "KindEnum", ["A"], None, &ColumnOptions::new());

        assert!(registry.get_enum("Shared", "kind").is_some());
        assert!(registry.get_model("Shared").is_none());
    }

    #[test]
    fn test_get_enum_absent() {
        let mut registry = Registry::default();
        registry.add_field(FieldType::String, "User", "name", &ColumnOptions::new());
        assert!(registry.get_enum("User", "name").is_none());
        assert!(registry.get_enum("Missing", "name").is_none());
    }

    #[test]
    fn test_relation_with_false_is_list() {
        let mut registry = Registry::default();
        registry.add_relation("Post", "User", "author", false).unwrap();

        let relations = registry.get_model_relation("Post").unwrap();
        assert_eq!(
            relations,
            &[RelationMetadata {
                rel_model_name: "User".into(),
                property_name: "author".into(),
                is_list: false,
            }]
        );
        assert_eq!(
            registry.get_model("Post").unwrap().columns.len(),
            registry.base_columns().len()
        );
    }

    #[test]
    fn test_relation_missing_property_appends_nothing() {
        let mut registry = Registry::default();
        registry.add_relation("Post", "User", "author", false).unwrap();

        let err = registry
            .add_model_relation(RelationOptions {
                model_name: Some("Post".into()),
                rel_model_name: Some("Tag".into()),
                property_name: None,
                is_list: Some(true),
            })
            .unwrap_err();

        match err {
            RegistryError::MissingRelationOptions { model, missing } => {
                assert_eq!(model.as_deref(), Some("Post"));
                assert_eq!(missing, vec!["property_name"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(registry.get_model_relation("Post").unwrap().len(), 1);
    }

    #[test]
    fn test_relation_missing_model_creates_nothing() {
        let mut registry = Registry::default();
        let err = registry
            .add_model_relation(RelationOptions {
                model_name: Some(String::new()),
                ..RelationOptions::new("x", "User", "author", false)
            })
            .unwrap_err();

        assert!(matches!(
            err,
            RegistryError::MissingRelationOptions { model: None, .. }
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_uniques_for_model() {
        let mut registry = Registry::default();
        registry.add_field(FieldType::Email, "User", "email", &ColumnOptions::new().unique(true));
        registry.add_field(FieldType::String, "User", "name", &ColumnOptions::new());

        let user = registry.get_model("User").unwrap();
        assert_eq!(registry.uniques_for_model(user), vec!["id", "email"]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut registry = Registry::default();
        registry.mark_interface("Node");
        registry.add_field(FieldType::String, "User", "name", &ColumnOptions::new());

        let snapshot = registry.snapshot("2024-01-01T00:00:00Z");
        registry.add_field(FieldType::String, "User", "title", &ColumnOptions::new());

        assert_eq!(snapshot.interfaces, vec!["Node"]);
        assert!(snapshot.models["User"].get_column("title").is_none());
        assert!(registry.get_model("User").unwrap().get_column("title").is_some());
    }
}
