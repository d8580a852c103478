//! Metadata type definitions for model structure.
//!
//! This module defines the data model the registry accumulates while models
//! are declared: columns, relations, enums and the per-model aggregate. All
//! types derive [`serde`] traits so a finalized view can be handed to schema
//! and migration generators as JSON or YAML.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Version of the snapshot contract (semver).
///
/// Embedded in every [`SchemaSnapshot`](crate::SchemaSnapshot) so generators
/// can detect incompatible snapshot layouts.
pub const SCHEMA_CONTRACT_VERSION: &str = "1.0.0";

/// Column type.
///
/// A closed set: generators map each variant onto a storage type and a
/// GraphQL scalar.
///
/// # Examples
///
/// ```
/// use schema_registry_core::FieldType;
///
/// assert_eq!(FieldType::DateOnly.as_str(), "dateonly");
/// assert_eq!(FieldType::Bytea.to_string(), "bytea");
///
/// let parsed: FieldType = serde_json::from_str("\"email\"").unwrap();
/// assert_eq!(parsed, FieldType::Email);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Boolean,
    Date,
    DateOnly,
    DateTime,
    Email,
    Enum,
    Float,
    Id,
    Integer,
    Json,
    Numeric,
    String,
    /// Raw byte sequence.
    Bytea,
}

impl FieldType {
    /// Every field type, in declaration order.
    pub const ALL: [FieldType; 13] = [
        FieldType::Boolean,
        FieldType::Date,
        FieldType::DateOnly,
        FieldType::DateTime,
        FieldType::Email,
        FieldType::Enum,
        FieldType::Float,
        FieldType::Id,
        FieldType::Integer,
        FieldType::Json,
        FieldType::Numeric,
        FieldType::String,
        FieldType::Bytea,
    ];

    /// Returns the serialized name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::DateOnly => "dateonly",
            FieldType::DateTime => "datetime",
            FieldType::Email => "email",
            FieldType::Enum => "enum",
            FieldType::Float => "float",
            FieldType::Id => "id",
            FieldType::Integer => "integer",
            FieldType::Json => "json",
            FieldType::Numeric => "numeric",
            FieldType::String => "string",
            FieldType::Bytea => "bytea",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison operator a generated query filter may expose for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhereOperator {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    Contains,
    StartsWith,
    EndsWith,
    IsNull,
}

/// Whether a column is filterable, optionally restricted to some operators.
///
/// Serialized untagged: either a plain boolean or a list of operators.
///
/// # Examples
///
/// ```
/// use schema_registry_core::{FilterSpec, WhereOperator};
///
/// assert!(FilterSpec::Enabled(true).is_enabled());
/// assert!(!FilterSpec::Enabled(false).is_enabled());
///
/// let ops = FilterSpec::Operators(vec![WhereOperator::Eq, WhereOperator::In]);
/// assert!(ops.is_enabled());
/// assert!(ops.allows(WhereOperator::In));
/// assert!(!ops.allows(WhereOperator::Gt));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterSpec {
    Enabled(bool),
    Operators(Vec<WhereOperator>),
}

impl FilterSpec {
    /// Returns `true` if any filtering is generated for the column.
    pub fn is_enabled(&self) -> bool {
        match self {
            FilterSpec::Enabled(enabled) => *enabled,
            FilterSpec::Operators(_) => true,
        }
    }

    /// Returns `true` if `op` may be used against the column.
    pub fn allows(&self, op: WhereOperator) -> bool {
        match self {
            FilterSpec::Enabled(enabled) => *enabled,
            FilterSpec::Operators(ops) => ops.contains(&op),
        }
    }
}

impl Default for FilterSpec {
    fn default() -> Self {
        FilterSpec::Enabled(false)
    }
}

impl From<bool> for FilterSpec {
    fn from(enabled: bool) -> Self {
        FilterSpec::Enabled(enabled)
    }
}

/// Opaque reference to the code that declared a model or class.
///
/// Usually a Rust type path obtained with [`DeclarationRef::of`]; generators
/// use it to emit imports.
///
/// # Examples
///
/// ```
/// use schema_registry_core::DeclarationRef;
///
/// struct User;
/// let decl = DeclarationRef::of::<User>();
/// assert!(decl.as_str().ends_with("User"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclarationRef(String);

impl DeclarationRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Reference to the Rust type `T`.
    pub fn of<T: ?Sized>() -> Self {
        Self(std::any::type_name::<T>().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeclarationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One declared column of a model.
///
/// Facet values are resolved at registration time (explicit override, then
/// decorator defaults); consumers never need to consult defaults again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Property name on the model (not unique within a model).
    pub property_name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub nullable: bool,
    pub unique: bool,
    pub editable: bool,
    pub readonly: bool,
    pub sort: bool,
    pub filter: FilterSpec,
    /// Exposed through the API but not stored.
    pub api_only: bool,
    /// Stored but not exposed through the API.
    pub db_only: bool,
    pub writeonly: bool,
    pub is_array: bool,
    /// Literal default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Storage type hint (e.g. `int16`, `jsonb`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// Class backing a strongly typed JSON column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gql_field_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

impl ColumnMetadata {
    /// Creates a column with every facet switched off.
    ///
    /// # Examples
    ///
    /// ```
    /// use schema_registry_core::{ColumnMetadata, FieldType};
    ///
    /// let column = ColumnMetadata::new("title", FieldType::String);
    /// assert_eq!(column.property_name, "title");
    /// assert!(!column.nullable);
    /// assert!(!column.filter.is_enabled());
    /// ```
    pub fn new(property_name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            property_name: property_name.into(),
            field_type,
            nullable: false,
            unique: false,
            editable: false,
            readonly: false,
            sort: false,
            filter: FilterSpec::default(),
            api_only: false,
            db_only: false,
            writeonly: false,
            is_array: false,
            default: None,
            description: None,
            data_type: None,
            gql_field_type: None,
            enum_name: None,
            enum_values: None,
        }
    }

    /// Returns `true` if this column is bound to an enum.
    pub fn is_enum(&self) -> bool {
        self.field_type == FieldType::Enum
    }
}

/// Typed partial update of a [`ColumnMetadata`].
///
/// Every field is optional; [`apply_to`](ColumnOptions::apply_to) overwrites
/// only the fields that are set, so explicit options always beat whatever the
/// column was built from.
///
/// # Examples
///
/// ```
/// use schema_registry_core::{ColumnMetadata, ColumnOptions, FieldType};
///
/// let mut column = ColumnMetadata::new("email", FieldType::Email);
/// column.editable = true;
///
/// ColumnOptions::new().unique(true).nullable(true).apply_to(&mut column);
/// assert!(column.unique);
/// assert!(column.nullable);
/// assert!(column.editable); // untouched
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readonly: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writeonly: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_array: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gql_field_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_name: Option<String>,
    /// Scalar values (numbers, booleans) are kept as their string form.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_enum_values"
    )]
    pub enum_values: Option<Vec<String>>,
}

fn deserialize_enum_values<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let Some(values) = Option::<Vec<serde_json::Value>>::deserialize(deserializer)? else {
        return Ok(None);
    };
    values
        .into_iter()
        .map(|value| match value {
            serde_json::Value::String(s) => Ok(s),
            serde_json::Value::Number(n) => Ok(n.to_string()),
            serde_json::Value::Bool(b) => Ok(b.to_string()),
            other => Err(D::Error::custom(format!(
                "enum value must be a string, number or boolean, got {other}"
            ))),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

impl ColumnOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nullable(mut self, value: bool) -> Self {
        self.nullable = Some(value);
        self
    }

    pub fn unique(mut self, value: bool) -> Self {
        self.unique = Some(value);
        self
    }

    pub fn editable(mut self, value: bool) -> Self {
        self.editable = Some(value);
        self
    }

    pub fn readonly(mut self, value: bool) -> Self {
        self.readonly = Some(value);
        self
    }

    pub fn sort(mut self, value: bool) -> Self {
        self.sort = Some(value);
        self
    }

    pub fn filter(mut self, value: impl Into<FilterSpec>) -> Self {
        self.filter = Some(value.into());
        self
    }

    pub fn api_only(mut self, value: bool) -> Self {
        self.api_only = Some(value);
        self
    }

    pub fn db_only(mut self, value: bool) -> Self {
        self.db_only = Some(value);
        self
    }

    pub fn writeonly(mut self, value: bool) -> Self {
        self.writeonly = Some(value);
        self
    }

    pub fn array(mut self, value: bool) -> Self {
        self.is_array = Some(value);
        self
    }

    pub fn default_value(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn description(mut self, value: impl Into<String>) -> Self {
        self.description = Some(value.into());
        self
    }

    pub fn data_type(mut self, value: impl Into<String>) -> Self {
        self.data_type = Some(value.into());
        self
    }

    pub fn gql_field_type(mut self, value: impl Into<String>) -> Self {
        self.gql_field_type = Some(value.into());
        self
    }

    /// Overwrites the fields of `column` that are set in these options.
    pub fn apply_to(&self, column: &mut ColumnMetadata) {
        if let Some(v) = self.nullable {
            column.nullable = v;
        }
        if let Some(v) = self.unique {
            column.unique = v;
        }
        if let Some(v) = self.editable {
            column.editable = v;
        }
        if let Some(v) = self.readonly {
            column.readonly = v;
        }
        if let Some(v) = self.sort {
            column.sort = v;
        }
        if let Some(v) = &self.filter {
            column.filter = v.clone();
        }
        if let Some(v) = self.api_only {
            column.api_only = v;
        }
        if let Some(v) = self.db_only {
            column.db_only = v;
        }
        if let Some(v) = self.writeonly {
            column.writeonly = v;
        }
        if let Some(v) = self.is_array {
            column.is_array = v;
        }
        if let Some(v) = &self.default {
            column.default = Some(v.clone());
        }
        if let Some(v) = &self.description {
            column.description = Some(v.clone());
        }
        if let Some(v) = &self.data_type {
            column.data_type = Some(v.clone());
        }
        if let Some(v) = &self.gql_field_type {
            column.gql_field_type = Some(v.clone());
        }
        if let Some(v) = &self.enum_name {
            column.enum_name = Some(v.clone());
        }
        if let Some(v) = &self.enum_values {
            column.enum_values = Some(v.clone());
        }
    }
}

/// A named association from one model to another.
///
/// `rel_model_name` is a lookup key into the registry, not an owning link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationMetadata {
    pub rel_model_name: String,
    pub property_name: String,
    /// `true` for to-many, `false` for to-one.
    pub is_list: bool,
}

/// Relation registration input.
///
/// Every argument is optional so declaration sources that omit one can be
/// reported precisely; see [`missing`](RelationOptions::missing).
///
/// # Examples
///
/// ```
/// use schema_registry_core::RelationOptions;
///
/// let complete = RelationOptions::new("Post", "User", "author", false);
/// assert!(complete.missing().is_empty());
///
/// let partial = RelationOptions {
///     model_name: Some("Post".into()),
///     rel_model_name: Some("User".into()),
///     property_name: None,
///     is_list: Some(false),
/// };
/// assert_eq!(partial.missing(), vec!["property_name"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationOptions {
    pub model_name: Option<String>,
    pub rel_model_name: Option<String>,
    pub property_name: Option<String>,
    pub is_list: Option<bool>,
}

impl RelationOptions {
    /// Creates fully populated relation options.
    pub fn new(
        model_name: impl Into<String>,
        rel_model_name: impl Into<String>,
        property_name: impl Into<String>,
        is_list: bool,
    ) -> Self {
        Self {
            model_name: Some(model_name.into()),
            rel_model_name: Some(rel_model_name.into()),
            property_name: Some(property_name.into()),
            is_list: Some(is_list),
        }
    }

    /// Names of the arguments that are absent. Empty strings count as absent.
    pub fn missing(&self) -> Vec<&'static str> {
        let blank = |value: &Option<String>| value.as_deref().is_none_or(str::is_empty);

        let mut missing = Vec::new();
        if blank(&self.model_name) {
            missing.push("model_name");
        }
        if blank(&self.rel_model_name) {
            missing.push("rel_model_name");
        }
        if blank(&self.property_name) {
            missing.push("property_name");
        }
        if self.is_list.is_none() {
            missing.push("is_list");
        }
        missing
    }
}

/// Allowed values and synthesized type name of one enum column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMetadata {
    /// Synthesized enum type name (e.g. `StatusEnum`).
    pub name: String,
    pub values: Vec<String>,
    /// Where the enum was declared, for generator traceability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl EnumMetadata {
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

/// A declared class that generators must be able to import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<DeclarationRef>,
    #[serde(default)]
    pub location: String,
}

/// Typed partial update of a model's flags.
///
/// # Examples
///
/// ```
/// use schema_registry_core::{ModelMetadata, ModelOptions};
///
/// let mut model = ModelMetadata::new("User", Vec::new());
/// ModelOptions::new().api_only(true).merge_into(&mut model);
/// ModelOptions::new().db_only(false).merge_into(&mut model);
///
/// assert_eq!(model.api_only, Some(true));
/// assert_eq!(model.db_only, Some(false));
/// assert_eq!(model.is_abstract, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelOptions {
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub is_abstract: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_only: Option<bool>,
    /// `Some(false)` drops the default catalog columns from the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_columns: Option<bool>,
}

impl ModelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abstract_model(mut self, value: bool) -> Self {
        self.is_abstract = Some(value);
        self
    }

    pub fn api_only(mut self, value: bool) -> Self {
        self.api_only = Some(value);
        self
    }

    pub fn db_only(mut self, value: bool) -> Self {
        self.db_only = Some(value);
        self
    }

    pub fn base_columns(mut self, value: bool) -> Self {
        self.base_columns = Some(value);
        self
    }

    /// Shallow overwrite of the flags that are set.
    ///
    /// `base_columns` is not a model flag; the registry interprets it.
    pub fn merge_into(&self, model: &mut ModelMetadata) {
        if let Some(v) = self.is_abstract {
            model.is_abstract = Some(v);
        }
        if let Some(v) = self.api_only {
            model.api_only = Some(v);
        }
        if let Some(v) = self.db_only {
            model.db_only = Some(v);
        }
    }
}

/// Accumulated metadata for one model.
///
/// Columns and relations only ever grow; duplicates for the same property
/// name are kept in registration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub is_abstract: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<DeclarationRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnMetadata>,
    #[serde(default)]
    pub relations: Vec<RelationMetadata>,
}

impl ModelMetadata {
    /// Creates a model seeded with `columns` and no relations.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnMetadata>) -> Self {
        Self {
            name: name.into(),
            is_abstract: None,
            api_only: None,
            db_only: None,
            declaration: None,
            location: None,
            columns,
            relations: Vec::new(),
        }
    }

    /// First column registered under `property_name`.
    pub fn get_column(&self, property_name: &str) -> Option<&ColumnMetadata> {
        self.columns
            .iter()
            .find(|c| c.property_name == property_name)
    }

    /// Every column registered under `property_name`, in registration order.
    pub fn columns_named<'a>(
        &'a self,
        property_name: &'a str,
    ) -> impl Iterator<Item = &'a ColumnMetadata> + 'a {
        self.columns
            .iter()
            .filter(move |c| c.property_name == property_name)
    }

    /// Property names of the columns whose `unique` facet is set, in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use schema_registry_core::{ColumnMetadata, FieldType, ModelMetadata};
    ///
    /// let mut email = ColumnMetadata::new("email", FieldType::Email);
    /// email.unique = true;
    /// let model = ModelMetadata::new(
    ///     "User",
    ///     vec![ColumnMetadata::new("name", FieldType::String), email],
    /// );
    /// assert_eq!(model.unique_columns(), vec!["email"]);
    /// ```
    pub fn unique_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.unique)
            .map(|c| c.property_name.as_str())
            .collect()
    }

    /// Gets a relation by its property name.
    pub fn get_relation(&self, property_name: &str) -> Option<&RelationMetadata> {
        self.relations
            .iter()
            .find(|r| r.property_name == property_name)
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract.unwrap_or(false)
    }

    pub fn is_api_only(&self) -> bool {
        self.api_only.unwrap_or(false)
    }

    pub fn is_db_only(&self) -> bool {
        self.db_only.unwrap_or(false)
    }
}
