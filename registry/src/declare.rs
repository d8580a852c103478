//! Typed model declarations.
//!
//! A type implementing [`DeclareModel`] describes its columns and relations
//! once; [`Registry::declare`] replays that description into a registry.
//! Interfaces implement the same trait with `INTERFACE = true`: declaring one
//! only marks its name, while concrete models pull its fields in through
//! [`ModelBuilder::extends`].
//!
//! # Examples
//!
//! ```
//! use schema_registry::{DeclareModel, ModelBuilder, Registry};
//! use schema_registry_core::ColumnOptions;
//!
//! struct Named;
//!
//! impl DeclareModel for Named {
//!     const NAME: &'static str = "Named";
//!     const INTERFACE: bool = true;
//!
//!     fn declare(model: &mut ModelBuilder<'_>) {
//!         model.string("name", ColumnOptions::new());
//!     }
//! }
//!
//! struct User;
//!
//! impl DeclareModel for User {
//!     const NAME: &'static str = "User";
//!
//!     fn declare(model: &mut ModelBuilder<'_>) {
//!         model
//!             .extends::<Named>()
//!             .email("email", ColumnOptions::new().unique(true))
//!             .enumeration("status", "UserStatus", ["ACTIVE", "BANNED"], ColumnOptions::new())
//!             .many("posts", "Post");
//!     }
//! }
//!
//! let mut registry = Registry::default();
//! registry.declare::<Named>().unwrap();
//! registry.declare::<User>().unwrap();
//!
//! assert!(registry.get_model("Named").is_none());
//! let user = registry.get_model("User").unwrap();
//! assert!(user.get_column("name").is_some());
//! assert_eq!(registry.get_enum("User", "status").unwrap().name, "UserStatus");
//! ```

use schema_registry_core::{
    ColumnOptions, DeclarationRef, FieldType, ModelOptions, RelationOptions,
};

use crate::error::{RegistryError, Result};
use crate::registry::Registry;

/// A model (or interface) whose metadata is declared in code.
pub trait DeclareModel {
    /// Registered model name.
    const NAME: &'static str;

    /// Interfaces are excluded from the model map.
    const INTERFACE: bool = false;

    /// Source location recorded for the model and its enums.
    const LOCATION: &'static str = "";

    /// Model-level flags.
    fn options() -> ModelOptions {
        ModelOptions::default()
    }

    /// Registers the model's columns and relations.
    fn declare(model: &mut ModelBuilder<'_>);
}

impl Registry {
    /// Registers `M` and everything it declares.
    ///
    /// # Errors
    ///
    /// Returns the first relation registration error raised while declaring.
    /// Registrations made before the error are kept.
    pub fn declare<M: DeclareModel>(&mut self) -> Result<()> {
        if M::INTERFACE {
            self.mark_interface(M::NAME);
            return Ok(());
        }

        self.add_model(
            M::NAME,
            Some(DeclarationRef::of::<M>()),
            M::LOCATION,
            &M::options(),
        );

        let mut builder = ModelBuilder::new(self, M::NAME).location(M::LOCATION);
        M::declare(&mut builder);
        builder.finish()
    }
}

/// Registers columns and relations against one model.
///
/// Methods chain; the first relation error is held until
/// [`finish`](ModelBuilder::finish).
pub struct ModelBuilder<'r> {
    registry: &'r mut Registry,
    model_name: String,
    location: Option<String>,
    error: Option<RegistryError>,
}

impl<'r> ModelBuilder<'r> {
    pub fn new(registry: &'r mut Registry, model_name: impl Into<String>) -> Self {
        Self {
            registry,
            model_name: model_name.into(),
            location: None,
            error: None,
        }
    }

    /// Sets the location recorded on enums declared through this builder.
    pub fn location(mut self, location: impl Into<String>) -> Self {
        let location = location.into();
        self.location = (!location.is_empty()).then_some(location);
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Merges model-level flags, as [`Registry::add_model`] does.
    pub fn options(&mut self, options: ModelOptions) -> &mut Self {
        let location = self.location.clone().unwrap_or_default();
        self.registry
            .add_model(&self.model_name, None, location, &options);
        self
    }

    pub fn field(
        &mut self,
        field_type: FieldType,
        column_name: &str,
        options: ColumnOptions,
    ) -> &mut Self {
        self.registry
            .add_field(field_type, &self.model_name, column_name, &options);
        self
    }

    pub fn boolean(&mut self, column_name: &str, options: ColumnOptions) -> &mut Self {
        self.field(FieldType::Boolean, column_name, options)
    }

    pub fn date(&mut self, column_name: &str, options: ColumnOptions) -> &mut Self {
        self.field(FieldType::Date, column_name, options)
    }

    pub fn date_only(&mut self, column_name: &str, options: ColumnOptions) -> &mut Self {
        self.field(FieldType::DateOnly, column_name, options)
    }

    pub fn date_time(&mut self, column_name: &str, options: ColumnOptions) -> &mut Self {
        self.field(FieldType::DateTime, column_name, options)
    }

    pub fn email(&mut self, column_name: &str, options: ColumnOptions) -> &mut Self {
        self.field(FieldType::Email, column_name, options)
    }

    pub fn float(&mut self, column_name: &str, options: ColumnOptions) -> &mut Self {
        self.field(FieldType::Float, column_name, options)
    }

    pub fn id(&mut self, column_name: &str, options: ColumnOptions) -> &mut Self {
        self.field(FieldType::Id, column_name, options)
    }

    pub fn integer(&mut self, column_name: &str, options: ColumnOptions) -> &mut Self {
        self.field(FieldType::Integer, column_name, options)
    }

    pub fn json(&mut self, column_name: &str, options: ColumnOptions) -> &mut Self {
        self.field(FieldType::Json, column_name, options)
    }

    pub fn numeric(&mut self, column_name: &str, options: ColumnOptions) -> &mut Self {
        self.field(FieldType::Numeric, column_name, options)
    }

    pub fn string(&mut self, column_name: &str, options: ColumnOptions) -> &mut Self {
        self.field(FieldType::String, column_name, options)
    }

    pub fn bytea(&mut self, column_name: &str, options: ColumnOptions) -> &mut Self {
        self.field(FieldType::Bytea, column_name, options)
    }

    /// Declares an enum column and records its values.
    pub fn enumeration<V: Into<String>>(
        &mut self,
        column_name: &str,
        enum_name: &str,
        values: impl IntoIterator<Item = V>,
        options: ColumnOptions,
    ) -> &mut Self {
        self.registry.add_enum(
            &self.model_name,
            column_name,
            enum_name,
            values,
            self.location.as_deref(),
            &options,
        );
        self
    }

    /// Declares a to-one relation.
    pub fn relation(&mut self, property_name: &str, rel_model_name: &str) -> &mut Self {
        self.relate(property_name, rel_model_name, false)
    }

    /// Declares a to-many relation.
    pub fn many(&mut self, property_name: &str, rel_model_name: &str) -> &mut Self {
        self.relate(property_name, rel_model_name, true)
    }

    fn relate(&mut self, property_name: &str, rel_model_name: &str, is_list: bool) -> &mut Self {
        let result = self.registry.add_model_relation(RelationOptions::new(
            self.model_name.as_str(),
            rel_model_name,
            property_name,
            is_list,
        ));
        if let Err(err) = result {
            self.error.get_or_insert(err);
        }
        self
    }

    /// Replays `I`'s declarations against this model.
    pub fn extends<I: DeclareModel>(&mut self) -> &mut Self {
        I::declare(self);
        self
    }

    /// Returns the first relation error, if any.
    pub fn finish(self) -> Result<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use schema_registry_core::BASE_COLUMN_NAMES;

    use super::*;

    struct Timestamped;

    impl DeclareModel for Timestamped {
        const NAME: &'static str = "Timestamped";
        const INTERFACE: bool = true;

        fn declare(model: &mut ModelBuilder<'_>) {
            model.date_time("publishedAt", ColumnOptions::new().nullable(true));
        }
    }

    struct Post;

    impl DeclareModel for Post {
        const NAME: &'static str = "Post";
        const LOCATION: &'static str = "src/models/post.rs";

        fn options() -> ModelOptions {
            ModelOptions::new().api_only(true)
        }

        fn declare(model: &mut ModelBuilder<'_>) {
            model
                .string("title", ColumnOptions::new())
                .extends::<Timestamped>()
                .enumeration("state", "PostState", ["DRAFT", "LIVE"], ColumnOptions::new())
                .relation("author", "User")
                .many("tags", "Tag");
        }
    }

    struct Setting;

    impl DeclareModel for Setting {
        const NAME: &'static str = "Setting";

        fn options() -> ModelOptions {
            ModelOptions::new().base_columns(false)
        }

        fn declare(model: &mut ModelBuilder<'_>) {
            model.string("key", ColumnOptions::new().unique(true));
        }
    }

    struct Broken;

    impl DeclareModel for Broken {
        const NAME: &'static str = "Broken";

        fn declare(model: &mut ModelBuilder<'_>) {
            model
                .relation("", "User")
                .string("name", ColumnOptions::new())
                .many("", "Tag");
        }
    }

    #[test]
    fn test_declare_model_registers_everything() {
        let mut registry = Registry::default();
        registry.declare::<Timestamped>().unwrap();
        registry.declare::<Post>().unwrap();

        assert!(registry.is_interface("Timestamped"));
        assert!(registry.get_model("Timestamped").is_none());

        let post = registry.get_model("Post").unwrap();
        let names: Vec<&str> = post.columns.iter().map(|c| c.property_name.as_str()).collect();
        assert_eq!(names[..BASE_COLUMN_NAMES.len()], BASE_COLUMN_NAMES);
        assert_eq!(names[BASE_COLUMN_NAMES.len()..], ["title", "publishedAt", "state"]);
        assert!(post.get_column("publishedAt").unwrap().nullable);
        assert!(post.is_api_only());
        assert_eq!(post.location.as_deref(), Some("src/models/post.rs"));
        assert!(
            post.declaration
                .as_ref()
                .is_some_and(|d| d.as_str().ends_with("Post"))
        );

        assert_eq!(post.relations.len(), 2);
        assert!(!post.get_relation("author").unwrap().is_list);
        assert!(post.get_relation("tags").unwrap().is_list);

        let state = registry.get_enum("Post", "state").unwrap();
        assert_eq!(state.location.as_deref(), Some("src/models/post.rs"));
    }

    #[test]
    fn test_declare_without_base_columns() {
        let mut registry = Registry::default();
        registry.declare::<Setting>().unwrap();

        let setting = registry.get_model("Setting").unwrap();
        assert_eq!(setting.columns.len(), 1);
        assert_eq!(registry.uniques_for_model(setting), vec!["key"]);
    }

    #[test]
    fn test_builder_options_keep_declaration() {
        let mut registry = Registry::default();
        registry.declare::<Post>().unwrap();

        ModelBuilder::new(&mut registry, "Post")
            .options(ModelOptions::new().db_only(true))
            .string("slug", ColumnOptions::new());

        let post = registry.get_model("Post").unwrap();
        assert!(post.is_api_only());
        assert!(post.is_db_only());
        assert!(post.get_column("slug").is_some());

        let class = registry.get_class("Post").unwrap();
        assert!(class.declaration.is_some());
        assert_eq!(class.location, "src/models/post.rs");
    }

    #[test]
    fn test_declare_reports_first_relation_error() {
        let mut registry = Registry::default();
        let err = registry.declare::<Broken>().unwrap_err();

        match err {
            RegistryError::MissingRelationOptions { model, missing } => {
                assert_eq!(model.as_deref(), Some("Broken"));
                assert_eq!(missing, vec!["property_name"]);
            }
            other => panic!("unexpected error: {other}"),
        }

        let broken = registry.get_model("Broken").unwrap();
        assert!(broken.get_column("name").is_some());
        assert!(broken.relations.is_empty());
    }
}
