//! Declaration files.
//!
//! Models can be declared in YAML or JSON instead of code. A file lists
//! interface names, importable classes and models with their fields, enums
//! and relations:
//!
//! ```yaml
//! interfaces: [Timestamped]
//! models:
//!   - name: User
//!     location: src/models/user.rs
//!     fields:
//!       - { name: email, type: email, unique: true }
//!       - { name: status, type: enum, enum_name: UserStatus, enum_values: [ACTIVE, BANNED] }
//!     relations:
//!       - { property: posts, target: Post, list: true }
//! ```
//!
//! Enum values may be strings, numbers or booleans; non-string scalars are
//! stored as their string form. Field keys that are not column facets are
//! logged at `warn` and ignored.
//!
//! [`DeclarationSet`] loads many files and registers them together, marking
//! every interface before any model so file order does not matter for
//! interface exclusion.
//!
//! # Loading patterns
//!
//! ```no_run
//! use schema_registry::{DeclarationSet, Registry};
//!
//! let set = DeclarationSet::from_paths(&["models/", "extra.yaml"]).unwrap();
//! let mut registry = Registry::from_env();
//! set.register_into(&mut registry).unwrap();
//! ```

use std::collections::BTreeMap;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use schema_registry_core::{
    ColumnOptions, DeclarationRef, FieldType, ModelOptions, RelationOptions,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{RegistryError, Result};
use crate::registry::Registry;

const SUPPORTED_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Contents of one declaration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeclarationFile {
    pub interfaces: Vec<String>,
    pub classes: Vec<ClassDeclaration>,
    pub models: Vec<ModelDeclaration>,
}

/// An importable class that is not a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDeclaration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<String>,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDeclaration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub options: ModelOptions,
    #[serde(default)]
    pub fields: Vec<FieldDeclaration>,
    #[serde(default)]
    pub relations: Vec<RelationDeclaration>,
}

/// One column. Facet overrides sit next to `name` and `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(flatten)]
    pub options: ColumnOptions,
    /// Keys that are not column facets. Logged and otherwise ignored.
    #[serde(flatten)]
    pub unknown: BTreeMap<String, serde_json::Value>,
}

/// One relation; every key is required at registration time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationDeclaration {
    #[serde(alias = "property")]
    pub property_name: Option<String>,
    #[serde(alias = "target")]
    pub rel_model_name: Option<String>,
    #[serde(alias = "list")]
    pub is_list: Option<bool>,
}

impl FieldDeclaration {
    /// Enum name for an enum field, synthesized as `<Model><Column>Enum` when
    /// the file does not give one.
    fn enum_name(&self, model_name: &str) -> String {
        if let Some(name) = self.options.enum_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        let mut chars = self.name.chars();
        let column: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        format!("{model_name}{column}Enum")
    }
}

impl DeclarationFile {
    /// Loads a declaration file, choosing the parser by extension.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnsupportedFormat`] for extensions other than
    /// `json`, `yaml` and `yml`, [`IoError`](RegistryError::IoError) if the
    /// file cannot be read, or a JSON/YAML error if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = match extension(path) {
            Some("json") => {
                let reader = BufReader::new(std::fs::File::open(path)?);
                serde_json::from_reader(reader)?
            }
            Some("yaml" | "yml") => {
                let reader = BufReader::new(std::fs::File::open(path)?);
                serde_yaml::from_reader(reader)?
            }
            _ => return Err(RegistryError::UnsupportedFormat(path.to_path_buf())),
        };
        Ok(file)
    }

    pub fn from_yaml_str(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Registers this file alone.
    pub fn register_into(&self, registry: &mut Registry) -> Result<()> {
        self.mark_interfaces(registry);
        self.register_declarations(registry)
    }

    fn mark_interfaces(&self, registry: &mut Registry) {
        for name in &self.interfaces {
            registry.mark_interface(name.as_str());
        }
    }

    fn register_declarations(&self, registry: &mut Registry) -> Result<()> {
        for class in &self.classes {
            registry.add_class(
                class.name.as_str(),
                class.declaration.as_deref().map(DeclarationRef::new),
                class.location.as_str(),
            );
        }

        for model in &self.models {
            register_model(model, registry)?;
        }
        Ok(())
    }
}

fn register_model(model: &ModelDeclaration, registry: &mut Registry) -> Result<()> {
    let name = model.name.as_str();
    registry.add_model(
        name,
        model.declaration.as_deref().map(DeclarationRef::new),
        model.location.as_str(),
        &model.options,
    );

    let location = (!model.location.is_empty()).then_some(model.location.as_str());
    for field in &model.fields {
        if !field.unknown.is_empty() {
            let keys: Vec<&str> = field.unknown.keys().map(String::as_str).collect();
            warn!(model = name, field = %field.name, ?keys, "ignoring unknown field options");
        }
        if field.field_type == FieldType::Enum {
            let values = field.options.enum_values.clone().unwrap_or_default();
            registry.add_enum(
                name,
                &field.name,
                &field.enum_name(name),
                values,
                location,
                &field.options,
            );
        } else {
            registry.add_field(field.field_type, name, &field.name, &field.options);
        }
    }

    for relation in &model.relations {
        registry.add_model_relation(RelationOptions {
            model_name: Some(model.name.clone()),
            rel_model_name: relation.rel_model_name.clone(),
            property_name: relation.property_name.clone(),
            is_list: relation.is_list,
        })?;
    }
    Ok(())
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

/// Declaration files loaded together, in load order.
#[derive(Debug, Clone, Default)]
pub struct DeclarationSet {
    files: Vec<(PathBuf, DeclarationFile)>,
}

impl DeclarationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every path in order.
    ///
    /// Directories contribute their `json`/`yaml`/`yml` files sorted by name
    /// (not recursively); other files in a directory are skipped. A file path
    /// given explicitly must have a supported extension.
    ///
    /// # Errors
    ///
    /// Fails on the first unreadable or unparsable file.
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut set = Self::new();
        for path in paths {
            let path = path.as_ref();
            if path.is_dir() {
                set.load_dir(path)?;
            } else {
                set.load_file(path)?;
            }
        }
        Ok(set)
    }

    fn load_dir(&mut self, dir: &Path) -> Result<()> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && extension(&path).is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e)) {
                files.push(path);
            } else {
                debug!(path = %path.display(), "skipping non-declaration entry");
            }
        }
        files.sort();

        for path in files {
            self.load_file(&path)?;
        }
        Ok(())
    }

    fn load_file(&mut self, path: &Path) -> Result<()> {
        let file = DeclarationFile::load(path)?;
        info!(
            path = %path.display(),
            models = file.models.len(),
            interfaces = file.interfaces.len(),
            "loaded declaration file"
        );
        self.push(path, file);
        Ok(())
    }

    pub fn push(&mut self, path: impl Into<PathBuf>, file: DeclarationFile) {
        self.files.push((path.into(), file));
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> impl Iterator<Item = (&Path, &DeclarationFile)> {
        self.files.iter().map(|(path, file)| (path.as_path(), file))
    }

    /// Registers every file: all interfaces first, then classes and models
    /// in load order.
    ///
    /// # Errors
    ///
    /// Stops at the first relation that is missing arguments.
    pub fn register_into(&self, registry: &mut Registry) -> Result<()> {
        for (_, file) in &self.files {
            file.mark_interfaces(registry);
        }
        for (path, file) in &self.files {
            debug!(path = %path.display(), "registering declarations");
            file.register_declarations(registry)?;
        }
        Ok(())
    }
}
