//! Error types for registry operations.
//!
//! Covers the registration contract (relation arguments), declaration file
//! and configuration parsing, and snapshot persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while registering or loading declarations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A relation registration omitted required arguments.
    #[error(
        "missing relation options for {}: {} (model_name, rel_model_name, property_name and is_list are required)",
        .model.as_deref().unwrap_or("<unknown model>"),
        .missing.join(", ")
    )]
    MissingRelationOptions {
        /// The model named by the call, if any.
        model: Option<String>,
        /// Names of the absent arguments.
        missing: Vec<&'static str>,
    },

    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A declaration file with an extension other than json/yaml/yml.
    #[error("unsupported declaration file: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Stored snapshot hash does not match its content.
    #[error("invalid snapshot hash: expected {expected}, found {actual}")]
    InvalidSnapshotHash { expected: String, actual: String },
}

/// Convenience alias for results with [`RegistryError`].
pub type Result<T> = std::result::Result<T, RegistryError>;
