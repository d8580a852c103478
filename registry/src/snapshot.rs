//! Snapshot persistence and content hashing.
//!
//! A sealed snapshot carries a SHA-256 digest of its content so generators
//! can detect stale or hand-edited files. The digest covers models, enums,
//! classes and interfaces; `generated_at` and the hash field itself are
//! excluded, so two snapshots of the same registry state hash equally.
//!
//! # Examples
//!
//! ```no_run
//! use schema_registry::{Registry, load_snapshot, save_snapshot, verify_snapshot};
//!
//! let registry = Registry::default();
//! let snapshot = registry.snapshot_with_hash("2024-01-15T10:30:00Z").unwrap();
//!
//! save_snapshot(&snapshot, "schema.json").unwrap();
//! let loaded = load_snapshot("schema.json").unwrap();
//! verify_snapshot(&loaded).unwrap();
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use schema_registry_core::{SCHEMA_CONTRACT_VERSION, SchemaSnapshot};
use sha2::{Digest, Sha256};

use crate::error::{RegistryError, Result};

/// Computes the SHA-256 hex digest of `snapshot`'s content.
///
/// # Errors
///
/// Returns [`JsonError`](crate::RegistryError::JsonError) if serialization
/// fails.
pub fn compute_snapshot_hash(snapshot: &SchemaSnapshot) -> Result<String> {
    let mut canonical = snapshot.clone();
    canonical.generated_at = String::new();
    canonical.snapshot_hash = None;

    let bytes = serde_json::to_vec(&canonical)?;
    let hash = Sha256::digest(&bytes);
    Ok(format!("{:x}", hash))
}

/// Stamps the contract version and content hash onto `snapshot`.
pub fn seal_snapshot(mut snapshot: SchemaSnapshot) -> Result<SchemaSnapshot> {
    snapshot.schema_version = Some(SCHEMA_CONTRACT_VERSION.to_string());
    snapshot.snapshot_hash = Some(compute_snapshot_hash(&snapshot)?);
    Ok(snapshot)
}

/// Checks a sealed snapshot against its recorded hash.
///
/// Unsealed snapshots pass.
///
/// # Errors
///
/// Returns [`RegistryError::InvalidSnapshotHash`] when the recorded hash does
/// not match the content.
pub fn verify_snapshot(snapshot: &SchemaSnapshot) -> Result<()> {
    let Some(expected) = snapshot.snapshot_hash.as_deref() else {
        return Ok(());
    };

    let actual = compute_snapshot_hash(snapshot)?;
    if actual != expected {
        return Err(RegistryError::InvalidSnapshotHash {
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

/// Loads a snapshot from a JSON file.
///
/// # Errors
///
/// Returns [`IoError`](crate::RegistryError::IoError) if the file cannot be
/// read, or [`JsonError`](crate::RegistryError::JsonError) if the content is
/// not valid snapshot JSON.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<SchemaSnapshot> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let snapshot = serde_json::from_reader(reader)?;
    Ok(snapshot)
}

/// Saves a snapshot as pretty-printed JSON.
pub fn save_snapshot(snapshot: &SchemaSnapshot, path: impl AsRef<Path>) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, snapshot)?;
    Ok(())
}
