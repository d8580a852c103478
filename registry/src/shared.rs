//! Process-wide registry handle.
//!
//! Declarations scattered across a program register into one shared
//! [`Registry`]. [`global`] creates it on first use from the environment and
//! hands out clones of the same [`SharedRegistry`] afterwards; it never
//! replaces the instance. Explicit handles from [`new_shared`] are the
//! preferred path for tests and embedders that want isolation.
//!
//! # Examples
//!
//! ```
//! use schema_registry::shared;
//! use schema_registry_core::{ColumnOptions, FieldType};
//!
//! let registry = shared::global();
//! registry
//!     .write()
//!     .add_field(FieldType::String, "Invoice", "number", &ColumnOptions::new());
//!
//! assert!(shared::global().read().get_model("Invoice").is_some());
//! ```

use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::debug;

use crate::config::RegistryConfig;
use crate::registry::Registry;

/// Cloneable handle to a lock-guarded registry.
pub type SharedRegistry = Arc<RwLock<Registry>>;

static GLOBAL: OnceLock<SharedRegistry> = OnceLock::new();

/// Wraps a fresh registry in a [`SharedRegistry`].
pub fn new_shared(config: RegistryConfig) -> SharedRegistry {
    Arc::new(RwLock::new(Registry::new(config)))
}

/// Returns the process-wide registry, creating it on first call.
///
/// Concurrent first calls observe the same instance.
pub fn global() -> SharedRegistry {
    GLOBAL
        .get_or_init(|| {
            let config = RegistryConfig::from_env();
            debug!(filter_by_default = config.filter_by_default, "initializing global registry");
            new_shared(config)
        })
        .clone()
}

/// Empties the process-wide registry and re-resolves its defaults from
/// `config`.
///
/// Handles obtained earlier from [`global`] observe the reset.
pub fn reset_global(config: RegistryConfig) {
    let mut created = false;
    let shared = GLOBAL.get_or_init(|| {
        created = true;
        new_shared(config)
    });
    if !created {
        debug!(filter_by_default = config.filter_by_default, "resetting global registry");
        *shared.write() = Registry::new(config);
    }
}
