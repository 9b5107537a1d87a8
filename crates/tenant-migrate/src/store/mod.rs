//! Config-store contract for connection definitions and the default slot.
//!
//! The store is a generic dotted-path key-value repository owned by the
//! surrounding application. This crate reads driver configuration through
//! [`crate::config::Config`] instead; the store is used only for the two
//! pieces of shared database state: synthesized connection definitions under
//! `database.connections.<name>`, and the single mutable default-connection
//! slot at `database.default`.

mod memory;

pub use memory::MemoryConfigStore;

use serde_json::Value;

use crate::error::Result;

/// Dotted path of the mutable default-connection slot.
pub const DEFAULT_CONNECTION_PATH: &str = "database.default";

/// Dotted path of a named connection definition.
pub fn connection_path(name: &str) -> String {
    format!("database.connections.{}", name)
}

/// Generic dotted-path key-value store collaborator.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; writes must be visible to
/// subsequent reads through the same store instance.
pub trait ConfigStore: Send + Sync {
    /// Read the value at a dotted path, or `None` if absent.
    fn get(&self, path: &str) -> Result<Option<Value>>;

    /// Write a value at a dotted path, creating intermediate levels.
    fn set(&self, path: &str, value: Value) -> Result<()>;
}
