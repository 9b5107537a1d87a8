//! Configuration type definitions for tenant drivers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration structure.
///
/// Holds one [`DriverConfig`] per tenant driver, keyed by driver name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of tenants fetched per batch during chunked traversal.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Per-driver tenant configuration, keyed by driver name.
    #[serde(default)]
    pub drivers: HashMap<String, DriverConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            drivers: HashMap::new(),
        }
    }
}

/// Per-driver tenant configuration.
///
/// Every field is optional except `shared`; unset fields fall back to the
/// driver-level defaults described on each field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Explicit connection-name override. May contain `{path}` placeholders
    /// resolved against the tenant's attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Template descriptor for synthesizing per-tenant connections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionTemplate>,

    /// Explicit migration-table name template. Bypasses the shared/unshared
    /// naming policy entirely when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration: Option<String>,

    /// Whether every tenant gets its own prefixed migration table (true,
    /// the default) or all tenants share one fixed table (false).
    #[serde(default = "default_true")]
    pub shared: bool,

    /// Migration-table prefix. Defaults to the driver name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Tenant entity type identifier, checked against the repository at
    /// orchestrator construction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Directory holding this driver's migration files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            database: None,
            connection: None,
            migration: None,
            shared: true,
            prefix: None,
            model: None,
            path: None,
        }
    }
}

impl DriverConfig {
    /// Effective table prefix: the configured one, or the driver name.
    pub fn prefix_or<'a>(&'a self, driver: &'a str) -> &'a str {
        self.prefix.as_deref().unwrap_or(driver)
    }
}

/// Connection template descriptor.
///
/// `name` is the connection identifier (itself a template), `template` is the
/// raw descriptor string handed to the connection-definition resolver when a
/// definition has to be synthesized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionTemplate {
    /// Connection name, possibly containing `{path}` placeholders.
    pub name: String,

    /// Raw template string passed through to the resolver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

// Default value functions for serde
fn default_chunk_size() -> usize {
    100
}

fn default_true() -> bool {
    true
}
