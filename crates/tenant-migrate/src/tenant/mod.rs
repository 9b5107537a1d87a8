//! Tenant entity contracts and the per-run attribute snapshot cache.
//!
//! The orchestrator never owns tenant entities; it reads them through the
//! [`TenantEntity`] capability trait and fetches them through a
//! [`TenantRepository`] collaborator. The [`TenantDataCache`] gives every
//! downstream template bind a consistent flattened view of each tenant for
//! the lifetime of one orchestration run.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::template::flatten;

/// Capability set a tenant entity must expose.
///
/// Implementations belong to the external persistence layer; this crate only
/// reads the unique key and the attribute tree.
pub trait TenantEntity: Send + Sync {
    /// Unique tenant key, rendered as a string.
    fn key(&self) -> String;

    /// Full attribute tree, flattened for template resolution.
    fn attributes(&self) -> Value;
}

/// Persistence collaborator for tenant entities.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow sharing across async tasks.
#[async_trait]
pub trait TenantRepository: Send + Sync {
    /// Identifier of the entity type this repository serves, checked against
    /// the driver's configured `model`.
    fn model(&self) -> &str;

    /// Find one tenant by key, or `None` if absent.
    async fn find(&self, key: &str) -> Result<Option<Arc<dyn TenantEntity>>>;

    /// Fetch the next batch of tenants, forward-only.
    ///
    /// Returns fewer than `limit` entities (possibly zero) when the
    /// collection is exhausted.
    async fn fetch_batch(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Arc<dyn TenantEntity>>>;
}

/// Per-run cache of flattened tenant attributes.
///
/// The first resolution for a tenant key flattens the entity's attribute
/// tree into `entity.<dotted.path>` keys plus `id`. Later resolutions return
/// the cached snapshot without re-reading the entity, so one orchestration
/// pass sees a consistent view even if the live entity changes. Entries are
/// never evicted; the owning orchestrator is expected to live for a single
/// run.
pub struct TenantDataCache {
    snapshots: Mutex<HashMap<String, Arc<BTreeMap<String, String>>>>,
}

impl TenantDataCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            snapshots: Mutex::new(HashMap::new()),
        }
    }

    /// Flattened attribute snapshot for a tenant, computed once per key.
    pub fn attributes_for(&self, tenant: &dyn TenantEntity) -> Arc<BTreeMap<String, String>> {
        let key = tenant.key();
        let mut snapshots = self.snapshots.lock().expect("tenant data cache lock poisoned");
        snapshots
            .entry(key.clone())
            .or_insert_with(|| {
                let mut map = BTreeMap::new();
                for (path, value) in flatten(&tenant.attributes()) {
                    map.insert(format!("entity.{}", path), value);
                }
                map.insert("id".to_string(), key);
                Arc::new(map)
            })
            .clone()
    }
}

impl Default for TenantDataCache {
    fn default() -> Self {
        Self::new()
    }
}
