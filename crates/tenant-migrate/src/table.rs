//! Migration-table naming policy.
//!
//! Decides which table tracks applied migrations for a tenant. First match
//! wins: an explicit `migration` template, else one prefixed table per
//! tenant (the `shared` default), else one fixed table for everybody.

use std::sync::Arc;

use tracing::debug;

use crate::config::DriverConfig;
use crate::error::Result;
use crate::template;
use crate::tenant::{TenantDataCache, TenantEntity};

/// Template used when every tenant gets its own migration table.
pub const PER_TENANT_TEMPLATE: &str = "{prefix}_{id}_migrations";

/// Fixed table name used when tenants do not get their own tables.
pub const FIXED_TABLE: &str = "tenant_migrations";

/// Resolves the migration-tracking table name for a tenant.
pub struct TableNameResolver {
    driver: String,
    config: DriverConfig,
    cache: Arc<TenantDataCache>,
}

impl TableNameResolver {
    /// Create a resolver for one driver.
    pub fn new(
        driver: impl Into<String>,
        config: DriverConfig,
        cache: Arc<TenantDataCache>,
    ) -> Self {
        Self {
            driver: driver.into(),
            config,
            cache,
        }
    }

    /// Resolve the migration-table name for a tenant.
    ///
    /// The configured prefix (defaulting to the driver name) participates in
    /// template resolution under the `prefix` key, alongside the tenant's
    /// flattened attributes.
    pub fn resolve(&self, tenant: &dyn TenantEntity) -> Result<String> {
        let snapshot = self.cache.attributes_for(tenant);
        let mut attributes = (*snapshot).clone();
        attributes.insert(
            "prefix".to_string(),
            self.config.prefix_or(&self.driver).to_string(),
        );

        let table = if let Some(migration) = self.config.migration.as_deref() {
            template::bind(migration, &attributes)?
        } else if self.config.shared {
            template::bind(PER_TENANT_TEMPLATE, &attributes)?
        } else {
            FIXED_TABLE.to_string()
        };

        debug!(tenant = %tenant.key(), table = %table, "Resolved migration table");
        Ok(table)
    }
}
