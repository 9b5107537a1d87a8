//! Orchestrator facade - wires resolvers, caches, and tenant traversal.

mod iterator;

pub use iterator::EntityIterator;

use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::{Config, DriverConfig};
use crate::connection::{ConnectionDefinitionResolver, ConnectionResolver};
use crate::error::{Result, TenancyError};
use crate::migrator::{MigrationRunner, MigratorCache, RepositoryProvider, RunnerFactory};
use crate::store::ConfigStore;
use crate::table::TableNameResolver;
use crate::tenant::{TenantDataCache, TenantEntity, TenantRepository};

/// Tenant-migration orchestrator for one driver.
///
/// Owns the per-run caches and composes the resolvers. One instance covers
/// one orchestration run (a single command or request); its caches are never
/// invalidated. Tenants must be processed strictly sequentially - connection
/// activation overwrites the store's shared default-connection slot.
pub struct Orchestrator {
    driver: String,
    config: DriverConfig,
    connections: ConnectionResolver,
    tables: TableNameResolver,
    migrators: MigratorCache,
    iterator: EntityIterator,
    data: Arc<TenantDataCache>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("driver", &self.driver)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Create an orchestrator for `driver`.
    ///
    /// Fails with [`TenancyError::Config`] if the driver is not configured,
    /// and with [`TenancyError::InvalidModel`] if the driver's configured
    /// `model` does not match the entity type the repository serves.
    pub fn new(
        driver: &str,
        config: &Config,
        store: Arc<dyn ConfigStore>,
        repository: Arc<dyn TenantRepository>,
        repositories: Arc<dyn RepositoryProvider>,
        factory: Arc<dyn RunnerFactory>,
    ) -> Result<Self> {
        let driver_config = config.driver(driver)?.clone();

        if let Some(model) = &driver_config.model {
            let actual = repository.model();
            if model != actual {
                return Err(TenancyError::invalid_model(
                    model,
                    format!("repository serves entity type {:?}", actual),
                ));
            }
        }

        let data = Arc::new(TenantDataCache::new());

        let orchestrator = Self {
            driver: driver.to_string(),
            connections: ConnectionResolver::new(driver_config.clone(), store, data.clone()),
            tables: TableNameResolver::new(driver, driver_config.clone(), data.clone()),
            migrators: MigratorCache::new(repositories, factory),
            iterator: EntityIterator::new(repository, config.chunk_size),
            config: driver_config,
            data,
        };

        info!(driver = %orchestrator.driver, "Initialized tenant migration orchestrator");
        Ok(orchestrator)
    }

    /// Attach the definition resolver used to synthesize missing connections.
    pub fn with_connection_resolver(
        mut self,
        resolver: Arc<dyn ConnectionDefinitionResolver>,
    ) -> Self {
        self.connections = self.connections.with_definition_resolver(resolver);
        self
    }

    /// Driver this orchestrator serves.
    pub fn driver(&self) -> &str {
        &self.driver
    }

    /// Directory holding this driver's migration files, if configured.
    pub fn migration_path(&self) -> Option<&Path> {
        self.config.path.as_deref()
    }

    /// Flattened attribute snapshot for a tenant (cached per key).
    pub fn attributes_for(&self, tenant: &dyn TenantEntity) -> Arc<BTreeMap<String, String>> {
        self.data.attributes_for(tenant)
    }

    /// Activate the tenant's connection and return its name.
    ///
    /// See [`ConnectionResolver::activate`] for the synthesis and
    /// idempotence guarantees.
    pub async fn activate_connection(&self, tenant: &dyn TenantEntity) -> Result<String> {
        self.connections.activate(tenant).await
    }

    /// Resolve the migration-tracking table name for a tenant.
    pub fn migration_table(&self, tenant: &dyn TenantEntity) -> Result<String> {
        self.tables.resolve(tenant)
    }

    /// Runner for a tracking table, constructed on first request.
    pub fn migrator_for(&self, table: &str) -> Arc<dyn MigrationRunner> {
        self.migrators.migrator_for(table)
    }

    /// Resolve a tenant's tracking table and return the runner bound to it.
    pub fn migrator_for_tenant(
        &self,
        tenant: &dyn TenantEntity,
    ) -> Result<Arc<dyn MigrationRunner>> {
        let table = self.migration_table(tenant)?;
        Ok(self.migrator_for(&table))
    }

    /// Fetch exactly one tenant by key and invoke the action on it.
    pub async fn by_id<F, Fut>(&self, key: &str, action: F) -> Result<()>
    where
        F: FnMut(Arc<dyn TenantEntity>) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        self.iterator.by_id(key, action).await
    }

    /// Invoke the action once per tenant across all batches.
    pub async fn each_chunk<F, Fut>(&self, action: F) -> Result<()>
    where
        F: FnMut(Arc<dyn TenantEntity>) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        self.iterator.each_chunk(action).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrator::{MigrationRepository, RunnerFactory};
    use crate::store::MemoryConfigStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::path::PathBuf;

    struct StubTenant;

    impl TenantEntity for StubTenant {
        fn key(&self) -> String {
            "7".into()
        }

        fn attributes(&self) -> serde_json::Value {
            json!({})
        }
    }

    struct StubRepositoryLayer;

    #[async_trait]
    impl TenantRepository for StubRepositoryLayer {
        fn model(&self) -> &str {
            "Customer"
        }

        async fn find(&self, _key: &str) -> Result<Option<Arc<dyn TenantEntity>>> {
            Ok(Some(Arc::new(StubTenant)))
        }

        async fn fetch_batch(
            &self,
            _offset: usize,
            _limit: usize,
        ) -> Result<Vec<Arc<dyn TenantEntity>>> {
            Ok(vec![])
        }
    }

    struct StubMigrationRepository {
        table: String,
    }

    impl MigrationRepository for StubMigrationRepository {
        fn table(&self) -> &str {
            &self.table
        }
    }

    struct StubProvider;

    impl RepositoryProvider for StubProvider {
        fn repository(&self, table: &str) -> Arc<dyn MigrationRepository> {
            Arc::new(StubMigrationRepository {
                table: table.to_string(),
            })
        }
    }

    struct StubRunner {
        table: String,
    }

    #[async_trait]
    impl MigrationRunner for StubRunner {
        async fn run(&self, _paths: &[PathBuf]) -> Result<Vec<String>> {
            Ok(vec![])
        }

        async fn rollback(&self, _paths: &[PathBuf]) -> Result<Vec<String>> {
            Ok(vec![])
        }

        fn repository_table(&self) -> &str {
            &self.table
        }
    }

    struct StubFactory;

    impl RunnerFactory for StubFactory {
        fn build(&self, repository: Arc<dyn MigrationRepository>) -> Arc<dyn MigrationRunner> {
            Arc::new(StubRunner {
                table: repository.table().to_string(),
            })
        }
    }

    fn config_with_model(model: Option<&str>) -> Config {
        let mut config = Config::default();
        config.drivers.insert(
            "acme".to_string(),
            DriverConfig {
                model: model.map(String::from),
                ..Default::default()
            },
        );
        config
    }

    fn build(config: &Config) -> Result<Orchestrator> {
        Orchestrator::new(
            "acme",
            config,
            Arc::new(MemoryConfigStore::new()),
            Arc::new(StubRepositoryLayer),
            Arc::new(StubProvider),
            Arc::new(StubFactory),
        )
    }

    #[test]
    fn test_matching_model_accepted() {
        let config = config_with_model(Some("Customer"));
        assert!(build(&config).is_ok());
    }

    #[test]
    fn test_unset_model_skips_check() {
        let config = config_with_model(None);
        assert!(build(&config).is_ok());
    }

    #[test]
    fn test_mismatched_model_rejected() {
        let config = config_with_model(Some("Store"));
        let err = build(&config).unwrap_err();
        assert!(matches!(err, TenancyError::InvalidModel { .. }));
    }

    #[test]
    fn test_unknown_driver_rejected() {
        let config = Config::default();
        assert!(matches!(
            build(&config),
            Err(TenancyError::Config(_))
        ));
    }

    #[test]
    fn test_migrator_for_tenant_resolves_table_first() {
        let config = config_with_model(None);
        let orchestrator = build(&config).unwrap();

        let runner = orchestrator.migrator_for_tenant(&StubTenant).unwrap();
        assert_eq!(runner.repository_table(), "acme_7_migrations");

        let again = orchestrator.migrator_for_tenant(&StubTenant).unwrap();
        assert!(Arc::ptr_eq(&runner, &again));
    }
}
