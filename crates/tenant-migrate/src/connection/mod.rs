//! Per-tenant connection resolution and activation.
//!
//! Activation resolves which named connection a tenant's migrations run
//! against, synthesizes the connection definition on first use when a
//! template is configured, and points the store's single default-connection
//! slot at the result. The default slot is shared mutable state overwritten
//! on every activation; callers must process tenants strictly sequentially.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::DriverConfig;
use crate::error::{Result, TenancyError};
use crate::store::{connection_path, ConfigStore, DEFAULT_CONNECTION_PATH};
use crate::template;
use crate::tenant::{TenantDataCache, TenantEntity};

/// Synthesizes connection definitions for tenants that do not have one yet.
///
/// Configured per driver and supplied at orchestrator construction. Given
/// the tenant, the driver's raw template descriptor, and the resolved
/// connection name, it returns the definition record (host, credentials,
/// etc.) to be written into the store.
#[async_trait]
pub trait ConnectionDefinitionResolver: Send + Sync {
    /// Build a connection definition for a tenant.
    async fn resolve(
        &self,
        tenant: &dyn TenantEntity,
        template: Option<&str>,
        connection: &str,
    ) -> Result<Value>;
}

/// Resolves and activates the physical connection for a tenant.
pub struct ConnectionResolver {
    config: DriverConfig,
    store: Arc<dyn ConfigStore>,
    resolver: Option<Arc<dyn ConnectionDefinitionResolver>>,
    cache: Arc<TenantDataCache>,
}

impl ConnectionResolver {
    /// Create a resolver for one driver.
    pub fn new(
        config: DriverConfig,
        store: Arc<dyn ConfigStore>,
        cache: Arc<TenantDataCache>,
    ) -> Self {
        Self {
            config,
            store,
            resolver: None,
            cache,
        }
    }

    /// Attach the definition resolver used to synthesize missing connections.
    pub fn with_definition_resolver(
        mut self,
        resolver: Arc<dyn ConnectionDefinitionResolver>,
    ) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Resolve the tenant's connection name, ensure its definition exists,
    /// and point the default-connection slot at it.
    ///
    /// Idempotent: re-activating the same tenant does not re-synthesize an
    /// existing definition, and always leaves `database.default` on the
    /// tenant's connection.
    pub async fn activate(&self, tenant: &dyn TenantEntity) -> Result<String> {
        let attributes = self.cache.attributes_for(tenant);

        // Candidate: the driver's configured database, else whatever the
        // store currently calls the default connection.
        let mut candidate = match &self.config.database {
            Some(database) => database.clone(),
            None => match self.store.get(DEFAULT_CONNECTION_PATH)? {
                Some(Value::String(name)) => name,
                Some(other) => {
                    return Err(TenancyError::Store(format!(
                        "{} holds a non-string value: {}",
                        DEFAULT_CONNECTION_PATH, other
                    )))
                }
                None => {
                    return Err(TenancyError::Config(
                        "driver has no database configured and no default connection is set"
                            .into(),
                    ))
                }
            },
        };

        if let Some(connection) = &self.config.connection {
            candidate = connection.name.clone();
        }

        let candidate = template::bind(&candidate, &attributes)?;
        let definition_path = connection_path(&candidate);

        if self.store.get(&definition_path)?.is_none() {
            match &self.config.connection {
                Some(connection) => {
                    let resolver = self.resolver.as_ref().ok_or_else(|| {
                        TenancyError::Config(format!(
                            "connection {:?} needs synthesis but no definition resolver is attached",
                            candidate
                        ))
                    })?;

                    debug!(connection = %candidate, tenant = %tenant.key(), "Synthesizing connection definition");
                    let definition = resolver
                        .resolve(tenant, connection.template.as_deref(), &candidate)
                        .await
                        .map_err(|err| TenancyError::synthesis(&candidate, err.to_string()))?;

                    if !definition.is_object() {
                        return Err(TenancyError::synthesis(
                            &candidate,
                            "resolver returned a non-object definition",
                        ));
                    }

                    self.store.set(&definition_path, definition)?;
                    info!(connection = %candidate, "Stored synthesized connection definition");
                }
                None => {
                    warn!(
                        connection = %candidate,
                        "Connection has no stored definition and no template to synthesize one"
                    );
                }
            }
        }

        self.store
            .set(DEFAULT_CONNECTION_PATH, Value::String(candidate.clone()))?;
        debug!(connection = %candidate, tenant = %tenant.key(), "Activated tenant connection");

        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionTemplate;
    use crate::store::MemoryConfigStore;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubTenant;

    impl TenantEntity for StubTenant {
        fn key(&self) -> String {
            "7".into()
        }

        fn attributes(&self) -> Value {
            json!({ "name": "Acme" })
        }
    }

    struct CountingResolver {
        calls: AtomicUsize,
        fail: bool,
        definition: Value,
    }

    impl CountingResolver {
        fn returning(definition: Value) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
                definition,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
                definition: Value::Null,
            }
        }
    }

    #[async_trait]
    impl ConnectionDefinitionResolver for CountingResolver {
        async fn resolve(
            &self,
            _tenant: &dyn TenantEntity,
            _template: Option<&str>,
            connection: &str,
        ) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TenancyError::Store(format!(
                    "secrets backend unavailable for {}",
                    connection
                )));
            }
            Ok(self.definition.clone())
        }
    }

    fn templated_config() -> DriverConfig {
        DriverConfig {
            connection: Some(ConnectionTemplate {
                name: "acme_{id}".to_string(),
                template: Some("acme".to_string()),
            }),
            ..Default::default()
        }
    }

    fn resolver_with(
        config: DriverConfig,
        store: Arc<dyn ConfigStore>,
        definitions: Option<Arc<dyn ConnectionDefinitionResolver>>,
    ) -> ConnectionResolver {
        let base = ConnectionResolver::new(config, store, Arc::new(TenantDataCache::new()));
        match definitions {
            Some(definitions) => base.with_definition_resolver(definitions),
            None => base,
        }
    }

    #[tokio::test]
    async fn test_activation_synthesizes_once() {
        let store = Arc::new(MemoryConfigStore::new());
        let definitions = Arc::new(CountingResolver::returning(json!({ "host": "db.acme" })));
        let resolver = resolver_with(templated_config(), store.clone(), Some(definitions.clone()));

        let first = resolver.activate(&StubTenant).await.unwrap();
        let second = resolver.activate(&StubTenant).await.unwrap();

        assert_eq!(first, "acme_7");
        assert_eq!(second, "acme_7");
        assert_eq!(definitions.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            store.get("database.connections.acme_7.host").unwrap(),
            Some(json!("db.acme"))
        );
        assert_eq!(
            store.get(DEFAULT_CONNECTION_PATH).unwrap(),
            Some(json!("acme_7"))
        );
    }

    #[tokio::test]
    async fn test_database_override_without_connection_template() {
        let store = Arc::new(MemoryConfigStore::with_root(json!({
            "database": { "connections": { "acme_base": { "host": "db" } } }
        })));
        let config = DriverConfig {
            database: Some("acme_base".to_string()),
            ..Default::default()
        };
        let resolver = resolver_with(config, store.clone(), None);

        let name = resolver.activate(&StubTenant).await.unwrap();
        assert_eq!(name, "acme_base");
        assert_eq!(
            store.get(DEFAULT_CONNECTION_PATH).unwrap(),
            Some(json!("acme_base"))
        );
    }

    #[tokio::test]
    async fn test_connection_name_overrides_database() {
        let store = Arc::new(MemoryConfigStore::new());
        let mut config = templated_config();
        config.database = Some("ignored".to_string());
        let definitions = Arc::new(CountingResolver::returning(json!({})));
        let resolver = resolver_with(config, store, Some(definitions));

        let name = resolver.activate(&StubTenant).await.unwrap();
        assert_eq!(name, "acme_7");
    }

    #[tokio::test]
    async fn test_falls_back_to_store_default() {
        let store = Arc::new(MemoryConfigStore::with_root(json!({
            "database": {
                "default": "landlord",
                "connections": { "landlord": { "host": "db" } }
            }
        })));
        let resolver = resolver_with(DriverConfig::default(), store, None);

        let name = resolver.activate(&StubTenant).await.unwrap();
        assert_eq!(name, "landlord");
    }

    #[tokio::test]
    async fn test_no_database_and_no_default_is_config_error() {
        let store = Arc::new(MemoryConfigStore::new());
        let resolver = resolver_with(DriverConfig::default(), store, None);

        assert!(matches!(
            resolver.activate(&StubTenant).await,
            Err(TenancyError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_synthesis_failure_propagates_without_store_write() {
        let store = Arc::new(MemoryConfigStore::new());
        let definitions = Arc::new(CountingResolver::failing());
        let resolver = resolver_with(templated_config(), store.clone(), Some(definitions));

        let err = resolver.activate(&StubTenant).await.unwrap_err();
        assert!(matches!(err, TenancyError::ConfigSynthesis { .. }));
        assert_eq!(store.get("database.connections.acme_7").unwrap(), None);
        assert_eq!(store.get(DEFAULT_CONNECTION_PATH).unwrap(), None);
    }

    #[tokio::test]
    async fn test_non_object_definition_rejected() {
        let store = Arc::new(MemoryConfigStore::new());
        let definitions = Arc::new(CountingResolver::returning(json!("not a record")));
        let resolver = resolver_with(templated_config(), store, Some(definitions));

        assert!(matches!(
            resolver.activate(&StubTenant).await,
            Err(TenancyError::ConfigSynthesis { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_definition_resolver_is_config_error() {
        let store = Arc::new(MemoryConfigStore::new());
        let resolver = resolver_with(templated_config(), store, None);

        assert!(matches!(
            resolver.activate(&StubTenant).await,
            Err(TenancyError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_existing_definition_skips_resolver_entirely() {
        let store = Arc::new(MemoryConfigStore::with_root(json!({
            "database": { "connections": { "acme_7": { "host": "db" } } }
        })));
        let definitions = Arc::new(CountingResolver::returning(json!({})));
        let resolver = resolver_with(templated_config(), store, Some(definitions.clone()));

        let name = resolver.activate(&StubTenant).await.unwrap();
        assert_eq!(name, "acme_7");
        assert_eq!(definitions.calls.load(Ordering::SeqCst), 0);
    }
}
