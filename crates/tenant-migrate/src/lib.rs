//! # tenant-migrate
//!
//! Multi-tenant schema-migration orchestration library.
//!
//! Given a collection of tenant entities, each backed by its own logical
//! database or table namespace, this crate resolves which physical
//! connection and which migration-tracking table apply to a tenant, binds
//! that connection into the active configuration when it is not already
//! present, and hands out a migration runner scoped to the tenant's table:
//!
//! - **Connection resolution** with lazy, template-driven synthesis of
//!   per-tenant connection definitions
//! - **Table naming policy**: custom template, one prefixed table per
//!   tenant, or one fixed shared table
//! - **Runner caching**: one migration runner per distinct tracking table
//! - **Placeholder substitution** projecting tenant attributes into
//!   connection and table-name templates
//! - **Tenant traversal**: single lookup by key or chunked bulk iteration
//!
//! The ORM layer, the migration engine itself, the configuration store, and
//! service resolution are external collaborators behind traits.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tenant_migrate::{Config, MemoryConfigStore, Orchestrator};
//!
//! let config = Config::load("tenancy.yaml")?;
//! let store = Arc::new(MemoryConfigStore::new());
//! let orchestrator = Orchestrator::new(
//!     "acme", &config, store, repository, state_repositories, runner_factory,
//! )?
//! .with_connection_resolver(definitions);
//!
//! orchestrator
//!     .each_chunk(|tenant| async {
//!         orchestrator.activate_connection(&*tenant).await?;
//!         let runner = orchestrator.migrator_for_tenant(&*tenant)?;
//!         runner.run(&paths).await?;
//!         Ok(())
//!     })
//!     .await?;
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod migrator;
pub mod orchestrator;
pub mod store;
pub mod table;
pub mod template;
pub mod tenant;

// Re-exports for convenient access
pub use config::{Config, ConnectionTemplate, DriverConfig};
pub use connection::{ConnectionDefinitionResolver, ConnectionResolver};
pub use error::{Result, TenancyError};
pub use migrator::{
    MigrationRepository, MigrationRunner, MigratorCache, RepositoryProvider, RunnerFactory,
};
pub use orchestrator::{EntityIterator, Orchestrator};
pub use store::{ConfigStore, MemoryConfigStore};
pub use table::TableNameResolver;
pub use tenant::{TenantDataCache, TenantEntity, TenantRepository};
