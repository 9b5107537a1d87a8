//! Migration-runner construction and per-table caching.
//!
//! The runner itself is an external engine; this module owns only the
//! construction trigger and a cache guaranteeing at most one runner per
//! distinct tracking table for the lifetime of the orchestration run.
//! Tenants that resolve to the same table share one runner. Runners are
//! never proactively closed; resource cleanup belongs to the runner and
//! connection layers.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::error::Result;

/// Migration-state repository bound to one tracking table.
///
/// Constructed by the external [`RepositoryProvider`]; the provider's
/// implementation supplies the database handle the repository reads and
/// writes through.
pub trait MigrationRepository: Send + Sync {
    /// The tracking table this repository records applied migrations in.
    fn table(&self) -> &str;
}

/// Constructs migration-state repositories; external collaborator.
pub trait RepositoryProvider: Send + Sync {
    /// Build a repository bound to the given tracking table.
    fn repository(&self, table: &str) -> Arc<dyn MigrationRepository>;
}

/// The external migration engine, scoped to one tracking table.
///
/// Execution semantics (which files apply, rollback batching, retries) are
/// entirely the runner's own; this crate never interprets the results.
#[async_trait]
pub trait MigrationRunner: Send + Sync {
    /// Apply pending migrations found under the given directories.
    /// Returns the names of the migrations that ran.
    async fn run(&self, paths: &[PathBuf]) -> Result<Vec<String>>;

    /// Roll back the most recent batch of applied migrations.
    /// Returns the names of the migrations rolled back.
    async fn rollback(&self, paths: &[PathBuf]) -> Result<Vec<String>>;

    /// The tracking table this runner records state in.
    fn repository_table(&self) -> &str;
}

/// Builds a runner around a table-bound repository; external collaborator.
///
/// Implementations own the database-access and migration-file handles the
/// runner needs; this crate hands over only the repository.
pub trait RunnerFactory: Send + Sync {
    /// Construct a runner recording state through `repository`.
    fn build(&self, repository: Arc<dyn MigrationRepository>) -> Arc<dyn MigrationRunner>;
}

/// Memoizes one migration runner per distinct tracking table.
pub struct MigratorCache {
    repositories: Arc<dyn RepositoryProvider>,
    factory: Arc<dyn RunnerFactory>,
    runners: Mutex<HashMap<String, Arc<dyn MigrationRunner>>>,
}

impl MigratorCache {
    /// Create an empty cache over the two external constructors.
    pub fn new(repositories: Arc<dyn RepositoryProvider>, factory: Arc<dyn RunnerFactory>) -> Self {
        Self {
            repositories,
            factory,
            runners: Mutex::new(HashMap::new()),
        }
    }

    /// Runner for a tracking table, constructed on first request.
    pub fn migrator_for(&self, table: &str) -> Arc<dyn MigrationRunner> {
        let mut runners = self.runners.lock().expect("migrator cache lock poisoned");
        runners
            .entry(table.to_string())
            .or_insert_with(|| {
                debug!(table = %table, "Constructing migration runner");
                let repository = self.repositories.repository(table);
                self.factory.build(repository)
            })
            .clone()
    }
}
