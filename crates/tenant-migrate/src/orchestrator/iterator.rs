//! Tenant traversal: single lookup and chunked bulk iteration.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{Result, TenancyError};
use crate::tenant::{TenantEntity, TenantRepository};

/// Drives tenant traversal over the persistence collaborator.
///
/// Both modes are synchronous with respect to the supplied action: the next
/// entity or batch is not fetched until the current action returns, so the
/// chunked mode holds at most one batch in memory. Traversal is forward-only
/// with no checkpointing; resuming after a crash means re-running the whole
/// traversal.
pub struct EntityIterator {
    repository: Arc<dyn TenantRepository>,
    chunk_size: usize,
}

impl EntityIterator {
    /// Create an iterator fetching `chunk_size` tenants per batch.
    pub fn new(repository: Arc<dyn TenantRepository>, chunk_size: usize) -> Self {
        Self {
            repository,
            chunk_size,
        }
    }

    /// Fetch exactly one tenant by key and invoke the action on it.
    ///
    /// Fails with [`TenancyError::NotFound`] if the key is absent; the
    /// action is never invoked in that case. No retry.
    pub async fn by_id<F, Fut>(&self, key: &str, mut action: F) -> Result<()>
    where
        F: FnMut(Arc<dyn TenantEntity>) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let tenant = self
            .repository
            .find(key)
            .await?
            .ok_or_else(|| TenancyError::NotFound(key.to_string()))?;
        action(tenant).await
    }

    /// Invoke the action once per tenant, batch by batch, in the order the
    /// persistence layer returns them.
    ///
    /// An action error aborts the traversal and propagates.
    pub async fn each_chunk<F, Fut>(&self, mut action: F) -> Result<()>
    where
        F: FnMut(Arc<dyn TenantEntity>) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let mut offset = 0;
        let mut processed = 0usize;

        loop {
            let batch = self
                .repository
                .fetch_batch(offset, self.chunk_size)
                .await?;
            if batch.is_empty() {
                break;
            }

            let fetched = batch.len();
            debug!(offset, fetched, "Fetched tenant batch");

            for tenant in batch {
                action(tenant).await?;
                processed += 1;
            }

            if fetched < self.chunk_size {
                break;
            }
            offset += fetched;
        }

        info!(processed, "Finished tenant traversal");
        Ok(())
    }
}
