//! Session-scoped cache of the feature catalog.
//!
//! # Purpose
//! The catalog is reference data every editing session needs before it can
//! accept a single grant. `CatalogCache` loads it once from a
//! [`CatalogProvider`], validates it, and hands out shared `Arc<Catalog>`
//! snapshots until the owner calls [`CatalogCache::invalidate`].
//!
//! # Key invariants
//! - A failed load leaves the cache empty; there is no automatic retry.
//! - Concurrent first calls may both fetch; the first stored snapshot wins.
use crate::error::ProfileError;
use crate::store::CatalogProvider;
use rolegate_policy::Catalog;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct CatalogCache {
    provider: Arc<dyn CatalogProvider>,
    slot: RwLock<Option<Arc<Catalog>>>,
}

impl CatalogCache {
    pub fn new(provider: Arc<dyn CatalogProvider>) -> Self {
        Self {
            provider,
            slot: RwLock::new(None),
        }
    }

    /// Return the cached catalog, loading it on first use.
    ///
    /// # Errors
    /// - `TransportFailure` when the provider fails or returns a catalog with
    ///   duplicate codes. Either blocks the whole configuration workflow.
    pub async fn get(&self) -> Result<Arc<Catalog>, ProfileError> {
        // Step 1: fast path on a read lock.
        if let Some(catalog) = self.slot.read().await.as_ref() {
            return Ok(Arc::clone(catalog));
        }

        // Step 2: fetch and validate outside any lock.
        let features = self.provider.list_features().await.map_err(|err| {
            tracing::error!(error = %err, "catalog load failed");
            ProfileError::TransportFailure(format!("catalog unavailable: {err}"))
        })?;
        let catalog = Catalog::new(features).map_err(|err| {
            tracing::error!(error = %err, "catalog rejected");
            ProfileError::TransportFailure(format!("catalog invalid: {err}"))
        })?;

        // Step 3: populate unless another caller already did.
        let mut slot = self.slot.write().await;
        let catalog = slot.get_or_insert_with(|| Arc::new(catalog));
        tracing::debug!(features = catalog.len(), "catalog loaded");
        Ok(Arc::clone(catalog))
    }

    /// Drop the cached snapshot; the next `get` reloads.
    pub async fn invalidate(&self) {
        self.slot.write().await.take();
    }

    pub async fn is_loaded(&self) -> bool {
        self.slot.read().await.is_some()
    }
}
