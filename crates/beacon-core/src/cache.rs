//! Last-known-good endpoint cache.
//!
//! The cache is an optimization, not a source of truth: a cached URL may be
//! stale after a network change, so cold reads re-verify before trusting it.
//! Writes are best-effort; failing to persist must never fail the caller's
//! primary operation.

use std::sync::Arc;

use crate::probe::HealthProbe;
use crate::store::KeyValueStore;

/// Storage key for the most recently verified working base URL.
pub const CACHE_KEY: &str = "last_working_backend_url";

/// Persists the most recently verified working base URL.
///
/// At most one cached endpoint exists at a time; every write overwrites the
/// previous value (last-writer-wins, which is safe because writes only ever
/// record an independently verified URL).
#[derive(Clone)]
pub struct EndpointCache {
    store: Arc<dyn KeyValueStore>,
}

impl EndpointCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The cached base URL, if any. Storage errors degrade to "absent".
    pub async fn get(&self) -> Option<String> {
        match self.store.get(CACHE_KEY).await {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(%error, "failed to read endpoint cache; treating as empty");
                None
            }
        }
    }

    /// Record a verified working base URL. Fire-and-forget durability.
    pub async fn set(&self, base_url: &str) {
        if let Err(error) = self.store.set(CACHE_KEY, base_url).await {
            tracing::warn!(%error, base_url, "failed to persist endpoint cache");
        }
    }

    /// Drop the cached value.
    pub async fn invalidate(&self) {
        if let Err(error) = self.store.remove(CACHE_KEY).await {
            tracing::warn!(%error, "failed to invalidate endpoint cache");
        }
    }

    /// The cached base URL, re-verified with one probe.
    ///
    /// A failed re-verification makes this call behave as if the cache were
    /// empty; it does not clear the stored value, since a later independent
    /// write will overwrite it anyway.
    pub async fn get_verified(&self, probe: &HealthProbe) -> Option<String> {
        let cached = self.get().await?;
        let result = probe.probe(&cached).await;
        if result.outcome.is_ok() {
            Some(cached)
        } else {
            tracing::debug!(
                base_url = cached,
                outcome = result.outcome.label(),
                "cached endpoint failed re-verification"
            );
            None
        }
    }
}
