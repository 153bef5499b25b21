// Insight result cache over a KeyValueStore
use crate::domain::error::InsightsError;
use crate::domain::model::InsightResult;
use crate::domain::traits::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

pub const CACHE_KEY_PREFIX: &str = "insights:v1:";
pub const MAX_CACHE_ENTRIES: usize = 20;

/// Stored value: the result itself plus its write stamp.
///
/// The stamp is flattened next to the result fields, so the stored JSON is
/// still a plain serialized `InsightResult` to any reader that ignores it.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope {
    #[serde(rename = "storedAt", default)]
    stored_at: u64,
    #[serde(flatten)]
    result: InsightResult,
}

pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

pub fn cache_key(address: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, normalize_address(address))
}

/// Size-bounded cache of insight results keyed by normalized address.
///
/// Lookups and writes never fail from the caller's point of view: storage and
/// serialization errors are logged and treated as a miss or a dropped write.
/// When a write pushes the entry count over `max_entries`, the entries with the
/// oldest write stamp are evicted.
pub struct InsightsCache {
    store: Arc<dyn KeyValueStore>,
    max_entries: usize,
    last_stamp: AtomicU64,
}

impl InsightsCache {
    pub fn new(store: Arc<dyn KeyValueStore>, max_entries: usize) -> Self {
        Self {
            store,
            max_entries,
            last_stamp: AtomicU64::new(0),
        }
    }

    pub async fn get(&self, address: &str) -> Option<InsightResult> {
        let key = cache_key(address);
        match self.read_envelope(&key).await {
            Ok(envelope) => envelope.map(|e| e.result),
            Err(e) => {
                debug!("Cache entry {} unreadable: {}", key, e);
                None
            }
        }
    }

    pub async fn put(&self, address: &str, result: &InsightResult) {
        if let Err(e) = self.put_impl(address, result).await {
            warn!("Failed to write cache entry for {:?}: {}", address, e);
        }
    }

    /// Number of cache entries currently stored (0 if the store is unreadable).
    pub async fn len(&self) -> usize {
        self.store
            .list_keys(CACHE_KEY_PREFIX)
            .await
            .map(|keys| keys.len())
            .unwrap_or(0)
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remove every cache entry, returning how many were removed.
    pub async fn clear(&self) -> Result<usize, InsightsError> {
        let keys = self.store.list_keys(CACHE_KEY_PREFIX).await?;
        for key in &keys {
            self.store.delete(key).await?;
        }
        Ok(keys.len())
    }

    async fn put_impl(&self, address: &str, result: &InsightResult) -> Result<(), InsightsError> {
        let envelope = CacheEnvelope {
            stored_at: self.next_stamp(),
            result: result.clone(),
        };
        let value = serde_json::to_string(&envelope)?;
        self.store.put(&cache_key(address), &value).await?;
        self.prune().await
    }

    async fn read_envelope(&self, key: &str) -> Result<Option<CacheEnvelope>, InsightsError> {
        match self.store.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn prune(&self) -> Result<(), InsightsError> {
        let keys = self.store.list_keys(CACHE_KEY_PREFIX).await?;
        if keys.len() <= self.max_entries {
            return Ok(());
        }

        // Unreadable entries get stamp 0 and go first
        let mut stamped = Vec::with_capacity(keys.len());
        for key in keys {
            let stamp = match self.read_envelope(&key).await {
                Ok(Some(envelope)) => envelope.stored_at,
                _ => 0,
            };
            stamped.push((stamp, key));
        }
        stamped.sort();

        let excess = stamped.len() - self.max_entries;
        for (_, key) in stamped.into_iter().take(excess) {
            debug!("Evicting cache entry {}", key);
            self.store.delete(&key).await?;
        }
        Ok(())
    }

    /// Microsecond clock, forced strictly increasing within this process.
    fn next_stamp(&self) -> u64 {
        let now = chrono::Utc::now().timestamp_micros().max(0) as u64;
        let mut current = self.last_stamp.load(Ordering::Relaxed);
        loop {
            let next = now.max(current + 1);
            match self.last_stamp.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(actual) => current = actual,
            }
        }
    }
}
