use crate::domain::error::InsightsError;
use crate::domain::model::HistoryEntry;
use crate::domain::traits::KeyValueStore;
use std::sync::Arc;
use tracing::{debug, warn};

pub const HISTORY_KEY: &str = "address-insights-history";
pub const MAX_HISTORY_ENTRIES: usize = 10;

/// Recent searches, most recent first, de-duplicated case-insensitively.
pub struct SearchHistory {
    store: Arc<dyn KeyValueStore>,
    max_entries: usize,
}

impl SearchHistory {
    pub fn new(store: Arc<dyn KeyValueStore>, max_entries: usize) -> Self {
        Self { store, max_entries }
    }

    /// Stored entries; a missing or corrupt list reads as empty.
    pub async fn entries(&self) -> Vec<HistoryEntry> {
        match self.store.get(HISTORY_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                debug!("Discarding unreadable search history: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                debug!("Search history unavailable: {}", e);
                Vec::new()
            }
        }
    }

    /// Record `address` at the front. Blank input is ignored and write failures are logged only.
    pub async fn add(&self, address: &str) {
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return;
        }

        let normalized = trimmed.to_lowercase();
        let mut updated = vec![HistoryEntry {
            address: trimmed.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }];
        updated.extend(
            self.entries()
                .await
                .into_iter()
                .filter(|e| e.address.trim().to_lowercase() != normalized),
        );
        updated.truncate(self.max_entries);

        if let Err(e) = self.write(&updated).await {
            warn!("Failed to save search history: {}", e);
        }
    }

    pub async fn clear(&self) -> Result<(), InsightsError> {
        self.store.delete(HISTORY_KEY).await
    }

    async fn write(&self, entries: &[HistoryEntry]) -> Result<(), InsightsError> {
        let value = serde_json::to_string(entries)?;
        self.store.put(HISTORY_KEY, &value).await
    }
}
