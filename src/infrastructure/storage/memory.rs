// In-memory key-value store using DashMap
use crate::domain::error::InsightsError;
use crate::domain::traits::KeyValueStore;
use async_trait::async_trait;
use dashmap::DashMap;

/// Thread-safe in-process store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, InsightsError> {
        Ok(self.map.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), InsightsError> {
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), InsightsError> {
        self.map.remove(key);
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, InsightsError> {
        Ok(self
            .map
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect())
    }
}
