//! Pure in-memory adapter for tests and ephemeral mock sessions.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::adapter::{parse_stored, StorageAdapter};
use crate::error::StorageResult;

/// In-memory [`StorageAdapter`].
///
/// Values are kept as serialized JSON text so that reads go through the
/// same parse path as the persistent adapter.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw text without serializing it.
    pub async fn set_raw(&self, key: &str, raw: impl Into<String>) {
        self.entries.write().await.insert(key.to_string(), raw.into());
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).and_then(|raw| parse_stored(key, raw)))
    }

    async fn set(&self, key: &str, value: Value) -> StorageResult<()> {
        let raw = serde_json::to_string(&value)?;
        self.entries.write().await.insert(key.to_string(), raw);
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> StorageResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn keys(&self) -> StorageResult<Vec<String>> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
