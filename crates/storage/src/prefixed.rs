//! Namespace-prefixed persistent adapter.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::adapter::{parse_stored, StorageAdapter};
use crate::error::{StorageError, StorageResult};
use crate::medium::{FileStore, KeyValueStore};

/// [`StorageAdapter`] over a shared [`KeyValueStore`].
///
/// Keys are stored as `<prefix>:<key>`. The adapter only ever reads,
/// lists or clears keys under its own prefix, so several adapters (and
/// unrelated consumers) can share one medium.
#[derive(Clone)]
pub struct PrefixedStorage {
    store: Arc<dyn KeyValueStore>,
    prefix: String,
}

impl std::fmt::Debug for PrefixedStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefixedStorage")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl PrefixedStorage {
    pub fn new(store: Arc<dyn KeyValueStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// Persistent adapter backed by a [`FileStore`] at `path`.
    pub fn open_file(
        path: impl AsRef<std::path::Path>,
        prefix: impl Into<String>,
        quota_bytes: Option<usize>,
    ) -> StorageResult<Self> {
        let store = FileStore::open(path, quota_bytes)?;
        Ok(Self::new(Arc::new(store), prefix))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    /// Store raw text under `key` without serializing it.
    pub async fn set_raw(&self, key: &str, raw: impl Into<String>) -> StorageResult<()> {
        let full = self.namespaced(key);
        let raw = raw.into();
        self.blocking(move |store| store.set_item(&full, &raw)).await
    }

    /// Run a medium call off the async executor.
    async fn blocking<T, F>(&self, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn KeyValueStore) -> StorageResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|e| StorageError::unavailable(format!("storage task failed: {e}")))?
    }

    async fn owned_keys(&self) -> StorageResult<Vec<String>> {
        let marker = format!("{}:", self.prefix);
        let all = self.blocking(|store| store.keys()).await?;
        Ok(all
            .into_iter()
            .filter(|key| key.starts_with(&marker))
            .collect())
    }
}

#[async_trait]
impl StorageAdapter for PrefixedStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        let full = self.namespaced(key);
        let raw = self.blocking(move |store| store.get_item(&full)).await?;
        Ok(raw.and_then(|raw| parse_stored(key, &raw)))
    }

    async fn set(&self, key: &str, value: Value) -> StorageResult<()> {
        let raw = serde_json::to_string(&value)?;
        self.set_raw(key, raw).await
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let full = self.namespaced(key);
        self.blocking(move |store| store.remove_item(&full)).await
    }

    async fn clear(&self) -> StorageResult<()> {
        let owned = self.owned_keys().await?;
        tracing::debug!(prefix = %self.prefix, count = owned.len(), "Clearing namespaced keys");
        self.blocking(move |store| {
            for key in &owned {
                store.remove_item(key)?;
            }
            Ok(())
        })
        .await
    }

    async fn keys(&self) -> StorageResult<Vec<String>> {
        let strip = self.prefix.len() + 1;
        Ok(self
            .owned_keys()
            .await?
            .into_iter()
            .map(|key| key[strip..].to_string())
            .collect())
    }
}
