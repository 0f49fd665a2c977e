//! The key/value adapter contract shared by every storage variant.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::StorageResult;

/// Key-scoped storage of JSON values.
///
/// Implementations must behave identically: the mock repositories only
/// ever see this trait.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Parsed value under `key`.
    ///
    /// Returns `Ok(None)` when the key is absent or its stored content does
    /// not parse. Only medium failures are errors.
    async fn get(&self, key: &str) -> StorageResult<Option<Value>>;

    /// Serialize and store `value`, overwriting any previous value.
    async fn set(&self, key: &str, value: Value) -> StorageResult<()>;

    /// Delete `key`. Absent keys are not an error.
    async fn remove(&self, key: &str) -> StorageResult<()>;

    /// Remove every key this adapter owns, and nothing else.
    async fn clear(&self) -> StorageResult<()>;

    /// Owned keys, without any namespace prefix.
    async fn keys(&self) -> StorageResult<Vec<String>>;
}

/// Typed helpers over any [`StorageAdapter`].
#[async_trait]
pub trait StorageAdapterExt: StorageAdapter {
    /// Like [`StorageAdapter::get`], but a value that does not fit `T` is
    /// also treated as absent.
    async fn get_as<T: DeserializeOwned + Send>(&self, key: &str) -> StorageResult<Option<T>> {
        let Some(value) = self.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(error) => {
                tracing::warn!(key, %error, "Stored value does not match expected shape");
                Ok(None)
            }
        }
    }

    async fn set_as<T: Serialize + Sync>(&self, key: &str, value: &T) -> StorageResult<()> {
        let value = serde_json::to_value(value)?;
        self.set(key, value).await
    }
}

impl<S: StorageAdapter + ?Sized> StorageAdapterExt for S {}

/// Parse stored text, mapping failures to absence.
pub(crate) fn parse_stored(key: &str, raw: &str) -> Option<Value> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!(key, %error, "Discarding unparsable stored value");
            None
        }
    }
}
