//! Shared key/value media underneath the prefixed adapter.
//!
//! A medium is process-wide state that several consumers may share, the
//! way browser local storage is shared by every script on a page. It has
//! no notion of namespaces; [`PrefixedStorage`](crate::PrefixedStorage)
//! adds them.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::{StorageError, StorageResult};

/// Synchronous string-to-string store.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove_item(&self, key: &str) -> StorageResult<()>;
    /// Every key in the medium, regardless of owner.
    fn keys(&self) -> StorageResult<Vec<String>>;
}

fn lock<'a>(
    items: &'a Mutex<BTreeMap<String, String>>,
) -> StorageResult<MutexGuard<'a, BTreeMap<String, String>>> {
    items
        .lock()
        .map_err(|_| StorageError::unavailable("storage lock poisoned"))
}

// =============================================================================
// In-memory medium
// =============================================================================

/// Volatile medium, shared between adapters within one process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(lock(&self.items)?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        lock(&self.items)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        lock(&self.items)?.remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(lock(&self.items)?.keys().cloned().collect())
    }
}

// =============================================================================
// File medium
// =============================================================================

/// Persistent medium kept as one JSON object file.
///
/// Every mutation rewrites the file atomically (temp file + rename). With a
/// quota, a mutation that would grow the file past it fails with
/// [`StorageError::QuotaExceeded`] and leaves the store unchanged.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    quota_bytes: Option<usize>,
    items: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: impl AsRef<Path>, quota_bytes: Option<usize>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let items = if path.exists() {
            load_or_quarantine(&path)?
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), entries = items.len(), "Opened file store");

        Ok(Self {
            path,
            quota_bytes,
            items: Mutex::new(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change`, persist, and roll the in-memory map back if
    /// persisting fails. Removing an absent key writes nothing.
    fn mutate(&self, key: &str, change: Option<&str>) -> StorageResult<()> {
        let mut items = lock(&self.items)?;
        if change.is_none() && !items.contains_key(key) {
            return Ok(());
        }
        let previous = match change {
            Some(value) => items.insert(key.to_string(), value.to_string()),
            None => items.remove(key),
        };

        if let Err(error) = self.persist(&items) {
            match previous {
                Some(old) => items.insert(key.to_string(), old),
                None => items.remove(key),
            };
            return Err(error);
        }
        Ok(())
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> StorageResult<()> {
        let text = serde_json::to_string(items)?;
        if let Some(quota) = self.quota_bytes {
            if text.len() > quota {
                return Err(StorageError::QuotaExceeded {
                    needed: text.len(),
                    quota,
                });
            }
        }

        let tmp = self.path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(text.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Read the store file. An unparsable file is moved aside to
/// `<path>.corrupt` and the store starts empty.
fn load_or_quarantine(path: &Path) -> StorageResult<BTreeMap<String, String>> {
    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    match serde_json::from_str(&text) {
        Ok(items) => Ok(items),
        Err(error) => {
            let aside = corrupt_path(path);
            tracing::warn!(
                path = %path.display(),
                moved_to = %aside.display(),
                %error,
                "Store file is unreadable, starting empty"
            );
            fs::rename(path, &aside)?;
            Ok(BTreeMap::new())
        }
    }
}

fn corrupt_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".corrupt");
    PathBuf::from(name)
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(lock(&self.items)?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.mutate(key, Some(value))
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.mutate(key, None)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(lock(&self.items)?.keys().cloned().collect())
    }
}
