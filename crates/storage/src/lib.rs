//! Key/value storage adapters for the offline (mock) repositories.
//!
//! Two interchangeable variants implement [`StorageAdapter`]:
//! - [`MemoryStorage`]: volatile, for tests and throwaway sessions
//! - [`PrefixedStorage`]: namespaced view over a shared [`KeyValueStore`]
//!   medium, persistent when that medium is a [`FileStore`]

mod adapter;
mod error;
mod medium;
mod memory;
mod prefixed;

pub use adapter::{StorageAdapter, StorageAdapterExt};
pub use error::{StorageError, StorageResult};
pub use medium::{FileStore, KeyValueStore, MemoryStore};
pub use memory::MemoryStorage;
pub use prefixed::PrefixedStorage;
