//! Marker trait shared by every persisted record.

use serde::{de::DeserializeOwned, Serialize};

/// A record stored in one logical table.
///
/// The `id`, `created_at` and `updated_at` fields are owned by the
/// repository: callers never assign them through create DTOs.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Logical table name, also used to derive the mock storage key.
    const TABLE: &'static str;

    /// Unique record identifier.
    fn id(&self) -> &str;
}

/// Implement [`Entity`] for a struct with a `String` `id` field.
#[macro_export]
macro_rules! impl_entity {
    ($ty:ty, $table:expr) => {
        impl $crate::Entity for $ty {
            const TABLE: &'static str = $table;

            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}
