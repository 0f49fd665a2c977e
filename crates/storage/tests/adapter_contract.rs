//! One behavioural suite, run against every adapter variant.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tempfile::TempDir;

use storage::{MemoryStorage, PrefixedStorage, StorageAdapter, StorageAdapterExt};

/// Adapter under test plus a way to plant unparsable content.
enum Fixture {
    Memory(Arc<MemoryStorage>),
    File(Arc<PrefixedStorage>, TempDir),
}

impl Fixture {
    fn adapter(&self) -> Arc<dyn StorageAdapter> {
        match self {
            Fixture::Memory(storage) => storage.clone(),
            Fixture::File(storage, _) => storage.clone(),
        }
    }

    async fn plant_raw(&self, key: &str, raw: &str) {
        match self {
            Fixture::Memory(storage) => storage.set_raw(key, raw).await,
            Fixture::File(storage, _) => storage.set_raw(key, raw).await.unwrap(),
        }
    }
}

fn memory_fixture() -> Fixture {
    Fixture::Memory(Arc::new(MemoryStorage::new()))
}

fn file_fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let storage = PrefixedStorage::open_file(dir.path().join("storage.json"), "hearth", None)
        .unwrap();
    Fixture::File(Arc::new(storage), dir)
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Profile {
    name: String,
    tags: Vec<String>,
}

macro_rules! adapter_contract_tests {
    ($module:ident, $fixture:ident) => {
        mod $module {
            use super::*;

            #[tokio::test]
            async fn absent_key_reads_as_none() {
                let fixture = $fixture();
                assert_eq!(fixture.adapter().get("missing").await.unwrap(), None);
            }

            #[tokio::test]
            async fn values_round_trip_unchanged() {
                let fixture = $fixture();
                let adapter = fixture.adapter();
                let value = json!({
                    "id": "b2c1",
                    "name": "Grocery run – Zürich",
                    "count": 3,
                    "ratio": 0.25,
                    "done": false,
                    "notes": null,
                    "created_at": "2024-05-01T09:30:00.000000Z",
                    "items": [{ "name": "milk", "qty": 2 }, { "name": "eggs", "qty": 12 }],
                });

                adapter.set("table:shopping_lists", value.clone()).await.unwrap();
                assert_eq!(adapter.get("table:shopping_lists").await.unwrap(), Some(value));
            }

            #[tokio::test]
            async fn set_overwrites() {
                let fixture = $fixture();
                let adapter = fixture.adapter();
                adapter.set("k", json!(1)).await.unwrap();
                adapter.set("k", json!([1, 2])).await.unwrap();
                assert_eq!(adapter.get("k").await.unwrap(), Some(json!([1, 2])));
            }

            #[tokio::test]
            async fn remove_is_idempotent() {
                let fixture = $fixture();
                let adapter = fixture.adapter();
                adapter.set("k", json!("v")).await.unwrap();
                adapter.remove("k").await.unwrap();
                adapter.remove("k").await.unwrap();
                assert_eq!(adapter.get("k").await.unwrap(), None);
            }

            #[tokio::test]
            async fn keys_lists_owned_keys_without_prefix() {
                let fixture = $fixture();
                let adapter = fixture.adapter();
                adapter.set("table:trips", json!([])).await.unwrap();
                adapter.set("table:wishlists", json!([])).await.unwrap();

                let mut keys = adapter.keys().await.unwrap();
                keys.sort();
                assert_eq!(keys, vec!["table:trips", "table:wishlists"]);
            }

            #[tokio::test]
            async fn clear_removes_everything_owned() {
                let fixture = $fixture();
                let adapter = fixture.adapter();
                adapter.set("a", json!(1)).await.unwrap();
                adapter.set("b", json!(2)).await.unwrap();

                adapter.clear().await.unwrap();

                assert!(adapter.keys().await.unwrap().is_empty());
                assert_eq!(adapter.get("a").await.unwrap(), None);
            }

            #[tokio::test]
            async fn unparsable_content_reads_as_none() {
                let fixture = $fixture();
                fixture.plant_raw("broken", "{\"unterminated\": [").await;
                assert_eq!(fixture.adapter().get("broken").await.unwrap(), None);
            }

            #[tokio::test]
            async fn typed_helpers_round_trip_and_reject_wrong_shapes() {
                let fixture = $fixture();
                let adapter = fixture.adapter();
                let profile = Profile {
                    name: "Ada".into(),
                    tags: vec!["owner".into()],
                };

                adapter.set_as("profile", &profile).await.unwrap();
                assert_eq!(adapter.get_as::<Profile>("profile").await.unwrap(), Some(profile));

                adapter.set("profile", Value::from(7)).await.unwrap();
                assert_eq!(adapter.get_as::<Profile>("profile").await.unwrap(), None);
            }
        }
    };
}

adapter_contract_tests!(memory_storage, memory_fixture);
adapter_contract_tests!(file_backed_prefixed_storage, file_fixture);

#[tokio::test]
async fn file_backed_values_persist_across_adapters() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let first = PrefixedStorage::open_file(&path, "hearth", None).unwrap();
    first.set("table:trips", json!([{ "id": "t1" }])).await.unwrap();
    drop(first);

    let second = PrefixedStorage::open_file(&path, "hearth", None).unwrap();
    assert_eq!(
        second.get("table:trips").await.unwrap(),
        Some(json!([{ "id": "t1" }]))
    );
}
