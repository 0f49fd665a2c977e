//! Storage command - inspect the offline key/value store.

use common::{AppError, AppResult, BackendConfig};
use storage::{PrefixedStorage, StorageAdapter};

use crate::args::{StorageAction, StorageArgs};

pub async fn execute(args: StorageArgs, config: &BackendConfig) -> AppResult<()> {
    let store = PrefixedStorage::open_file(
        &config.storage.path,
        config.storage.prefix.clone(),
        config.storage.quota_bytes,
    )
    .map_err(|e| AppError::storage(e.to_string()))?;

    run(args.action, &store).await
}

async fn run(action: StorageAction, store: &dyn StorageAdapter) -> AppResult<()> {
    match action {
        StorageAction::Keys => {
            let mut keys = store
                .keys()
                .await
                .map_err(|e| AppError::storage(e.to_string()))?;
            keys.sort();
            for key in keys {
                println!("{}", key);
            }
        }
        StorageAction::Get { key } => {
            let value = store
                .get(&key)
                .await
                .map_err(|e| AppError::storage(e.to_string()))?;
            match value {
                Some(value) => super::print_json(&value)?,
                None => println!("(absent)"),
            }
        }
        StorageAction::Clear => {
            tracing::warn!("Clearing offline storage");
            store
                .clear()
                .await
                .map_err(|e| AppError::storage(e.to_string()))?;
            println!("cleared");
        }
    }
    Ok(())
}
