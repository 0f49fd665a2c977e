//! Backend command - report the repository engine selection.

use common::{select_backend, AppResult, BackendConfig};

pub async fn execute(config: &BackendConfig) -> AppResult<()> {
    let kind = select_backend(config);
    println!("backend: {}", kind);
    if kind.is_mock() {
        println!("storage: {}", config.storage.path.display());
        println!("prefix:  {}", config.storage.prefix);
    } else if let Some((url, _)) = config.remote_credentials() {
        println!("url:     {}", url);
    }
    Ok(())
}
