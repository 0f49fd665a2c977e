//! Commands module - CLI command implementations.

pub mod backend;
pub mod households;
pub mod shopping;
pub mod storage;

use serde::Serialize;

use common::{AppResult, BackendConfig};
use family_service::{Backend, Repositories};

/// Repositories on whichever backend the configuration selects.
pub(crate) fn repositories(config: &BackendConfig) -> AppResult<Repositories> {
    Ok(Repositories::new(Backend::from_config(config)?))
}

/// Print a value as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
