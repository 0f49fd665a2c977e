//! Common contracts shared by every repository backend.
//!
//! This crate provides:
//! - The `{ data, error }` response envelope
//! - Error normalization (`ApiError`, `to_api_error`) and the `AppError` taxonomy
//! - Backend configuration and the mock/remote selection rule

pub mod config;
pub mod error;
pub mod response;

pub use config::{select_backend, BackendConfig, BackendKind, MockReason, StorageConfig};
pub use error::{
    to_api_error, ApiError, AppError, AppResult, OptionExt, RawError, UNKNOWN_ERROR_MESSAGE,
};
pub use response::ApiResponse;
