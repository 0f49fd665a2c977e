//! Client seam for the hosted relational backend.

mod rest;

pub use rest::RestClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use common::{to_api_error, ApiError, RawError};

use crate::query::Query;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Error body returned by the backend, e.g.
/// `{"message": "...", "code": "23505", "details": "...", "hint": null}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct NativeError {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<Value>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl NativeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Why a backend call failed.
#[derive(Debug, Error)]
pub enum BackendFailure {
    /// The backend answered with an error payload.
    #[error("{0}")]
    Native(NativeError),
    /// The call itself failed: connection, timeout, undecodable body.
    #[error("{0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),
}

impl BackendFailure {
    pub fn transport(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        BackendFailure::Transport(error.into())
    }

    /// Normalize through [`to_api_error`].
    pub fn to_api_error(&self) -> ApiError {
        match self {
            BackendFailure::Native(native) => {
                let payload = serde_json::json!({
                    "message": native.message,
                    "code": native.code,
                    "details": native.details,
                    "hint": native.hint,
                });
                to_api_error(RawError::Value(&payload))
            }
            BackendFailure::Transport(error) => to_api_error(RawError::Error(&**error)),
        }
    }
}

impl From<NativeError> for BackendFailure {
    fn from(error: NativeError) -> Self {
        BackendFailure::Native(error)
    }
}

pub type BackendResult<T> = Result<T, BackendFailure>;

/// The signed-in user of the current session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Row-level access to remote tables plus the session user.
///
/// Writes return the affected rows as stored by the backend.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BackendClient: Send + Sync {
    async fn select(&self, table: &str, query: &Query) -> BackendResult<Vec<Value>>;

    async fn insert(&self, table: &str, rows: Vec<Value>) -> BackendResult<Vec<Value>>;

    async fn update(&self, table: &str, query: &Query, patch: Value) -> BackendResult<Vec<Value>>;

    /// Insert, merging into rows whose primary key already exists.
    async fn upsert(&self, table: &str, rows: Vec<Value>) -> BackendResult<Vec<Value>>;

    async fn delete(&self, table: &str, query: &Query) -> BackendResult<Vec<Value>>;

    /// `Ok(None)` when there is no valid session.
    async fn current_user(&self) -> BackendResult<Option<AuthUser>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_native_failure_keeps_code_and_details() {
        let failure = BackendFailure::Native(NativeError {
            message: "duplicate key value violates unique constraint".into(),
            code: Some("23505".into()),
            details: Some(json!("Key (email)=(a@b.c) already exists.")),
            hint: None,
        });

        let error = failure.to_api_error();
        assert_eq!(error.message, "duplicate key value violates unique constraint");
        assert_eq!(error.code.as_deref(), Some("23505"));
        assert_eq!(error.details, Some(json!("Key (email)=(a@b.c) already exists.")));
    }

    #[test]
    fn test_native_hint_becomes_details_when_none_given() {
        let failure = BackendFailure::Native(NativeError {
            hint: Some("Check the column name".into()),
            ..NativeError::new("column does not exist").with_code("42703")
        });
        let error = failure.to_api_error();
        assert_eq!(error.details, Some(json!({ "hint": "Check the column name" })));
    }

    #[test]
    fn test_transport_failure_uses_error_message() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "connection timed out");
        let error = BackendFailure::transport(io).to_api_error();
        assert_eq!(error.message, "connection timed out");
        assert_eq!(error.code, None);
        assert!(error.details.is_some());
    }
}
