//! Unified error handling for both repository backends.
//!
//! [`AppError`] is the taxonomy used while an operation runs; [`ApiError`]
//! is the normalized shape that crosses the repository boundary. Every
//! native failure is funnelled through [`to_api_error`] or
//! `From<AppError> for ApiError` before it reaches a caller.

use domain::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Message used when a failure carries nothing usable.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Normalized error shape: `{ message, code?, details? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            details: None,
        }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN_ERROR_MESSAGE)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Check the error code
    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Raw error normalization
// =============================================================================

/// Anything a backend or adapter may fail with.
#[derive(Debug, Clone, Copy)]
pub enum RawError<'a> {
    /// No error value at all
    Absent,
    /// A Rust error value
    Error(&'a (dyn std::error::Error + 'a)),
    /// A decoded error payload, e.g. a PostgREST error body
    Value(&'a Value),
}

/// Convert any raw failure into an [`ApiError`]. Total and panic-free.
///
/// - absent or `null` → unknown message
/// - a Rust error → its message, Debug rendering kept in `details`
/// - an object with a string `message` → `message`, `code`, `details` kept
/// - anything else → unknown message, raw value kept in `details`
pub fn to_api_error(raw: RawError<'_>) -> ApiError {
    match raw {
        RawError::Absent | RawError::Value(Value::Null) => ApiError::unknown(),
        RawError::Error(err) => {
            ApiError::new(err.to_string()).with_details(Value::String(format!("{err:?}")))
        }
        RawError::Value(Value::Object(map)) => match map.get("message") {
            Some(Value::String(message)) => {
                let details = match (map.get("details"), map.get("hint")) {
                    (Some(details), _) if !details.is_null() => Some(details.clone()),
                    (_, Some(Value::String(hint))) => {
                        Some(serde_json::json!({ "hint": hint }))
                    }
                    _ => None,
                };
                ApiError {
                    message: message.clone(),
                    code: map.get("code").and_then(code_string),
                    details,
                }
            }
            _ => ApiError::unknown().with_details(Value::Object(map.clone())),
        },
        RawError::Value(other) => ApiError::unknown().with_details(other.clone()),
    }
}

fn code_string(value: &Value) -> Option<String> {
    match value {
        Value::String(code) => Some(code.clone()),
        Value::Number(code) => Some(code.to_string()),
        _ => None,
    }
}

// =============================================================================
// Application error taxonomy
// =============================================================================

/// Application error types shared by the mock and live engines.
#[derive(Error, Debug)]
pub enum AppError {
    // Resource errors
    #[error("{table} record not found")]
    NotFound { table: String },

    #[error("{0} already exists")]
    Conflict(String),

    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    // Validation
    #[error("{0}")]
    Validation(String),

    // Backend and storage errors
    #[error("{0}")]
    Backend(ApiError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Unknown(String),
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &str {
        match self {
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Unauthorized => "AUTH_REQUIRED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Backend(err) => err.code.as_deref().unwrap_or("BACKEND_ERROR"),
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Unknown(_) => "UNKNOWN_ERROR",
        }
    }

    pub fn not_found(table: impl Into<String>) -> Self {
        AppError::NotFound {
            table: table.into(),
        }
    }

    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        AppError::Storage(msg.into())
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Backend(api) => api,
            other => {
                let code = other.code().to_string();
                ApiError::new(other.to_string()).with_code(code)
            }
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        AppError::Backend(err)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::NotFound(entity) => AppError::not_found(entity),
            DomainError::Conflict(msg) => AppError::Conflict(msg),
            DomainError::Forbidden => AppError::Forbidden,
            DomainError::InvalidTransition(msg) => AppError::Validation(msg),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // First field message only
        let message = errors
            .field_errors()
            .values()
            .next()
            .and_then(|errors| errors.first())
            .and_then(|error| error.message.as_ref())
            .map(|msg| msg.to_string())
            .unwrap_or_else(|| "Validation failed".to_string());
        AppError::Validation(message)
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, table: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, table: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::not_found(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_and_null_share_unknown_message() {
        let absent = to_api_error(RawError::Absent);
        let null = to_api_error(RawError::Value(&Value::Null));
        assert_eq!(absent.message, null.message);
        assert_eq!(absent.message, UNKNOWN_ERROR_MESSAGE);
        assert!(absent.details.is_none());
    }

    #[test]
    fn test_rust_error_keeps_message_and_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "x");
        let api = to_api_error(RawError::Error(&io));
        assert_eq!(api.message, "x");
        let details = api.details.unwrap();
        assert!(details.as_str().unwrap().contains("Custom"));
    }

    #[test]
    fn test_object_with_message_passes_fields_through() {
        let raw = json!({ "message": "m", "code": "c", "details": "d" });
        let api = to_api_error(RawError::Value(&raw));
        assert_eq!(api.message, "m");
        assert_eq!(api.code.as_deref(), Some("c"));
        assert_eq!(api.details, Some(json!("d")));
    }

    #[test]
    fn test_relational_error_hint_is_kept_when_details_missing() {
        let raw = json!({
            "message": "relation \"public.trips\" does not exist",
            "code": "42P01",
            "details": null,
            "hint": "Check the table name",
        });
        let api = to_api_error(RawError::Value(&raw));
        assert_eq!(api.code.as_deref(), Some("42P01"));
        assert_eq!(api.details, Some(json!({ "hint": "Check the table name" })));
    }

    #[test]
    fn test_numeric_code_is_stringified() {
        let raw = json!({ "message": "Unauthorized", "code": 401 });
        assert_eq!(to_api_error(RawError::Value(&raw)).code.as_deref(), Some("401"));
    }

    #[test]
    fn test_other_values_are_unknown_with_details() {
        let raw = json!(42);
        let api = to_api_error(RawError::Value(&raw));
        assert_eq!(api.message, UNKNOWN_ERROR_MESSAGE);
        assert_eq!(api.details, Some(json!(42)));

        let raw = json!({ "msg": "no message field" });
        let api = to_api_error(RawError::Value(&raw));
        assert_eq!(api.message, UNKNOWN_ERROR_MESSAGE);
        assert_eq!(api.details, Some(raw));
    }

    #[test]
    fn test_app_error_to_api_error() {
        let api = ApiError::from(AppError::not_found("households"));
        assert_eq!(api.message, "households record not found");
        assert!(api.has_code("NOT_FOUND"));

        let api = ApiError::from(AppError::Unauthorized);
        assert_eq!(api.message, "Authentication required");
        assert!(api.has_code("AUTH_REQUIRED"));

        let backend = ApiError::new("permission denied").with_code("42501");
        assert_eq!(ApiError::from(AppError::Backend(backend.clone())), backend);
    }

    #[test]
    fn test_domain_error_conversion() {
        let err = AppError::from(DomainError::conflict("Invitation"));
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.to_string(), "Invitation already exists");
    }
}
