//! The `{ data, error }` envelope returned by every repository operation.

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, AppError};

/// Standard repository response wrapper.
///
/// Exactly one of `data`/`error` is set on a terminal result, except for
/// operations with no payload (delete), where both are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: impl Into<ApiError>) -> Self {
        Self {
            data: None,
            error: Some(error.into()),
        }
    }

    /// Success without payload
    pub fn empty() -> Self {
        Self {
            data: None,
            error: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }

    pub fn into_result(self) -> Result<Option<T>, ApiError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.data),
        }
    }

    /// Like [`into_result`](Self::into_result) but a missing payload is an error.
    pub fn into_data(self) -> Result<T, ApiError> {
        match (self.data, self.error) {
            (_, Some(error)) => Err(error),
            (Some(data), None) => Ok(data),
            (None, None) => Err(ApiError::new("Response contained no data").with_code("NO_DATA")),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            data: self.data.map(f),
            error: self.error,
        }
    }
}

impl<T> From<Result<T, ApiError>> for ApiResponse<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(error) => Self::err(error),
        }
    }
}

impl<T> From<Result<T, AppError>> for ApiResponse<T> {
    fn from(result: Result<T, AppError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(error) => Self::err(error),
        }
    }
}

impl ApiResponse<()> {
    /// Success of a payload-free operation maps to [`empty`](Self::empty).
    pub fn from_unit(result: Result<(), ApiError>) -> Self {
        match result {
            Ok(()) => Self::empty(),
            Err(error) => Self::err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let ok = serde_json::to_value(ApiResponse::ok(1)).unwrap();
        assert_eq!(ok, serde_json::json!({ "data": 1, "error": null }));

        let err = serde_json::to_value(ApiResponse::<i32>::err(ApiError::new("boom"))).unwrap();
        assert_eq!(err, serde_json::json!({ "data": null, "error": { "message": "boom" } }));
    }

    #[test]
    fn test_exactly_one_side_is_set() {
        let ok = ApiResponse::ok("x");
        assert!(ok.data.is_some() && ok.error.is_none());

        let err = ApiResponse::<&str>::err(AppError::Unauthorized);
        assert!(err.data.is_none() && err.error.is_some());

        let empty = ApiResponse::from_unit(Ok(()));
        assert!(empty.is_ok());
        assert!(empty.data.is_none());
    }

    #[test]
    fn test_into_data_requires_payload() {
        assert_eq!(ApiResponse::ok(3).into_data().unwrap(), 3);
        assert!(ApiResponse::<i32>::empty().into_data().is_err());
        assert_eq!(ApiResponse::<i32>::empty().into_result().unwrap(), None);
    }
}
