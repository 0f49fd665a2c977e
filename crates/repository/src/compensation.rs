//! Compensating rollback for writes that span several records.
//!
//! Neither engine offers transactions. A caller that must create two
//! related records runs the second write through [`run_with_rollback`],
//! which undoes the first one if the second fails.

use std::future::Future;

use common::ApiError;

/// Run `step` against an already-persisted `first` result.
///
/// When `step` fails, `rollback` is run against `first` and the step's
/// error is returned. A failing rollback is logged and never replaces the
/// step error.
pub async fn run_with_rollback<A, B, S, SF, R, RF>(
    first: &A,
    step: S,
    rollback: R,
) -> Result<B, ApiError>
where
    S: FnOnce(&A) -> SF,
    SF: Future<Output = Result<B, ApiError>>,
    R: FnOnce(&A) -> RF,
    RF: Future<Output = Result<(), ApiError>>,
{
    let error = match step(first).await {
        Ok(value) => return Ok(value),
        Err(error) => error,
    };

    tracing::warn!(error = %error, "Dependent write failed, rolling back");
    if let Err(rollback_error) = rollback(first).await {
        tracing::error!(
            error = %rollback_error,
            cause = %error,
            "Rollback failed, data may be left inconsistent"
        );
    }
    Err(error)
}
