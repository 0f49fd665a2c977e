//! The CRUD contract implemented by both engines.

use async_trait::async_trait;
use common::ApiResponse;
use serde::Serialize;

use crate::query::Query;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Generic repository over entity `T`, create DTO `C` and update DTO `U`.
///
/// Every operation resolves to an [`ApiResponse`]; failures are carried in
/// `error`, never returned as a Rust `Err` or raised as a panic.
///
/// `id`, `created_at` and `updated_at` are assigned by the repository.
/// Optional fields absent from an update DTO are not serialized and
/// therefore leave the stored value untouched.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CrudRepository<T, C, U>: Send + Sync
where
    T: Send + Sync + 'static,
    C: Serialize + Send + Sync + 'static,
    U: Serialize + Send + Sync + 'static,
{
    /// All records passing `query`, or the whole table in stored order.
    async fn find_all(&self, query: Option<Query>) -> ApiResponse<Vec<T>>;

    async fn find_by_id(&self, id: &str) -> ApiResponse<T>;

    async fn create(&self, dto: C) -> ApiResponse<T>;

    /// Create several records in one write, preserving input order.
    async fn create_many(&self, dtos: Vec<C>) -> ApiResponse<Vec<T>>;

    async fn update(&self, id: &str, dto: U) -> ApiResponse<T>;

    /// Update when the DTO carries the id of an existing record, create
    /// otherwise.
    async fn upsert(&self, dto: C) -> ApiResponse<T>;

    /// Hard delete. Success carries no data.
    async fn delete(&self, id: &str) -> ApiResponse<()>;

    /// Logical table name.
    fn table(&self) -> &'static str;
}
