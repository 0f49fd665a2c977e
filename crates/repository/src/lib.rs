//! Generic repositories over the offline store or the hosted backend.
//!
//! Both engines implement [`CrudRepository`] and return every result in an
//! [`ApiResponse`](common::ApiResponse) envelope:
//! - [`MockRepository`]: tables as JSON arrays in a
//!   [`StorageAdapter`](storage::StorageAdapter)
//! - [`BaseRepository`]: rows in a remote table reached through a
//!   [`BackendClient`]

pub mod backend;
pub mod base;
pub mod compensation;
pub mod crud;
pub mod mock;
pub mod query;

pub use backend::{AuthUser, BackendClient, BackendFailure, BackendResult, NativeError, RestClient};
pub use base::{BaseRepository, NO_ROWS_CODE};
pub use compensation::run_with_rollback;
pub use crud::CrudRepository;
pub use mock::{table_key, MockRepository};
pub use query::{Direction, Filter, FilterOp, Order, Query};

#[cfg(any(test, feature = "test-utils"))]
pub use backend::MockBackendClient;
#[cfg(any(test, feature = "test-utils"))]
pub use crud::MockCrudRepository;
