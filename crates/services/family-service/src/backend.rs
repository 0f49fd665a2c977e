//! Backend selection and the repository factory.

use std::sync::Arc;

use serde::Serialize;

use common::{select_backend, AppError, AppResult, BackendConfig, BackendKind};
use domain::Entity;
use repository::{BackendClient, BaseRepository, CrudRepository, MockRepository, RestClient};
use storage::{PrefixedStorage, StorageAdapter};

/// The engine every repository of a process is built on.
///
/// Chosen once at startup and passed into [`RepositoryFactory`]; there
/// is no ambient global to consult.
#[derive(Clone)]
pub enum Backend {
    Mock(Arc<dyn StorageAdapter>),
    Remote(Arc<dyn BackendClient>),
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Mock(_) => f.write_str("Backend::Mock"),
            Backend::Remote(_) => f.write_str("Backend::Remote"),
        }
    }
}

impl Backend {
    /// Build the backend [`select_backend`] picks for `config`.
    ///
    /// The mock backend persists to the configured file store.
    pub fn from_config(config: &BackendConfig) -> AppResult<Self> {
        let kind = select_backend(config);
        tracing::info!(backend = %kind, "Selected repository backend");

        match kind {
            BackendKind::Mock(_) => {
                let storage = PrefixedStorage::open_file(
                    &config.storage.path,
                    config.storage.prefix.clone(),
                    config.storage.quota_bytes,
                )
                .map_err(|e| AppError::storage(e.to_string()))?;
                tracing::debug!(
                    path = %config.storage.path.display(),
                    prefix = %config.storage.prefix,
                    "Opened offline storage"
                );
                Ok(Backend::Mock(Arc::new(storage)))
            }
            BackendKind::Remote => {
                let client = RestClient::from_config(config)
                    .map_err(|failure| AppError::Backend(failure.to_api_error()))?;
                Ok(Backend::Remote(Arc::new(client)))
            }
        }
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, Backend::Mock(_))
    }
}

/// Builds generic CRUD repositories against one [`Backend`].
#[derive(Debug, Clone)]
pub struct RepositoryFactory {
    backend: Backend,
}

impl RepositoryFactory {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn crud<T, C, U>(&self) -> Arc<dyn CrudRepository<T, C, U>>
    where
        T: Entity,
        C: Serialize + Send + Sync + 'static,
        U: Serialize + Send + Sync + 'static,
    {
        match &self.backend {
            Backend::Mock(storage) => Arc::new(MockRepository::<T, C, U>::new(storage.clone())),
            Backend::Remote(client) => Arc::new(BaseRepository::<T, C, U>::new(client.clone())),
        }
    }

    /// Like [`crud`](Self::crud), but on the remote backend `owner_column`
    /// defaults to the signed-in user's id on create.
    pub fn owned_crud<T, C, U>(&self, owner_column: &'static str) -> Arc<dyn CrudRepository<T, C, U>>
    where
        T: Entity,
        C: Serialize + Send + Sync + 'static,
        U: Serialize + Send + Sync + 'static,
    {
        match &self.backend {
            Backend::Mock(storage) => Arc::new(MockRepository::<T, C, U>::new(storage.clone())),
            Backend::Remote(client) => Arc::new(
                BaseRepository::<T, C, U>::new(client.clone()).with_owner_column(owner_column),
            ),
        }
    }
}
