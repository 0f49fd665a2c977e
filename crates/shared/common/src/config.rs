//! Backend configuration and the mock/remote selection rule.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default location of the persistent mock store
pub const DEFAULT_STORAGE_PATH: &str = ".hearth/storage.json";

/// Default namespace prefix for persistent storage keys
pub const DEFAULT_STORAGE_PREFIX: &str = "hearth";

/// Default HTTP timeout for the live backend
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Backend configuration, read once at process start.
#[derive(Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Explicit opt-in to mock mode
    pub mock_mode: bool,
    pub supabase_url: Option<String>,
    #[serde(skip_serializing)]
    pub supabase_anon_key: Option<String>,
    /// Session token used for authenticated requests
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    pub storage: StorageConfig,
    pub http_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mock_mode: false,
            supabase_url: None,
            supabase_anon_key: None,
            access_token: None,
            storage: StorageConfig::default(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("mock_mode", &self.mock_mode)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &self.supabase_anon_key.as_ref().map(|_| "[REDACTED]"))
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("storage", &self.storage)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

/// Persistent mock storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub path: PathBuf,
    pub prefix: String,
    /// Maximum size of the storage file, unlimited when absent
    pub quota_bytes: Option<usize>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORAGE_PATH),
            prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            quota_bytes: None,
        }
    }
}

impl BackendConfig {
    /// Load configuration from environment variables (and `.env`).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let storage = StorageConfig {
            path: lookup("HEARTH_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH)),
            prefix: lookup("HEARTH_STORAGE_PREFIX")
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_STORAGE_PREFIX.to_string()),
            quota_bytes: lookup("HEARTH_STORAGE_QUOTA_BYTES").and_then(|v| v.parse().ok()),
        };

        Self {
            mock_mode: lookup("HEARTH_MOCK_MODE")
                .map(|v| is_truthy(&v))
                .unwrap_or(false),
            supabase_url: lookup("SUPABASE_URL"),
            supabase_anon_key: lookup("SUPABASE_ANON_KEY"),
            access_token: lookup("SUPABASE_ACCESS_TOKEN"),
            storage,
            http_timeout_secs: lookup("HEARTH_HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    /// Both remote credentials, when present and non-blank.
    pub fn remote_credentials(&self) -> Option<(&str, &str)> {
        let url = self.supabase_url.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
        let key = self
            .supabase_anon_key
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())?;
        Some((url, key))
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Why the mock backend was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockReason {
    /// `HEARTH_MOCK_MODE` was set
    Requested,
    /// URL or anon key missing
    MissingCredentials,
}

/// Which repository engine the factories should build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Mock(MockReason),
    Remote,
}

impl BackendKind {
    pub fn is_mock(&self) -> bool {
        matches!(self, BackendKind::Mock(_))
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Mock(MockReason::Requested) => f.write_str("mock (requested)"),
            BackendKind::Mock(MockReason::MissingCredentials) => {
                f.write_str("mock (missing backend credentials)")
            }
            BackendKind::Remote => f.write_str("remote"),
        }
    }
}

/// Decide the backend: explicit flag, then missing credentials, then remote.
pub fn select_backend(config: &BackendConfig) -> BackendKind {
    if config.mock_mode {
        return BackendKind::Mock(MockReason::Requested);
    }
    if config.remote_credentials().is_none() {
        return BackendKind::Mock(MockReason::MissingCredentials);
    }
    BackendKind::Remote
}
