//! Reqwest-backed client for a Supabase-style REST and auth API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde_json::Value;

use common::BackendConfig;

use super::{AuthUser, BackendClient, BackendFailure, BackendResult, NativeError};
use crate::query::Query;

const RETURN_REPRESENTATION: &str = "return=representation";
const MERGE_DUPLICATES: &str = "return=representation,resolution=merge-duplicates";

/// Talks to `{url}/rest/v1/{table}` and `{url}/auth/v1/user`.
///
/// Requests carry the anon key as `apikey` and the session access token
/// (or the anon key when signed out) as bearer token.
pub struct RestClient {
    client: Client,
    base: Url,
    anon_key: String,
    access_token: Option<String>,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base", &self.base.as_str())
            .field("anon_key", &"[REDACTED]")
            .field("signed_in", &self.access_token.is_some())
            .finish()
    }
}

impl RestClient {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base: Url,
        anon_key: impl Into<String>,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: with_trailing_slash(base),
            anon_key: anon_key.into(),
            access_token,
        })
    }

    /// Build from configuration; fails when URL or anon key is missing.
    pub fn from_config(config: &BackendConfig) -> BackendResult<Self> {
        let (url, anon_key) = config.remote_credentials().ok_or_else(|| {
            NativeError::new("Backend URL and anon key must be configured")
                .with_code("CONFIG_ERROR")
        })?;
        let base = Url::parse(url).map_err(BackendFailure::transport)?;
        Self::new(
            base,
            anon_key,
            config.access_token.clone(),
            Duration::from_secs(config.http_timeout_secs),
        )
        .map_err(BackendFailure::transport)
    }

    fn endpoint(&self, path: &str) -> BackendResult<Url> {
        self.base.join(path).map_err(BackendFailure::transport)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let token = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.client
            .request(method, url)
            .header("apikey", self.anon_key.as_str())
            .header(ACCEPT, "application/json")
            .bearer_auth(token)
    }

    fn table(&self, method: Method, table: &str) -> BackendResult<RequestBuilder> {
        let url = self.endpoint(&format!("rest/v1/{table}"))?;
        Ok(self.request(method, url))
    }

    async fn rows(&self, request: RequestBuilder) -> BackendResult<Vec<Value>> {
        let response = request.send().await.map_err(BackendFailure::transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(BackendFailure::transport)?;
        if !status.is_success() {
            let error = decode_error(status, body.as_ref());
            tracing::error!(%status, message = %error.message, "Backend request failed");
            return Err(error.into());
        }
        parse_rows(body.as_ref())
    }
}

#[async_trait]
impl BackendClient for RestClient {
    async fn select(&self, table: &str, query: &Query) -> BackendResult<Vec<Value>> {
        let request = self.table(Method::GET, table)?.query(&query.to_params());
        self.rows(request).await
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> BackendResult<Vec<Value>> {
        let request = self
            .table(Method::POST, table)?
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&rows);
        self.rows(request).await
    }

    async fn update(&self, table: &str, query: &Query, patch: Value) -> BackendResult<Vec<Value>> {
        let request = self
            .table(Method::PATCH, table)?
            .query(&query.to_params())
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&patch);
        self.rows(request).await
    }

    async fn upsert(&self, table: &str, rows: Vec<Value>) -> BackendResult<Vec<Value>> {
        let request = self
            .table(Method::POST, table)?
            .header("Prefer", MERGE_DUPLICATES)
            .json(&rows);
        self.rows(request).await
    }

    async fn delete(&self, table: &str, query: &Query) -> BackendResult<Vec<Value>> {
        let request = self
            .table(Method::DELETE, table)?
            .query(&query.to_params())
            .header("Prefer", RETURN_REPRESENTATION);
        self.rows(request).await
    }

    async fn current_user(&self) -> BackendResult<Option<AuthUser>> {
        if self.access_token.is_none() {
            return Ok(None);
        }

        let url = self.endpoint("auth/v1/user")?;
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(BackendFailure::transport)?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            tracing::debug!(%status, "Session token rejected");
            return Ok(None);
        }

        let body = response.bytes().await.map_err(BackendFailure::transport)?;
        if !status.is_success() {
            return Err(decode_error(status, body.as_ref()).into());
        }
        let user = serde_json::from_slice(body.as_ref()).map_err(BackendFailure::transport)?;
        Ok(Some(user))
    }
}

/// `Url::join` drops the last segment of a base without trailing slash.
fn with_trailing_slash(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

fn parse_rows(body: &[u8]) -> BackendResult<Vec<Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    match serde_json::from_slice(body).map_err(BackendFailure::transport)? {
        Value::Array(rows) => Ok(rows),
        Value::Null => Ok(Vec::new()),
        row => Ok(vec![row]),
    }
}

/// Decode an error body; REST and auth endpoints name the message field
/// differently.
fn decode_error(status: StatusCode, body: &[u8]) -> NativeError {
    let fallback = || {
        NativeError::new(status.canonical_reason().unwrap_or("Request failed"))
            .with_code(status.as_str())
    };

    let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) else {
        return fallback();
    };
    let message = ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_str));
    let Some(message) = message else {
        return fallback();
    };

    let code = match fields.get("code").or_else(|| fields.get("error_code")) {
        Some(Value::String(code)) => code.clone(),
        Some(Value::Number(code)) => code.to_string(),
        _ => status.as_str().to_string(),
    };

    NativeError {
        message: message.to_string(),
        code: Some(code),
        details: fields.get("details").filter(|details| !details.is_null()).cloned(),
        hint: fields.get("hint").and_then(Value::as_str).map(str::to_string),
    }
}
