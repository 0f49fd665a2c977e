//! Offline CRUD engine persisting each table as one JSON array.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, DurationRound, SecondsFormat, Utc};
use mockable::{Clock, DefaultClock};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use common::{ApiResponse, AppError, AppResult};
use domain::Entity;
use storage::{StorageAdapter, StorageError};

use crate::crud::CrudRepository;
use crate::query::Query;

/// Columns owned by the repository. DTO values for them are ignored.
const MANAGED_COLUMNS: [&str; 3] = ["id", "created_at", "updated_at"];

/// Storage key holding the rows of `table`.
pub fn table_key(table: &str) -> String {
    format!("table:{table}")
}

/// [`CrudRepository`] over a [`StorageAdapter`].
///
/// Rows live under `table:<name>` as a JSON array in insertion order.
/// Ids are random UUIDs; `created_at`/`updated_at` are RFC 3339 UTC
/// timestamps with microsecond precision.
///
/// Every operation is a read-modify-write of the whole array without
/// locking: two repositories sharing one adapter can lose each other's
/// concurrent writes.
pub struct MockRepository<T, C, U> {
    storage: Arc<dyn StorageAdapter>,
    clock: Arc<dyn Clock>,
    _marker: PhantomData<fn() -> (T, C, U)>,
}

impl<T, C, U> MockRepository<T, C, U>
where
    T: Entity,
    C: Serialize + Send + Sync + 'static,
    U: Serialize + Send + Sync + 'static,
{
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self::with_clock(storage, Arc::new(DefaultClock))
    }

    pub fn with_clock(storage: Arc<dyn StorageAdapter>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            _marker: PhantomData,
        }
    }

    fn key(&self) -> String {
        table_key(T::TABLE)
    }

    /// Current time truncated to what the stored format can represent.
    fn now(&self) -> DateTime<Utc> {
        let now = self.clock.utc();
        now.duration_trunc(Duration::microseconds(1)).unwrap_or(now)
    }

    async fn load(&self) -> AppResult<Vec<Value>> {
        let key = self.key();
        match self.storage.get(&key).await.map_err(storage_failure)? {
            None => Ok(Vec::new()),
            Some(Value::Array(rows)) => Ok(rows),
            Some(_) => {
                tracing::warn!(key = %key, "Stored table is not an array, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, rows: Vec<Value>) -> AppResult<()> {
        self.storage
            .set(&self.key(), Value::Array(rows))
            .await
            .map_err(storage_failure)
    }

    /// New row from a create DTO, with repository-managed columns assigned.
    fn new_row(mut fields: Map<String, Value>, now: &str) -> Value {
        fields.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        fields.insert("created_at".into(), Value::String(now.to_string()));
        fields.insert("updated_at".into(), Value::String(now.to_string()));
        Value::Object(fields)
    }

    /// Shallow-merge `patch` into `row` and refresh `updated_at`.
    fn merge(&self, row: &mut Value, patch: Map<String, Value>) {
        let previous = row
            .get("updated_at")
            .and_then(Value::as_str)
            .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
            .map(|stamp| stamp.with_timezone(&Utc));
        let updated_at = next_update_stamp(self.now(), previous);

        if let Value::Object(fields) = row {
            fields.extend(patch);
            fields.insert("updated_at".into(), Value::String(format_stamp(updated_at)));
        }
    }

    fn position(rows: &[Value], id: &str) -> Option<usize> {
        rows.iter()
            .position(|row| row.get("id").and_then(Value::as_str) == Some(id))
    }

    async fn try_find_all(&self, query: Option<Query>) -> AppResult<Vec<T>> {
        let rows = self.load().await?;
        let rows = match query {
            Some(query) => query.apply(rows),
            None => rows,
        };
        rows.into_iter().map(decode).collect()
    }

    async fn try_find_by_id(&self, id: &str) -> AppResult<T> {
        let rows = self.load().await?;
        let index = Self::position(&rows, id).ok_or_else(|| AppError::not_found(T::TABLE))?;
        decode(rows[index].clone())
    }

    async fn try_create_many(&self, dtos: Vec<C>) -> AppResult<Vec<T>> {
        let payloads = dtos.into_iter().map(to_object).collect::<AppResult<Vec<_>>>()?;
        self.insert(payloads).await
    }

    /// Append one row per payload in a single write.
    async fn insert(&self, payloads: Vec<Map<String, Value>>) -> AppResult<Vec<T>> {
        let mut rows = self.load().await?;
        let now = format_stamp(self.now());

        let mut created = Vec::with_capacity(payloads.len());
        let mut fresh = Vec::with_capacity(payloads.len());
        for fields in payloads {
            let row = Self::new_row(fields, &now);
            created.push(decode(row.clone())?);
            fresh.push(row);
        }

        rows.extend(fresh);
        self.save(rows).await?;
        Ok(created)
    }

    async fn try_update(&self, id: &str, patch: Map<String, Value>) -> AppResult<T> {
        let mut rows = self.load().await?;
        let index = Self::position(&rows, id).ok_or_else(|| AppError::not_found(T::TABLE))?;

        let mut row = rows[index].clone();
        self.merge(&mut row, patch);
        let updated = decode(row.clone())?;

        rows[index] = row;
        self.save(rows).await?;
        Ok(updated)
    }

    async fn try_upsert(&self, dto: C) -> AppResult<T> {
        let fields = serialize_object(dto)?;
        let existing = match fields.get("id").and_then(Value::as_str) {
            Some(id) => {
                let rows = self.load().await?;
                Self::position(&rows, id).map(|_| id.to_string())
            }
            None => None,
        };

        match existing {
            Some(id) => self.try_update(&id, without_managed(fields)).await,
            // An unknown caller-supplied id is discarded; a fresh one is minted
            None => {
                let mut created = self.insert(vec![without_managed(fields)]).await?;
                created.pop().ok_or_else(|| AppError::Unknown("upsert created no row".into()))
            }
        }
    }

    async fn try_delete(&self, id: &str) -> AppResult<()> {
        let mut rows = self.load().await?;
        let index = Self::position(&rows, id).ok_or_else(|| AppError::not_found(T::TABLE))?;
        rows.remove(index);
        self.save(rows).await
    }
}

#[async_trait]
impl<T, C, U> CrudRepository<T, C, U> for MockRepository<T, C, U>
where
    T: Entity,
    C: Serialize + Send + Sync + 'static,
    U: Serialize + Send + Sync + 'static,
{
    async fn find_all(&self, query: Option<Query>) -> ApiResponse<Vec<T>> {
        tracing::debug!(table = T::TABLE, filtered = query.is_some(), "find_all");
        self.try_find_all(query).await.into()
    }

    async fn find_by_id(&self, id: &str) -> ApiResponse<T> {
        tracing::debug!(table = T::TABLE, id, "find_by_id");
        self.try_find_by_id(id).await.into()
    }

    async fn create(&self, dto: C) -> ApiResponse<T> {
        tracing::debug!(table = T::TABLE, "create");
        let result = self.try_create_many(vec![dto]).await.and_then(|mut created| {
            created
                .pop()
                .ok_or_else(|| AppError::Unknown("create produced no row".into()))
        });
        result.into()
    }

    async fn create_many(&self, dtos: Vec<C>) -> ApiResponse<Vec<T>> {
        tracing::debug!(table = T::TABLE, count = dtos.len(), "create_many");
        self.try_create_many(dtos).await.into()
    }

    async fn update(&self, id: &str, dto: U) -> ApiResponse<T> {
        tracing::debug!(table = T::TABLE, id, "update");
        let result = match serialize_object(dto) {
            Ok(fields) => self.try_update(id, without_managed(fields)).await,
            Err(error) => Err(error),
        };
        result.into()
    }

    async fn upsert(&self, dto: C) -> ApiResponse<T> {
        tracing::debug!(table = T::TABLE, "upsert");
        self.try_upsert(dto).await.into()
    }

    async fn delete(&self, id: &str) -> ApiResponse<()> {
        tracing::debug!(table = T::TABLE, id, "delete");
        match self.try_delete(id).await {
            Ok(()) => ApiResponse::empty(),
            Err(error) => ApiResponse::err(error),
        }
    }

    fn table(&self) -> &'static str {
        T::TABLE
    }
}

fn storage_failure(error: StorageError) -> AppError {
    tracing::error!(%error, "Storage adapter failed");
    AppError::storage(error.to_string())
}

fn decode<T: Entity>(row: Value) -> AppResult<T> {
    Ok(serde_json::from_value(row)?)
}

fn serialize_object(dto: impl Serialize) -> AppResult<Map<String, Value>> {
    match serde_json::to_value(dto)? {
        Value::Object(fields) => Ok(fields),
        other => Err(AppError::validation(format!(
            "payload must be an object, got {}",
            kind(&other)
        ))),
    }
}

/// Serialized DTO without repository-managed columns.
fn to_object(dto: impl Serialize) -> AppResult<Map<String, Value>> {
    serialize_object(dto).map(without_managed)
}

fn without_managed(mut fields: Map<String, Value>) -> Map<String, Value> {
    for column in MANAGED_COLUMNS {
        fields.remove(column);
    }
    fields
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn format_stamp(stamp: DateTime<Utc>) -> String {
    stamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// `updated_at` for a modified row: now, but always strictly after the
/// previous value even when the clock has not advanced.
pub(crate) fn next_update_stamp(
    now: DateTime<Utc>,
    previous: Option<DateTime<Utc>>,
) -> DateTime<Utc> {
    match previous {
        Some(previous) if now <= previous => previous + Duration::microseconds(1),
        _ => now,
    }
}
