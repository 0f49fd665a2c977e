//! Remote CRUD engine over a [`BackendClient`].

use std::any::Any;
use std::future::Future;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use serde::Serialize;
use serde_json::{json, Map, Value};

use common::{ApiError, ApiResponse, AppError};
use domain::Entity;

use crate::backend::{BackendClient, BackendResult};
use crate::crud::CrudRepository;
use crate::query::Query;

/// Code the backend reports when a single-row request matched nothing.
pub const NO_ROWS_CODE: &str = "PGRST116";

/// [`CrudRepository`] backed by a remote table.
///
/// Every backend call goes through [`execute`](Self::execute), so failures
/// of any kind reach the caller as an [`ApiError`].
pub struct BaseRepository<T, C, U> {
    client: Arc<dyn BackendClient>,
    owner_column: Option<&'static str>,
    _marker: PhantomData<fn() -> (T, C, U)>,
}

impl<T, C, U> BaseRepository<T, C, U>
where
    T: Entity,
    C: Serialize + Send + Sync + 'static,
    U: Serialize + Send + Sync + 'static,
{
    pub fn new(client: Arc<dyn BackendClient>) -> Self {
        Self {
            client,
            owner_column: None,
            _marker: PhantomData,
        }
    }

    /// Fill `column` with the signed-in user's id on create/upsert when the
    /// payload leaves it unset.
    pub fn with_owner_column(mut self, column: &'static str) -> Self {
        self.owner_column = Some(column);
        self
    }

    pub fn client(&self) -> &Arc<dyn BackendClient> {
        &self.client
    }

    /// Run one backend call and normalize whatever comes out of it.
    ///
    /// Backend errors go through [`to_api_error`](common::to_api_error); a
    /// panic inside the call becomes an error with code `PANIC`.
    pub async fn execute<R, F>(&self, operation: F) -> Result<R, ApiError>
    where
        F: Future<Output = BackendResult<R>> + Send,
    {
        match AssertUnwindSafe(operation).catch_unwind().await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(failure)) => {
                tracing::error!(table = T::TABLE, error = %failure, "Backend call failed");
                Err(failure.to_api_error())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(table = T::TABLE, %message, "Backend call panicked");
                Err(ApiError::new(message).with_code("PANIC"))
            }
        }
    }

    /// Id of the signed-in user, or "Authentication required".
    pub async fn get_authenticated_user_id(&self) -> ApiResponse<String> {
        self.authenticated_user_id().await.into()
    }

    async fn authenticated_user_id(&self) -> Result<String, ApiError> {
        match self.execute(self.client.current_user()).await? {
            Some(user) if !user.id.trim().is_empty() => Ok(user.id),
            _ => Err(AppError::Unauthorized.into()),
        }
    }

    /// Serialize create payloads, checking the session first.
    async fn prepare(&self, dtos: Vec<C>, keep_id: bool) -> Result<Vec<Value>, ApiError> {
        let user_id = self.authenticated_user_id().await?;
        dtos.into_iter()
            .map(|dto| {
                let mut fields = serialize_object(dto)?;
                if !keep_id {
                    fields.remove("id");
                }
                fields.remove("created_at");
                fields.remove("updated_at");
                if let Some(column) = self.owner_column {
                    let unset = fields.get(column).map_or(true, Value::is_null);
                    if unset {
                        fields.insert(column.to_string(), Value::String(user_id.clone()));
                    }
                }
                Ok(Value::Object(fields))
            })
            .collect()
    }

    async fn try_find_all(&self, query: Option<Query>) -> Result<Vec<T>, ApiError> {
        let query = query.unwrap_or_default();
        let rows = self.execute(self.client.select(T::TABLE, &query)).await?;
        decode_rows(rows)
    }

    async fn try_find_by_id(&self, id: &str) -> Result<T, ApiError> {
        let query = Query::new().eq("id", id).limit(1);
        let rows = self.execute(self.client.select(T::TABLE, &query)).await?;
        single(rows)
    }

    async fn try_create_many(&self, dtos: Vec<C>) -> Result<Vec<T>, ApiError> {
        let rows = self.prepare(dtos, false).await?;
        let rows = self.execute(self.client.insert(T::TABLE, rows)).await?;
        decode_rows(rows)
    }

    async fn try_update(&self, id: &str, dto: U) -> Result<T, ApiError> {
        let mut patch = serialize_object(dto)?;
        for column in ["id", "created_at", "updated_at"] {
            patch.remove(column);
        }
        let query = Query::new().eq("id", id);
        let rows = self
            .execute(self.client.update(T::TABLE, &query, Value::Object(patch)))
            .await?;
        single(rows)
    }

    /// Ids the table does not know are dropped, so the backend mints one.
    async fn try_upsert(&self, dto: C) -> Result<T, ApiError> {
        let mut rows = self.prepare(vec![dto], true).await?;
        let supplied = rows
            .first()
            .and_then(|row| row.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string);

        if let Some(id) = supplied {
            let query = Query::new().eq("id", id.as_str()).limit(1);
            let existing = self.execute(self.client.select(T::TABLE, &query)).await?;
            if existing.is_empty() {
                tracing::debug!(table = T::TABLE, id = %id, "Unknown upsert id, inserting fresh");
                for row in rows.iter_mut().filter_map(Value::as_object_mut) {
                    row.remove("id");
                }
            }
        }

        let rows = self.execute(self.client.upsert(T::TABLE, rows)).await?;
        single(rows)
    }
}

#[async_trait]
impl<T, C, U> CrudRepository<T, C, U> for BaseRepository<T, C, U>
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
        let result = self.try_create_many(vec![dto]).await.and_then(|rows| {
            rows.into_iter()
                .next()
                .ok_or_else(|| no_rows("The insert returned 0 rows"))
        });
        result.into()
    }

    async fn create_many(&self, dtos: Vec<C>) -> ApiResponse<Vec<T>> {
        tracing::debug!(table = T::TABLE, count = dtos.len(), "create_many");
        self.try_create_many(dtos).await.into()
    }

    async fn update(&self, id: &str, dto: U) -> ApiResponse<T> {
        tracing::debug!(table = T::TABLE, id, "update");
        self.try_update(id, dto).await.into()
    }

    async fn upsert(&self, dto: C) -> ApiResponse<T> {
        tracing::debug!(table = T::TABLE, "upsert");
        self.try_upsert(dto).await.into()
    }

    async fn delete(&self, id: &str) -> ApiResponse<()> {
        tracing::debug!(table = T::TABLE, id, "delete");
        let query = Query::new().eq("id", id);
        match self.execute(self.client.delete(T::TABLE, &query)).await {
            Ok(_) => ApiResponse::empty(),
            Err(error) => ApiResponse::err(error),
        }
    }

    fn table(&self) -> &'static str {
        T::TABLE
    }
}

fn serialize_object(dto: impl Serialize) -> Result<Map<String, Value>, ApiError> {
    match serde_json::to_value(dto).map_err(AppError::from)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(AppError::validation("payload must be an object").into()),
    }
}

fn decode_rows<T: Entity>(rows: Vec<Value>) -> Result<Vec<T>, ApiError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(|e| ApiError::from(AppError::from(e))))
        .collect()
}

fn single<T: Entity>(rows: Vec<Value>) -> Result<T, ApiError> {
    decode_rows(rows)?
        .into_iter()
        .next()
        .ok_or_else(|| no_rows("The result contains 0 rows"))
}

fn no_rows(details: &str) -> ApiError {
    ApiError::new("JSON object requested, multiple (or no) rows returned")
        .with_code(NO_ROWS_CODE)
        .with_details(json!(details))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        common::UNKNOWN_ERROR_MESSAGE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AuthUser, BackendFailure, MockBackendClient, NativeError};
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        title: String,
        #[serde(default)]
        created_by: Option<String>,
    }
    domain::impl_entity!(Note, "notes");

    #[derive(Serialize)]
    struct NewNote {
        title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        created_by: Option<String>,
    }

    #[derive(Serialize)]
    struct NotePatch {
        title: String,
    }

    type Repo = BaseRepository<Note, NewNote, NotePatch>;

    fn repo(client: MockBackendClient) -> Repo {
        BaseRepository::new(Arc::new(client))
    }

    fn signed_in(client: &mut MockBackendClient, id: &str) {
        let user = AuthUser {
            id: id.to_string(),
            email: None,
        };
        client
            .expect_current_user()
            .returning(move || Ok(Some(user.clone())));
    }

    fn new_note(title: &str) -> NewNote {
        NewNote {
            title: title.into(),
            created_by: None,
        }
    }

    #[tokio::test]
    async fn test_create_without_session_never_inserts() {
        let mut client = MockBackendClient::new();
        client.expect_current_user().returning(|| Ok(None));
        client.expect_insert().never();

        let response = repo(client).create(new_note("milk")).await;

        let error = response.error.unwrap();
        assert_eq!(error.message, "Authentication required");
        assert_eq!(error.code.as_deref(), Some("AUTH_REQUIRED"));
        assert!(response.data.is_none());
    }

    #[tokio::test]
    async fn test_create_auth_provider_error_is_normalized() {
        let mut client = MockBackendClient::new();
        client.expect_current_user().returning(|| {
            Err(NativeError::new("JWT expired").with_code("bad_jwt").into())
        });
        client.expect_insert().never();

        let error = repo(client).create(new_note("milk")).await.error.unwrap();
        assert_eq!(error.message, "JWT expired");
        assert_eq!(error.code.as_deref(), Some("bad_jwt"));
    }

    #[tokio::test]
    async fn test_create_stamps_owner_column() {
        let mut client = MockBackendClient::new();
        signed_in(&mut client, "user-1");
        client
            .expect_insert()
            .withf(|table, rows| {
                table == "notes"
                    && rows.len() == 1
                    && rows[0]["created_by"] == "user-1"
                    && rows[0].get("id").is_none()
            })
            .times(1)
            .returning(|_, rows| {
                Ok(rows
                    .into_iter()
                    .map(|mut row| {
                        row["id"] = json!("n1");
                        row
                    })
                    .collect())
            });

        let created = repo(client)
            .with_owner_column("created_by")
            .create(new_note("milk"))
            .await
            .into_data()
            .unwrap();

        assert_eq!(created.id, "n1");
        assert_eq!(created.created_by.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn test_explicit_owner_is_kept() {
        let mut client = MockBackendClient::new();
        signed_in(&mut client, "user-1");
        client
            .expect_insert()
            .withf(|_, rows| rows[0]["created_by"] == "user-2")
            .returning(|_, rows| {
                Ok(rows
                    .into_iter()
                    .map(|mut row| {
                        row["id"] = json!("n1");
                        row
                    })
                    .collect())
            });

        let dto = NewNote {
            title: "milk".into(),
            created_by: Some("user-2".into()),
        };
        let created = repo(client)
            .with_owner_column("created_by")
            .create(dto)
            .await
            .into_data()
            .unwrap();
        assert_eq!(created.created_by.as_deref(), Some("user-2"));
    }

    #[tokio::test]
    async fn test_find_by_id_without_rows_reports_no_rows() {
        let mut client = MockBackendClient::new();
        client
            .expect_select()
            .withf(|table, query| table == "notes" && query.to_params()[0].1 == "eq.missing")
            .returning(|_, _| Ok(vec![]));

        let error = repo(client).find_by_id("missing").await.error.unwrap();
        assert_eq!(error.code.as_deref(), Some(NO_ROWS_CODE));
    }

    #[tokio::test]
    async fn test_backend_error_fields_are_preserved() {
        let mut client = MockBackendClient::new();
        client.expect_select().returning(|_, _| {
            Err(BackendFailure::Native(NativeError {
                message: "permission denied for table notes".into(),
                code: Some("42501".into()),
                details: None,
                hint: Some("Check row level security".into()),
            }))
        });

        let error = repo(client).find_all(None).await.error.unwrap();
        assert_eq!(error.message, "permission denied for table notes");
        assert_eq!(error.code.as_deref(), Some("42501"));
        assert_eq!(error.details, Some(json!({ "hint": "Check row level security" })));
    }

    #[tokio::test]
    async fn test_transport_failure_during_identity_check_is_converted() {
        let mut client = MockBackendClient::new();
        client.expect_current_user().returning(|| {
            Err(BackendFailure::transport(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )))
        });

        let response = repo(client).get_authenticated_user_id().await;
        assert_eq!(response.error.unwrap().message, "connection refused");
    }

    #[tokio::test]
    async fn test_blank_user_id_requires_authentication() {
        let mut client = MockBackendClient::new();
        signed_in(&mut client, "  ");

        let response = repo(client).get_authenticated_user_id().await;
        assert_eq!(response.error.unwrap().code.as_deref(), Some("AUTH_REQUIRED"));
    }

    #[tokio::test]
    async fn test_execute_converts_panics() {
        let repo = repo(MockBackendClient::new());
        let result: Result<(), ApiError> = repo
            .execute(async {
                if repo.table() == "notes" {
                    panic!("driver exploded");
                }
                Ok(())
            })
            .await;

        let error = result.unwrap_err();
        assert_eq!(error.message, "driver exploded");
        assert_eq!(error.code.as_deref(), Some("PANIC"));
    }

    #[tokio::test]
    async fn test_update_filters_by_id_and_strips_managed_columns() {
        let mut client = MockBackendClient::new();
        client
            .expect_update()
            .withf(|table, query, patch| {
                table == "notes"
                    && query.to_params() == vec![("id".to_string(), "eq.n1".to_string())]
                    && *patch == json!({ "title": "eggs" })
            })
            .returning(|_, _, _| Ok(vec![json!({ "id": "n1", "title": "eggs" })]));

        let updated = repo(client)
            .update("n1", NotePatch { title: "eggs".into() })
            .await
            .into_data()
            .unwrap();
        assert_eq!(updated.title, "eggs");
    }

    type ValueRepo = BaseRepository<Note, Value, NotePatch>;

    fn value_repo(client: MockBackendClient) -> ValueRepo {
        BaseRepository::new(Arc::new(client)).with_owner_column("created_by")
    }

    fn echo_with_id(rows: Vec<Value>, id: &str) -> BackendResult<Vec<Value>> {
        Ok(rows
            .into_iter()
            .map(|mut row| {
                if row.get("id").is_none() {
                    row["id"] = json!(id);
                }
                row
            })
            .collect())
    }

    #[tokio::test]
    async fn test_upsert_known_id_keeps_it_and_stamps_owner() {
        let mut client = MockBackendClient::new();
        signed_in(&mut client, "user-1");
        client
            .expect_select()
            .withf(|table, query| {
                table == "notes"
                    && query.to_params()
                        == vec![
                            ("id".to_string(), "eq.n1".to_string()),
                            ("limit".to_string(), "1".to_string()),
                        ]
            })
            .times(1)
            .returning(|_, _| Ok(vec![json!({ "id": "n1", "title": "old" })]));
        client
            .expect_upsert()
            .withf(|table, rows| {
                table == "notes"
                    && *rows
                        == vec![json!({ "id": "n1", "title": "milk", "created_by": "user-1" })]
            })
            .times(1)
            .returning(|_, rows| Ok(rows));

        let saved = value_repo(client)
            .upsert(json!({ "id": "n1", "title": "milk", "created_at": "2020-01-01T00:00:00Z" }))
            .await
            .into_data()
            .unwrap();

        assert_eq!(saved.id, "n1");
        assert_eq!(saved.created_by.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn test_upsert_unknown_id_is_not_adopted() {
        let mut client = MockBackendClient::new();
        signed_in(&mut client, "user-1");
        client.expect_select().times(1).returning(|_, _| Ok(vec![]));
        client
            .expect_upsert()
            .withf(|_, rows| rows.len() == 1 && rows[0].get("id").is_none())
            .times(1)
            .returning(|_, rows| echo_with_id(rows, "minted"));

        let saved = value_repo(client)
            .upsert(json!({ "id": "chosen-by-caller", "title": "milk" }))
            .await
            .into_data()
            .unwrap();

        assert_eq!(saved.id, "minted");
    }

    #[tokio::test]
    async fn test_upsert_without_session_touches_nothing() {
        let mut client = MockBackendClient::new();
        client.expect_current_user().returning(|| Ok(None));
        client.expect_select().never();
        client.expect_upsert().never();

        let error = value_repo(client)
            .upsert(json!({ "id": "n1", "title": "milk" }))
            .await
            .into_data()
            .unwrap_err();

        assert!(error.has_code("AUTH_REQUIRED"));
    }

    #[tokio::test]
    async fn test_create_many_strips_ids_and_inserts_once() {
        let mut client = MockBackendClient::new();
        signed_in(&mut client, "user-1");
        client
            .expect_insert()
            .withf(|table, rows| {
                table == "notes"
                    && *rows
                        == vec![
                            json!({ "title": "milk", "created_by": "user-1" }),
                            json!({ "title": "eggs", "created_by": "user-2" }),
                        ]
            })
            .times(1)
            .returning(|_, rows| {
                Ok(rows
                    .into_iter()
                    .enumerate()
                    .map(|(i, mut row)| {
                        row["id"] = json!(format!("n{i}"));
                        row
                    })
                    .collect())
            });

        let created = value_repo(client)
            .create_many(vec![
                json!({ "id": "x", "title": "milk", "updated_at": "2020-01-01T00:00:00Z" }),
                json!({ "id": "y", "title": "eggs", "created_by": "user-2" }),
            ])
            .await
            .into_data()
            .unwrap();

        let ids: Vec<_> = created.iter().map(|note| note.id.as_str()).collect();
        assert_eq!(ids, ["n0", "n1"]);
    }

    #[tokio::test]
    async fn test_find_all_sends_query_as_postgrest_params() {
        let mut client = MockBackendClient::new();
        client.expect_current_user().never();
        client
            .expect_select()
            .withf(|table, query| {
                table == "notes"
                    && query.to_params()
                        == vec![
                            ("created_by".to_string(), "eq.user-1".to_string()),
                            ("title".to_string(), "in.(\"milk\",\"eggs\")".to_string()),
                            ("order".to_string(), "title.desc".to_string()),
                            ("limit".to_string(), "2".to_string()),
                        ]
            })
            .times(1)
            .returning(|_, _| {
                Ok(vec![
                    json!({ "id": "n2", "title": "milk", "created_by": "user-1" }),
                    json!({ "id": "n1", "title": "eggs", "created_by": "user-1" }),
                ])
            });

        let query = Query::new()
            .eq("created_by", "user-1")
            .in_list("title", ["milk", "eggs"])
            .order_by("title", crate::query::Direction::Desc)
            .limit(2);
        let notes = repo(client).find_all(Some(query)).await.into_data().unwrap();

        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].id, "n2");
    }

    #[tokio::test]
    async fn test_delete_returns_empty_envelope() {
        let mut client = MockBackendClient::new();
        client.expect_delete().returning(|_, _| Ok(vec![]));

        let response = repo(client).delete("n1").await;
        assert!(response.is_ok());
        assert!(response.data.is_none());
    }
}
