//! `SQLite` implementation of [`RecordStore`] and [`RecordSession`].

use chrono::{DateTime, Utc};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, Sqlite, SqlitePool};

use crudkit_app::ports::{RecordSession, RecordStore};
use crudkit_domain::error::CrudError;
use crudkit_domain::id::RecordId;
use crudkit_domain::record::{Fields, NewRecord, Record};

use crate::error::StorageError;
use crate::pool::Database;

/// Wrapper for converting database rows into domain [`Record`].
struct Wrapper(Record);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Record> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let fields: String = row.try_get("fields")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

        let id = RecordId::new(id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let fields: Fields =
            serde_json::from_str(&fields).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Record {
            id,
            fields,
            created_at,
            updated_at,
        }))
    }
}

const INSERT: &str = "INSERT INTO records (model, fields, created_at, updated_at) VALUES (?, ?, ?, ?) RETURNING id, fields, created_at, updated_at";
const SELECT_ALL: &str =
    "SELECT id, fields, created_at, updated_at FROM records WHERE model = ? ORDER BY id";
const SELECT_BY_ID: &str =
    "SELECT id, fields, created_at, updated_at FROM records WHERE model = ? AND id = ?";
const UPDATE: &str = "UPDATE records SET fields = ?, updated_at = ? WHERE model = ? AND id = ? RETURNING id, fields, created_at, updated_at";
const DELETE_BY_ID: &str = "DELETE FROM records WHERE model = ? AND id = ?";

/// `SQLite`-backed record store. Clones share the same pool.
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Create a new store on top of the shared [`Database`] client.
    #[must_use]
    pub fn new(database: &Database) -> Self {
        Self {
            pool: database.pool().clone(),
        }
    }
}

impl RecordStore for SqliteRecordStore {
    type Session = SqliteRecordSession;

    async fn acquire(&self) -> Result<SqliteRecordSession, CrudError> {
        let conn = self.pool.acquire().await.map_err(StorageError::from)?;
        Ok(SqliteRecordSession { conn })
    }
}

/// One pooled connection, returned to the pool on [`RecordSession::release`].
pub struct SqliteRecordSession {
    conn: PoolConnection<Sqlite>,
}

impl RecordSession for SqliteRecordSession {
    async fn find_all(&mut self, model: &str) -> Result<Vec<Record>, CrudError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
            .bind(model)
            .fetch_all(&mut *self.conn)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn find_by_id(
        &mut self,
        model: &str,
        id: RecordId,
    ) -> Result<Option<Record>, CrudError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(model)
            .bind(id.get())
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(StorageError::from)?;

        Ok(Wrapper::maybe(row))
    }

    async fn create(&mut self, model: &str, record: NewRecord) -> Result<Record, CrudError> {
        let fields = serde_json::to_string(record.fields()).map_err(StorageError::from)?;
        let now = Utc::now();

        let row: Wrapper = sqlx::query_as(INSERT)
            .bind(model)
            .bind(fields)
            .bind(now)
            .bind(now)
            .fetch_one(&mut *self.conn)
            .await
            .map_err(StorageError::from)?;

        Ok(row.0)
    }

    async fn update(
        &mut self,
        model: &str,
        id: RecordId,
        fields: Fields,
    ) -> Result<Option<Record>, CrudError> {
        let fields = serde_json::to_string(&fields).map_err(StorageError::from)?;

        let row: Option<Wrapper> = sqlx::query_as(UPDATE)
            .bind(fields)
            .bind(Utc::now())
            .bind(model)
            .bind(id.get())
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(StorageError::from)?;

        Ok(Wrapper::maybe(row))
    }

    async fn delete(&mut self, model: &str, id: RecordId) -> Result<bool, CrudError> {
        let result = sqlx::query(DELETE_BY_ID)
            .bind(model)
            .bind(id.get())
            .execute(&mut *self.conn)
            .await
            .map_err(StorageError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn release(self) {
        drop(self.conn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;
    use crudkit_domain::model::ModelSchema;
    use serde_json::json;

    async fn setup() -> SqliteRecordStore {
        let db = Config::new("sqlite::memory:").build().await.unwrap();
        SqliteRecordStore::new(&db)
    }

    fn new_record(value: &str) -> NewRecord {
        NewRecord::parse(json!({"requiredField": value}), &ModelSchema::default()).unwrap()
    }

    #[tokio::test]
    async fn should_create_and_retrieve_record_when_valid() {
        let store = setup().await;
        let mut session = store.acquire().await.unwrap();

        let created = session.create("records", new_record("x")).await.unwrap();
        let fetched = session
            .find_by_id("records", created.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.fields.get("requiredField"), Some(&json!("x")));
        session.release().await;
    }

    #[tokio::test]
    async fn should_return_none_when_record_not_found() {
        let store = setup().await;
        let mut session = store.acquire().await.unwrap();
        let result = session
            .find_by_id("records", RecordId::new(99).unwrap())
            .await
            .unwrap();
        assert!(result.is_none());
        session.release().await;
    }

    #[tokio::test]
    async fn should_list_only_records_of_the_requested_model() {
        let store = setup().await;
        let mut session = store.acquire().await.unwrap();
        session.create("records", new_record("a")).await.unwrap();
        session.create("records", new_record("b")).await.unwrap();
        session.create("others", new_record("c")).await.unwrap();

        let all = session.find_all("records").await.unwrap();

        assert_eq!(all.len(), 2);
        assert!(all[0].id < all[1].id);
        session.release().await;
    }

    #[tokio::test]
    async fn should_replace_fields_on_update() {
        let store = setup().await;
        let mut session = store.acquire().await.unwrap();
        let created = session.create("records", new_record("a")).await.unwrap();

        let mut fields = created.fields.clone();
        fields.insert("color".to_string(), json!("red"));
        let updated = session
            .update("records", created.id, fields)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.fields.get("color"), Some(&json!("red")));
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        session.release().await;
    }

    #[tokio::test]
    async fn should_return_none_when_updating_missing_record() {
        let store = setup().await;
        let mut session = store.acquire().await.unwrap();
        let result = session
            .update("records", RecordId::new(5).unwrap(), Fields::new())
            .await
            .unwrap();
        assert!(result.is_none());
        session.release().await;
    }

    #[tokio::test]
    async fn should_delete_record_when_exists() {
        let store = setup().await;
        let mut session = store.acquire().await.unwrap();
        let created = session.create("records", new_record("a")).await.unwrap();

        assert!(session.delete("records", created.id).await.unwrap());
        assert!(!session.delete("records", created.id).await.unwrap());
        assert!(session.find_all("records").await.unwrap().is_empty());
        session.release().await;
    }

    #[tokio::test]
    async fn should_return_connection_to_pool_on_release() {
        let store = setup().await;

        let mut first = store.acquire().await.unwrap();
        first.create("records", new_record("a")).await.unwrap();
        first.release().await;

        let mut second = store.acquire().await.unwrap();
        assert_eq!(second.find_all("records").await.unwrap().len(), 1);
        second.release().await;
    }
}
