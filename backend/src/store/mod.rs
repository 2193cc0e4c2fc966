//! Record Store - Append-only persistence of survey submissions
//!
//! One SQLite table holds `(id, payload)` pairs. Ids come from SQLite's
//! `AUTOINCREMENT`, so they are assigned atomically with the insert and
//! never reused. Payloads are stored verbatim as JSON text.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::types::Json;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{StoreError, StoreResult};
use crate::models::Record;

/// Database file used when no path is configured.
pub const DEFAULT_DB_PATH: &str = "voices.db";

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS payload (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        data        TEXT NOT NULL,
        created_at  TEXT NOT NULL
    )
"#;

type RecordRow = (i64, Json<Value>, DateTime<Utc>);

/// Handle to the record store. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    /// Open (creating if needed) the database at `path`.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::query(CREATE_TABLE).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Persist a payload and return its new id.
    ///
    /// Only JSON objects are accepted; anything else is rejected before
    /// touching the database.
    pub async fn insert(&self, payload: &Value) -> StoreResult<i64> {
        if !payload.is_object() {
            return Err(StoreError::InvalidPayload(format!(
                "expected a JSON object, got {}",
                json_kind(payload)
            )));
        }

        let id = sqlx::query("INSERT INTO payload (data, created_at) VALUES (?, ?)")
            .bind(Json(payload))
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        Ok(id)
    }

    /// All records, ascending by id.
    pub async fn list_all(&self) -> StoreResult<Vec<Record>> {
        let rows: Vec<RecordRow> =
            sqlx::query_as("SELECT id, data, created_at FROM payload ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(into_record).collect())
    }

    /// A single record by id.
    pub async fn get(&self, id: i64) -> StoreResult<Record> {
        let row: Option<RecordRow> =
            sqlx::query_as("SELECT id, data, created_at FROM payload WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(into_record).ok_or(StoreError::NotFound(id))
    }

    /// Number of stored records.
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payload")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Close the pool, waiting for connections to be released.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn into_record((id, Json(payload), created_at): RecordRow) -> Record {
    Record {
        id,
        payload,
        created_at,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("voices.db")).await.unwrap();

        let a = store.insert(&json!({ "n": 1 })).await.unwrap();
        let b = store.insert(&json!({ "n": 2 })).await.unwrap();
        let c = store.insert(&json!({ "n": 3 })).await.unwrap();

        assert!(a < b && b < c);
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_list_all_in_id_order() {
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("voices.db")).await.unwrap();

        for n in 0..5 {
            store.insert(&json!({ "n": n })).await.unwrap();
        }

        let records = store.list_all().await.unwrap();
        assert_eq!(records.len(), 5);
        assert!(records.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(records[3].payload, json!({ "n": 3 }));
    }

    #[tokio::test]
    async fn test_get_round_trips_payload() {
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("voices.db")).await.unwrap();

        let payload = json!({
            "personalInformation": { "age": "2", "levelEducation": ["1", "2"] },
            "canvas": [{ "form": { "name": "A1", "correctness": 4.5 } }]
        });
        let id = store.insert(&payload).await.unwrap();

        let record = store.get(id).await.unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.payload, payload);
    }

    #[tokio::test]
    async fn test_get_unknown_id() {
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("voices.db")).await.unwrap();

        let err = store.get(99).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(99)));
    }

    #[tokio::test]
    async fn test_non_object_rejected_without_write() {
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("voices.db")).await.unwrap();

        for payload in [json!([1, 2]), json!("text"), json!(null), json!(3)] {
            let err = store.insert(&payload).await.unwrap_err();
            assert!(matches!(err, StoreError::InvalidPayload(_)));
        }
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("voices.db");

        let store = RecordStore::open(&path).await.unwrap();
        let id = store.insert(&json!({ "kept": true })).await.unwrap();
        store.close().await;

        let reopened = RecordStore::open(&path).await.unwrap();
        assert_eq!(reopened.get(id).await.unwrap().payload, json!({ "kept": true }));

        let next = reopened.insert(&json!({ "kept": false })).await.unwrap();
        assert!(next > id);
    }
}
