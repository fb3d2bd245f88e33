//! SQLite backed signature repository.
//!
//! One row per signature. Rows keep a per-user `position` assigned on first
//! insert so listings come back in insertion order. Typed parameters are
//! stored as JSON next to the embedded image. A partial unique index makes a
//! second default for the same user impossible at the storage level.
//!
//! `rusqlite` is blocking, so every call runs on Tokio's blocking pool with the
//! connection behind a mutex.

use crate::error::{Result, SignatureError};
use crate::lifecycle::repository::SignatureRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::model::signature::{SignatureKind, SignatureRecord};
use common::model::typed::TypedSignature;
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS signatures (
    user_id    TEXT NOT NULL,
    id         TEXT NOT NULL,
    position   INTEGER NOT NULL,
    name       TEXT NOT NULL,
    kind       TEXT NOT NULL,
    typed_json TEXT,
    image      TEXT NOT NULL,
    is_default INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    last_used  TEXT,
    PRIMARY KEY (user_id, id)
);
CREATE UNIQUE INDEX IF NOT EXISTS signatures_one_default
    ON signatures (user_id) WHERE is_default = 1;
";

const SELECT_COLUMNS: &str =
    "SELECT id, name, kind, typed_json, image, is_default, created_at, last_used FROM signatures";

const UPSERT: &str = "
INSERT INTO signatures
    (user_id, id, position, name, kind, typed_json, image, is_default, created_at, last_used)
VALUES
    (?1, ?2, (SELECT COALESCE(MAX(position), 0) + 1 FROM signatures WHERE user_id = ?1),
     ?3, ?4, ?5, ?6, ?7, ?8, ?9)
ON CONFLICT (user_id, id) DO UPDATE SET
    name = excluded.name,
    typed_json = excluded.typed_json,
    image = excluded.image,
    is_default = excluded.is_default,
    last_used = excluded.last_used
";

#[derive(Clone)]
pub struct SqliteRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRepository {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        info!("Opened signature database {}", path.display());
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| SignatureError::Persistence("database lock poisoned".into()))?;
            f(&mut guard)
        })
        .await?
    }
}

fn write_record(conn: &Connection, user_id: &str, record: &SignatureRecord) -> Result<()> {
    let typed_json = record
        .kind
        .typed()
        .map(serde_json::to_string)
        .transpose()?;
    conn.execute(
        UPSERT,
        params![
            user_id,
            record.id,
            record.name,
            record.kind.label(),
            typed_json,
            record.image,
            record.is_default,
            record.created_at.to_rfc3339(),
            record.last_used.map(|t| t.to_rfc3339()),
        ],
    )?;
    Ok(())
}

struct RawRow {
    id: String,
    name: String,
    kind: String,
    typed_json: Option<String>,
    image: String,
    is_default: bool,
    created_at: String,
    last_used: Option<String>,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            kind: row.get(2)?,
            typed_json: row.get(3)?,
            image: row.get(4)?,
            is_default: row.get(5)?,
            created_at: row.get(6)?,
            last_used: row.get(7)?,
        })
    }

    fn into_record(self) -> Result<SignatureRecord> {
        let kind = match (self.kind.as_str(), self.typed_json) {
            ("drawn", _) => SignatureKind::Drawn,
            ("uploaded", _) => SignatureKind::Uploaded,
            ("typed", Some(json)) => {
                SignatureKind::Typed(serde_json::from_str::<TypedSignature>(&json)?)
            }
            (other, _) => {
                return Err(SignatureError::Persistence(format!(
                    "corrupt signature row {}: kind {}",
                    self.id, other
                )))
            }
        };
        Ok(SignatureRecord {
            kind,
            created_at: parse_time(&self.created_at)?,
            last_used: self.last_used.as_deref().map(parse_time).transpose()?,
            id: self.id,
            name: self.name,
            image: self.image,
            is_default: self.is_default,
        })
    }
}

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| SignatureError::Persistence(format!("bad timestamp {}: {}", value, e)))
}

#[async_trait]
impl SignatureRepository for SqliteRepository {
    async fn list(&self, user_id: &str) -> Result<Vec<SignatureRecord>> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE user_id = ?1 ORDER BY position",
                SELECT_COLUMNS
            ))?;
            let rows = stmt
                .query_map(params![user_id], RawRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows.into_iter().map(RawRow::into_record).collect()
        })
        .await
    }

    async fn get(&self, user_id: &str, id: &str) -> Result<Option<SignatureRecord>> {
        let (user_id, id) = (user_id.to_string(), id.to_string());
        self.with_conn(move |conn| {
            let raw = conn
                .query_row(
                    &format!("{} WHERE user_id = ?1 AND id = ?2", SELECT_COLUMNS),
                    params![user_id, id],
                    RawRow::from_row,
                )
                .optional()?;
            raw.map(RawRow::into_record).transpose()
        })
        .await
    }

    async fn put(&self, user_id: &str, record: SignatureRecord) -> Result<()> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| write_record(conn, &user_id, &record))
            .await
    }

    async fn put_all(&self, user_id: &str, mut records: Vec<SignatureRecord>) -> Result<()> {
        let user_id = user_id.to_string();
        // Cleared defaults are written before the new one to satisfy the unique index.
        records.sort_by_key(|r| r.is_default);
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            for record in &records {
                write_record(&tx, &user_id, record)?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool> {
        let (user_id, id) = (user_id.to_string(), id.to_string());
        self.with_conn(move |conn| {
            let removed = conn.execute(
                "DELETE FROM signatures WHERE user_id = ?1 AND id = ?2",
                params![user_id, id],
            )?;
            Ok(removed > 0)
        })
        .await
    }
}
