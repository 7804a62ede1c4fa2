//! SQLite-backed Note Store
//!
//! Documents are stored as JSON text next to the columns they are looked up
//! by. `practice_logs` deliberately has no unique constraint on `note_id`:
//! the append path may produce duplicates, which readers resolve.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

use super::{new_document_id, NoteStore, StoredLog, UpsertSummary};
use crate::model::NoteRecord;
use crate::{Error, Result};

/// Note Store over a SQLite connection pool
#[derive(Debug, Clone)]
pub struct SqliteNoteStore {
    pool: SqlitePool,
}

impl SqliteNoteStore {
    /// Connect to `database_url`, creating the file and tables if needed
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let filename = options.get_filename().to_path_buf();
        if filename.as_path() != std::path::Path::new(":memory:") {
            if let Some(parent) = filename.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::query("PRAGMA busy_timeout = 5000")
            .execute(&pool)
            .await?;

        let store = Self { pool };
        store.init_tables().await?;
        info!("Note store opened: {}", filename.display());
        Ok(store)
    }

    /// Wrap an existing pool (tables are created if missing)
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        let store = Self { pool };
        store.init_tables().await?;
        Ok(store)
    }

    async fn init_tables(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS practice_logs (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                note_id TEXT NOT NULL,
                piece_id TEXT NOT NULL,
                date TEXT NOT NULL,
                document TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_practice_logs_piece_date ON practice_logs(piece_id, date)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_practice_logs_note_id ON practice_logs(note_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notes (
                id TEXT PRIMARY KEY,
                rep_id TEXT NOT NULL,
                document TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS repertoire (
                id TEXT PRIMARY KEY,
                rep_id TEXT NOT NULL UNIQUE,
                document TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn append_log(&self, record: &NoteRecord, updated_at: DateTime<Utc>) -> Result<i64> {
        let document = serde_json::to_string(record)?;
        let result = sqlx::query(
            "INSERT INTO practice_logs (note_id, piece_id, date, document, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&record.note_id)
        .bind(&record.piece_id)
        .bind(&record.date)
        .bind(document)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn query_logs(&self, piece_id: &str, date: &str) -> Result<Vec<StoredLog>> {
        let rows = sqlx::query(
            "SELECT seq, document, updated_at FROM practice_logs
             WHERE piece_id = ? AND date = ?
             ORDER BY seq",
        )
        .bind(piece_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        let mut logs = Vec::with_capacity(rows.len());
        for row in rows {
            let document: String = row.try_get("document")?;
            logs.push(StoredLog {
                seq: row.try_get("seq")?,
                updated_at: row.try_get("updated_at")?,
                record: serde_json::from_str(&document)?,
            });
        }
        debug!(piece_id, date, count = logs.len(), "Queried practice logs");
        Ok(logs)
    }

    async fn upsert_log(&self, record: &NoteRecord) -> Result<UpsertSummary> {
        let document = serde_json::to_string(record)?;
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE practice_logs
             SET piece_id = ?, date = ?, document = ?, updated_at = ?
             WHERE note_id = ?",
        )
        .bind(&record.piece_id)
        .bind(&record.date)
        .bind(&document)
        .bind(Utc::now())
        .bind(&record.note_id)
        .execute(&mut *tx)
        .await?;

        let matched = updated.rows_affected();
        let upserted = if matched == 0 {
            sqlx::query(
                "INSERT INTO practice_logs (note_id, piece_id, date, document, updated_at)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&record.note_id)
            .bind(&record.piece_id)
            .bind(&record.date)
            .bind(&document)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
            1
        } else {
            0
        };

        tx.commit().await?;

        Ok(UpsertSummary {
            note_id: record.note_id.clone(),
            matched,
            upserted,
        })
    }

    async fn insert_log(&self, record: &NoteRecord) -> Result<String> {
        let seq = self.append_log(record, Utc::now()).await?;
        Ok(seq.to_string())
    }

    async fn insert_note(&self, rep_id: &str, document: &Value) -> Result<String> {
        let id = new_document_id();
        sqlx::query("INSERT INTO notes (id, rep_id, document, created_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(rep_id)
            .bind(serde_json::to_string(document)?)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn find_repertoire(&self, rep_id: &str) -> Result<Option<Value>> {
        let document: Option<String> =
            sqlx::query_scalar("SELECT document FROM repertoire WHERE rep_id = ?")
                .bind(rep_id)
                .fetch_optional(&self.pool)
                .await?;

        document
            .map(|d| serde_json::from_str(&d).map_err(Error::from))
            .transpose()
    }

    async fn insert_repertoire(&self, rep_id: &str, document: &Value) -> Result<String> {
        let id = new_document_id();
        let result = sqlx::query(
            "INSERT INTO repertoire (id, rep_id, document, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(rep_id)
        .bind(serde_json::to_string(document)?)
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(id),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(Error::Conflict(
                format!("Repertoire with rep_id '{rep_id}' already exists"),
            )),
            Err(e) => Err(e.into()),
        }
    }
}
