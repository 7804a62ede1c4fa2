//! Process-wide store handle, connected on first use
//!
//! The first operation opens the SQLite store; every later operation reuses
//! it. Concurrent first callers wait on the same initialization. A failed
//! connect leaves the handle empty, so the next call tries again. The
//! handle is never torn down.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use super::{NoteStore, SqliteNoteStore, StoredLog, UpsertSummary};
use crate::model::NoteRecord;
use crate::{Error, Result};

/// Lazily-connected [`SqliteNoteStore`]
#[derive(Debug)]
pub struct LazyNoteStore {
    database_url: String,
    cell: OnceCell<SqliteNoteStore>,
}

impl LazyNoteStore {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            cell: OnceCell::new(),
        }
    }

    /// True once a connection has been established
    pub fn is_connected(&self) -> bool {
        self.cell.initialized()
    }

    async fn store(&self) -> Result<&SqliteNoteStore> {
        if let Some(store) = self.cell.get() {
            debug!("[store] Reusing cached connection");
            return Ok(store);
        }

        self.cell
            .get_or_try_init(|| async {
                match SqliteNoteStore::connect(&self.database_url).await {
                    Ok(store) => {
                        info!("[store] Connected successfully");
                        Ok(store)
                    }
                    Err(e) => {
                        error!("[store] Connection failed: {}", e);
                        Err(Error::Store(format!("connection failed: {e}")))
                    }
                }
            })
            .await
    }
}

#[async_trait]
impl NoteStore for LazyNoteStore {
    async fn query_logs(&self, piece_id: &str, date: &str) -> Result<Vec<StoredLog>> {
        self.store().await?.query_logs(piece_id, date).await
    }

    async fn upsert_log(&self, record: &NoteRecord) -> Result<UpsertSummary> {
        self.store().await?.upsert_log(record).await
    }

    async fn insert_log(&self, record: &NoteRecord) -> Result<String> {
        self.store().await?.insert_log(record).await
    }

    async fn insert_note(&self, rep_id: &str, document: &Value) -> Result<String> {
        self.store().await?.insert_note(rep_id, document).await
    }

    async fn find_repertoire(&self, rep_id: &str) -> Result<Option<Value>> {
        self.store().await?.find_repertoire(rep_id).await
    }

    async fn insert_repertoire(&self, rep_id: &str, document: &Value) -> Result<String> {
        self.store().await?.insert_repertoire(rep_id, document).await
    }
}
