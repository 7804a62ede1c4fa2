//! Note Store: document persistence for practice logs, session notes and
//! repertoire records
//!
//! Handlers and the mirror only ever see the [`NoteStore`] trait. Production
//! uses [`LazyNoteStore`], which opens a [`SqliteNoteStore`] on first use;
//! tests use `MemoryNoteStore` (feature `test-util`).

#[cfg(feature = "sqlx")]
mod lazy;
#[cfg(any(test, feature = "test-util"))]
mod memory;
#[cfg(feature = "sqlx")]
mod sqlite;

#[cfg(feature = "sqlx")]
pub use lazy::LazyNoteStore;
#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryNoteStore;
#[cfg(feature = "sqlx")]
pub use sqlite::SqliteNoteStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::model::NoteRecord;
use crate::Result;

/// One practice-log document as held by the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredLog {
    /// Insertion sequence; the store's natural retrieval order
    pub seq: i64,
    /// Time of the last write to this document
    pub updated_at: DateTime<Utc>,
    pub record: NoteRecord,
}

/// Result of an upsert keyed by `note_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpsertSummary {
    pub note_id: String,
    /// Existing documents that were replaced
    pub matched: u64,
    /// Documents newly inserted (0 or 1)
    pub upserted: u64,
}

/// Document store boundary
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// All practice-log documents for one piece and day, in insertion order
    async fn query_logs(&self, piece_id: &str, date: &str) -> Result<Vec<StoredLog>>;

    /// Replace every document carrying `record.note_id`, or insert one
    async fn upsert_log(&self, record: &NoteRecord) -> Result<UpsertSummary>;

    /// Append a document without any deduplication; returns its id
    async fn insert_log(&self, record: &NoteRecord) -> Result<String>;

    /// Insert a session note document; returns its id
    async fn insert_note(&self, rep_id: &str, document: &Value) -> Result<String>;

    /// Repertoire document for `rep_id`, if any
    async fn find_repertoire(&self, rep_id: &str) -> Result<Option<Value>>;

    /// Insert a repertoire document; a taken `rep_id` is a conflict
    async fn insert_repertoire(&self, rep_id: &str, document: &Value) -> Result<String>;
}

/// New document id
pub(crate) fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
