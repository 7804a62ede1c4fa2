//! In-process Note Store
//!
//! Keeps documents in insertion order behind a mutex. A failure can be
//! injected so callers can exercise their store-error paths.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Mutex;

use super::{new_document_id, NoteStore, StoredLog, UpsertSummary};
use crate::model::NoteRecord;
use crate::{Error, Result};

#[derive(Debug, Default)]
struct Inner {
    logs: Vec<StoredLog>,
    next_seq: i64,
    notes: Vec<(String, String, Value)>,
    repertoire: Vec<(String, String, Value)>,
    failure: Option<String>,
}

/// Note Store held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    inner: Mutex<Inner>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with `message` (`None` clears it)
    pub fn set_failure(&self, message: Option<&str>) {
        self.lock().failure = message.map(str::to_string);
    }

    /// Append a document with an explicit write time
    pub fn push_log_at(&self, record: NoteRecord, updated_at: DateTime<Utc>) -> i64 {
        let mut inner = self.lock();
        inner.next_seq += 1;
        let seq = inner.next_seq;
        inner.logs.push(StoredLog {
            seq,
            updated_at,
            record,
        });
        seq
    }

    /// Every practice-log document, in insertion order
    pub fn logs(&self) -> Vec<StoredLog> {
        self.lock().logs.clone()
    }

    /// Session note documents as `(id, rep_id, document)`
    pub fn notes(&self) -> Vec<(String, String, Value)> {
        self.lock().notes.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means a test thread panicked mid-write
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        let inner = self.lock();
        match &inner.failure {
            Some(message) => Err(Error::Store(message.clone())),
            None => Ok(inner),
        }
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn query_logs(&self, piece_id: &str, date: &str) -> Result<Vec<StoredLog>> {
        let inner = self.check()?;
        Ok(inner
            .logs
            .iter()
            .filter(|log| log.record.piece_id == piece_id && log.record.date == date)
            .cloned()
            .collect())
    }

    async fn upsert_log(&self, record: &NoteRecord) -> Result<UpsertSummary> {
        let mut inner = self.check()?;
        let now = Utc::now();
        let mut matched = 0;
        for log in inner
            .logs
            .iter_mut()
            .filter(|log| log.record.note_id == record.note_id)
        {
            log.record = record.clone();
            log.updated_at = now;
            matched += 1;
        }

        let upserted = if matched == 0 {
            inner.next_seq += 1;
            let seq = inner.next_seq;
            inner.logs.push(StoredLog {
                seq,
                updated_at: now,
                record: record.clone(),
            });
            1
        } else {
            0
        };

        Ok(UpsertSummary {
            note_id: record.note_id.clone(),
            matched,
            upserted,
        })
    }

    async fn insert_log(&self, record: &NoteRecord) -> Result<String> {
        drop(self.check()?);
        Ok(self.push_log_at(record.clone(), Utc::now()).to_string())
    }

    async fn insert_note(&self, rep_id: &str, document: &Value) -> Result<String> {
        let mut inner = self.check()?;
        let id = new_document_id();
        inner
            .notes
            .push((id.clone(), rep_id.to_string(), document.clone()));
        Ok(id)
    }

    async fn find_repertoire(&self, rep_id: &str) -> Result<Option<Value>> {
        let inner = self.check()?;
        Ok(inner
            .repertoire
            .iter()
            .find(|(_, id, _)| id == rep_id)
            .map(|(_, _, doc)| doc.clone()))
    }

    async fn insert_repertoire(&self, rep_id: &str, document: &Value) -> Result<String> {
        let mut inner = self.check()?;
        if inner.repertoire.iter().any(|(_, id, _)| id == rep_id) {
            return Err(Error::Conflict(format!(
                "Repertoire with rep_id '{rep_id}' already exists"
            )));
        }
        let id = new_document_id();
        inner
            .repertoire
            .push((id.clone(), rep_id.to_string(), document.clone()));
        Ok(id)
    }
}
