//! Mirror of one practice day onto the piece's document page
//!
//! Aggregator -> Block Builder -> Section Reconciler, with the Page Locator
//! supplying the page.

use serde::Serialize;
use stretto_common::db::NoteStore;
use stretto_common::{Error, NoteRecord, Result};

use super::aggregator::aggregate;
use super::block_builder::build_day_blocks;
use super::page_locator::{locate_or_create_page, locate_page};
use super::section_reconciler::{reconcile, ReconcileReport};
use crate::notion::DocumentApi;

/// Summary of one mirrored day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MirrorReport {
    pub page_id: String,
    pub page_created: bool,
    /// Distinct notes rendered into the section
    pub notes: usize,
    #[serde(flatten)]
    pub reconcile: ReconcileReport,
}

/// Rebuild the section for a freshly written record, creating the page if needed
pub async fn mirror_day(
    store: &dyn NoteStore,
    api: &dyn DocumentApi,
    record: &NoteRecord,
    page_size: u32,
) -> Result<MirrorReport> {
    let (page, page_created) = locate_or_create_page(api, record).await?;
    let notes = aggregate(store, &record.piece_id, &record.date).await?;
    let section = reconcile(api, &page.id, &record.date, build_day_blocks(&notes), page_size).await?;

    Ok(MirrorReport {
        page_id: page.id,
        page_created,
        notes: notes.len(),
        reconcile: section,
    })
}

/// Rebuild the section for (`piece_id`, `date`) on an existing page
///
/// A day without notes, or a piece without a page, is `NotFound` and
/// leaves the page untouched.
pub async fn sync_day(
    store: &dyn NoteStore,
    api: &dyn DocumentApi,
    piece_id: &str,
    date: &str,
    page_size: u32,
) -> Result<MirrorReport> {
    let notes = aggregate(store, piece_id, date).await?;
    if notes.is_empty() {
        return Err(Error::NotFound(format!(
            "No practice logs for {} on {}",
            piece_id, date
        )));
    }

    let page = locate_page(api, piece_id).await?;
    let section = reconcile(api, &page.id, date, build_day_blocks(&notes), page_size).await?;

    Ok(MirrorReport {
        page_id: page.id,
        page_created: false,
        notes: notes.len(),
        reconcile: section,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notion::{ContentBlock, FakeDocumentApi, FakeOp};
    use stretto_common::db::MemoryNoteStore;
    use stretto_common::model::{Entry, PieceMetadata};

    fn record(note_id: &str, time: &str) -> NoteRecord {
        NoteRecord {
            note_id: note_id.into(),
            piece_id: "chop_op18".into(),
            date: "2025-06-24".into(),
            time: Some(time.into()),
            duration_minutes: 25,
            entries: vec![Entry {
                content: format!("note {}", note_id),
                ..Default::default()
            }],
            metadata: PieceMetadata::default(),
        }
    }

    #[tokio::test]
    async fn test_mirror_creates_page_and_section() {
        let store = MemoryNoteStore::new();
        let api = FakeDocumentApi::new();
        let a = record("a", "10:00");
        store.upsert_log(&a).await.unwrap();
        store.upsert_log(&record("b", "14:30")).await.unwrap();

        let report = mirror_day(&store, &api, &a, 100).await.unwrap();
        assert!(report.page_created);
        assert_eq!(report.notes, 2);

        let tree = api.tree(&report.page_id);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].plain_text(), "2025-06-24");
        let headers: Vec<String> = tree[0]
            .children()
            .iter()
            .filter(|b| b.kind() == "heading_3")
            .map(ContentBlock::plain_text)
            .collect();
        assert_eq!(headers.len(), 2);
        assert!(headers[0].contains("10:00 AM"));
        assert!(headers[1].contains("2:30 PM"));
    }

    #[tokio::test]
    async fn test_sync_day_without_page_is_not_found() {
        let store = MemoryNoteStore::new();
        let api = FakeDocumentApi::new();
        store.upsert_log(&record("a", "10:00")).await.unwrap();

        let err = sync_day(&store, &api, "chop_op18", "2025-06-24", 100).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(!api.calls().contains(&FakeOp::CreatePage));
    }

    #[tokio::test]
    async fn test_sync_day_without_notes_leaves_page_alone() {
        let store = MemoryNoteStore::new();
        let api = FakeDocumentApi::new();
        api.add_page("chop_op18");

        let err = sync_day(&store, &api, "chop_op18", "2025-06-24", 100).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_stops_before_reconcile() {
        let store = MemoryNoteStore::new();
        let api = FakeDocumentApi::new();
        api.add_page("chop_op18");
        store.set_failure(Some("down"));

        let err = mirror_day(&store, &api, &record("a", "10:00"), 100).await.unwrap_err();
        assert!(err.is_store_error());
        assert!(!api.calls().contains(&FakeOp::ListChildren));
    }
}
