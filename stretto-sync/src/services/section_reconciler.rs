//! Section Reconciler: keep one date section per day on a page
//!
//! Steps per call, nothing carried between calls:
//! 1. list the page's direct children (first page only),
//! 2. match containers whose trimmed label equals the date,
//! 3. delete every match (descendants go with it),
//! 4. append a new date section holding the fresh blocks.
//!
//! The section is created with at most [`MAX_CHILDREN_PER_APPEND`] children;
//! the remainder goes to the new section in further appends of that size.
//!
//! Listing and appending failures abort the call. A failed delete is logged
//! and the append still happens, so two sections for the same date can
//! survive until the next successful pass.

use serde::Serialize;
use stretto_common::{Error, Result};
use tracing::{debug, info, warn};

use super::block_builder::date_section;
use crate::notion::{ContentBlock, DocumentApi, RemoteBlock, MAX_CHILDREN_PER_APPEND};

/// What a reconcile pass did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Id of the appended section, when the API reported it
    pub section_id: Option<String>,
    /// Stale sections deleted
    pub evicted: usize,
    /// Stale sections whose deletion failed
    pub evict_failures: usize,
}

/// Direct children that hold a section for `date`
pub fn matching_sections<'a>(children: &'a [RemoteBlock], date: &str) -> Vec<&'a RemoteBlock> {
    children
        .iter()
        .filter(|block| block.is_container() && block.label_text().trim() == date)
        .collect()
}

/// Replace the section for `date` on `page_id` with one holding `blocks`
pub async fn reconcile(
    api: &dyn DocumentApi,
    page_id: &str,
    date: &str,
    blocks: Vec<ContentBlock>,
    page_size: u32,
) -> Result<ReconcileReport> {
    let children = api.list_children(page_id, page_size).await?;
    let stale = matching_sections(&children, date);
    debug!(page_id, date, children = children.len(), stale = stale.len(), "Listed page children");

    let mut report = ReconcileReport::default();
    for block in stale {
        match api.delete_block(&block.id).await {
            Ok(()) => report.evicted += 1,
            Err(e) => {
                warn!(page_id, date, block_id = %block.id, "Failed to delete stale section: {}", e);
                report.evict_failures += 1;
            }
        }
    }

    let mut first = blocks;
    let rest = first.split_off(first.len().min(MAX_CHILDREN_PER_APPEND));
    let created = api
        .append_children(page_id, &[date_section(date, first)])
        .await?;
    report.section_id = created.into_iter().next().map(|block| block.id);

    if !rest.is_empty() {
        let section_id = report
            .section_id
            .as_deref()
            .ok_or_else(|| Error::RemoteApi("append returned no id for the date section".to_string()))?;
        for chunk in rest.chunks(MAX_CHILDREN_PER_APPEND) {
            api.append_children(section_id, chunk).await?;
        }
        debug!(page_id, date, extra = rest.len(), "Appended remaining section children");
    }

    info!(
        page_id,
        date,
        evicted = report.evicted,
        evict_failures = report.evict_failures,
        "Date section reconciled"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notion::{FakeDocumentApi, FakeOp, HeadingLevel, MAX_TEXT_LEN};
    use crate::services::block_builder::build_day_blocks;
    use stretto_common::model::{Entry, NoteRecord};

    const DATE: &str = "2025-06-24";

    fn sections_for(api: &FakeDocumentApi, page: &str, date: &str) -> Vec<ContentBlock> {
        api.tree(page)
            .into_iter()
            .filter(|b| b.kind() == "toggle" && b.plain_text().trim() == date)
            .collect()
    }

    #[tokio::test]
    async fn test_appends_when_no_section_exists() {
        let api = FakeDocumentApi::new();
        let page = api.add_page("chop_op18");

        let report = reconcile(&api, &page, DATE, vec![ContentBlock::paragraph("x")], 100)
            .await
            .unwrap();

        assert_eq!(report.evicted, 0);
        assert!(report.section_id.is_some());
        let sections = sections_for(&api, &page, DATE);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].children(), &[ContentBlock::paragraph("x")]);
    }

    #[tokio::test]
    async fn test_replaces_existing_section() {
        let api = FakeDocumentApi::new();
        let page = api.add_page("chop_op18");
        api.seed_children(
            &page,
            &[
                ContentBlock::heading(HeadingLevel::Two, "Notes"),
                ContentBlock::toggle(format!(" {} ", DATE), vec![ContentBlock::paragraph("old")]),
                ContentBlock::toggle("2025-06-23", vec![ContentBlock::paragraph("yesterday")]),
            ],
        );

        let report = reconcile(&api, &page, DATE, vec![ContentBlock::paragraph("new")], 100)
            .await
            .unwrap();

        assert_eq!(report.evicted, 1);
        let sections = sections_for(&api, &page, DATE);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].children(), &[ContentBlock::paragraph("new")]);
        assert_eq!(sections_for(&api, &page, "2025-06-23").len(), 1);
        assert_eq!(api.tree(&page).len(), 3);
    }

    #[tokio::test]
    async fn test_twice_leaves_one_section() {
        let api = FakeDocumentApi::new();
        let page = api.add_page("chop_op18");
        let blocks = vec![ContentBlock::paragraph("same")];

        reconcile(&api, &page, DATE, blocks.clone(), 100).await.unwrap();
        reconcile(&api, &page, DATE, blocks, 100).await.unwrap();

        assert_eq!(sections_for(&api, &page, DATE).len(), 1);
        assert_eq!(api.block_count(), 2);
    }

    #[tokio::test]
    async fn test_match_is_exact_and_container_only() {
        let api = FakeDocumentApi::new();
        let page = api.add_page("chop_op18");
        api.seed_children(
            &page,
            &[
                ContentBlock::paragraph(DATE),
                ContentBlock::toggle("2025-06-24 (old)", vec![]),
                ContentBlock::Heading {
                    level: HeadingLevel::Three,
                    rich_text: vec![crate::notion::RichText::plain(DATE)],
                    toggleable: true,
                },
            ],
        );

        let report = reconcile(&api, &page, DATE, vec![], 100).await.unwrap();
        assert_eq!(report.evicted, 1);
        let kinds: Vec<&str> = api.tree(&page).iter().map(ContentBlock::kind).collect();
        assert_eq!(kinds, vec!["paragraph", "toggle", "toggle"]);
    }

    #[tokio::test]
    async fn test_failed_delete_still_appends() {
        let api = FakeDocumentApi::new();
        let page = api.add_page("chop_op18");
        api.seed_children(&page, &[ContentBlock::toggle(DATE, vec![])]);
        api.fail(FakeOp::DeleteBlock);

        let report = reconcile(&api, &page, DATE, vec![ContentBlock::paragraph("n")], 100)
            .await
            .unwrap();

        assert_eq!(report.evicted, 0);
        assert_eq!(report.evict_failures, 1);
        assert_eq!(sections_for(&api, &page, DATE).len(), 2);
    }

    #[tokio::test]
    async fn test_list_failure_is_fatal() {
        let api = FakeDocumentApi::new();
        let page = api.add_page("chop_op18");
        api.fail(FakeOp::ListChildren);

        let err = reconcile(&api, &page, DATE, vec![], 100).await.unwrap_err();
        assert!(matches!(err, Error::RemoteApi(_)));
        assert!(!api.calls().contains(&FakeOp::AppendChildren));
    }

    #[tokio::test]
    async fn test_append_failure_is_fatal() {
        let api = FakeDocumentApi::new();
        let page = api.add_page("chop_op18");
        api.fail(FakeOp::AppendChildren);

        assert!(reconcile(&api, &page, DATE, vec![], 100).await.is_err());
    }

    #[tokio::test]
    async fn test_only_first_page_of_children_is_seen() {
        let api = FakeDocumentApi::new();
        let page = api.add_page("chop_op18");
        api.seed_children(
            &page,
            &[ContentBlock::paragraph("filler"), ContentBlock::toggle(DATE, vec![])],
        );

        let report = reconcile(&api, &page, DATE, vec![], 1).await.unwrap();
        assert_eq!(report.evicted, 0);
        assert_eq!(sections_for(&api, &page, DATE).len(), 2);
    }

    fn long_day(entries: usize) -> Vec<ContentBlock> {
        let entry = Entry {
            content: "a".repeat(2500),
            teacher_questions: (1..=20).map(|i| format!("Question {}", i)).collect(),
            ..Default::default()
        };
        let note = NoteRecord {
            note_id: "n1".into(),
            piece_id: "chop_op18".into(),
            date: DATE.into(),
            time: Some("09:00".into()),
            duration_minutes: 45,
            entries: vec![entry; entries],
            metadata: Default::default(),
        };
        build_day_blocks(&[note])
    }

    #[tokio::test]
    async fn test_large_day_appended_in_chunks() {
        let api = FakeDocumentApi::new();
        let page = api.add_page("chop_op18");
        let blocks = long_day(5);
        assert!(blocks.len() > MAX_CHILDREN_PER_APPEND);

        let report = reconcile(&api, &page, DATE, blocks.clone(), 100).await.unwrap();
        assert!(report.section_id.is_some());

        let sections = sections_for(&api, &page, DATE);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].children(), blocks.as_slice());
        let appends = api.calls().iter().filter(|op| **op == FakeOp::AppendChildren).count();
        assert_eq!(appends, 2);

        reconcile(&api, &page, DATE, blocks.clone(), 100).await.unwrap();
        assert_eq!(sections_for(&api, &page, DATE).len(), 1);
        assert_eq!(api.block_count(), blocks.len() + 1);
    }

    #[tokio::test]
    async fn test_long_entry_text_accepted() {
        let api = FakeDocumentApi::new();
        let page = api.add_page("chop_op18");
        let blocks = long_day(4);
        assert!(blocks.len() <= MAX_CHILDREN_PER_APPEND);

        reconcile(&api, &page, DATE, blocks, 100).await.unwrap();

        let sections = sections_for(&api, &page, DATE);
        let content = sections[0]
            .children()
            .iter()
            .find(|b| b.kind() == "callout")
            .unwrap();
        assert_eq!(content.rich_text().len(), 2);
        assert!(content.rich_text().iter().all(|run| run.len() <= MAX_TEXT_LEN));
        assert_eq!(content.plain_text().len(), 2500);
    }

    #[tokio::test]
    async fn test_failed_chunk_append_is_fatal() {
        let api = FakeDocumentApi::new();
        let page = api.add_page("chop_op18");
        let mut blocks = vec![ContentBlock::spacer(); MAX_CHILDREN_PER_APPEND];
        blocks.push(ContentBlock::Paragraph {
            rich_text: vec![crate::notion::RichText::plain("y".repeat(MAX_TEXT_LEN + 1))],
            color: Default::default(),
        });

        let err = reconcile(&api, &page, DATE, blocks, 100).await.unwrap_err();
        assert!(matches!(err, Error::RemoteApi(_)));
    }
}
