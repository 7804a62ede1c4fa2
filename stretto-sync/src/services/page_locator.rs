//! Document Page Locator

use stretto_common::{Error, NoteRecord, Result};
use tracing::info;

use crate::notion::{page_properties, DocumentApi, PageRef};

/// Page for `piece_id`; a missing page is `NotFound`
pub async fn locate_page(api: &dyn DocumentApi, piece_id: &str) -> Result<PageRef> {
    api.find_page_by_key(piece_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("No page found for piece_id {}", piece_id)))
}

/// Page for the record's piece, created from its metadata when absent
///
/// Returns the page and whether it was created by this call.
pub async fn locate_or_create_page(api: &dyn DocumentApi, record: &NoteRecord) -> Result<(PageRef, bool)> {
    if let Some(page) = api.find_page_by_key(&record.piece_id).await? {
        return Ok((page, false));
    }

    let page = api
        .create_page(page_properties(&record.piece_id, &record.metadata))
        .await?;
    info!(piece_id = %record.piece_id, page_id = %page.id, "Created repertoire page");
    Ok((page, true))
}
