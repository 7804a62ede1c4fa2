//! Reconcile-only endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use stretto_common::time::is_calendar_date;
use tracing::info;

use super::practice_logs::MIRROR_DISABLED;
use crate::error::{ApiError, ApiResult};
use crate::services::sync_day;
use crate::AppState;

/// POST /sync/:piece_id/:date
///
/// Rebuilds the day's section from stored notes. The page must already
/// exist; it is never created here.
pub async fn sync_date_section(
    State(state): State<AppState>,
    Path((piece_id, date)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    if !is_calendar_date(&date) {
        return Err(ApiError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", date)));
    }
    let Some(api) = state.documents.as_ref() else {
        return Err(ApiError::internal(MIRROR_DISABLED, "notion_api_key or repertoire_db_id missing"));
    };

    let report = sync_day(
        state.store.as_ref(),
        api.as_ref(),
        &piece_id,
        &date,
        state.children_page_size,
    )
    .await
    .map_err(|e| ApiError::from_common(e, "Sync failed"))?;

    info!(piece_id = %piece_id, date = %date, page_id = %report.page_id, "Section synced");
    Ok(Json(json!({
        "message": "Date section reconciled",
        "page_id": report.page_id,
        "date": date,
        "notes": report.notes,
        "evicted": report.reconcile.evicted,
        "evict_failures": report.reconcile.evict_failures,
    })))
}
