//! Practice-log handlers
//!
//! - `POST /practice-logs`: upsert by `note_id` into the Note Store
//! - `POST /practice-notes`: plain insert, no deduplication
//! - `POST /practice-logs/sync`: upsert, then mirror the day onto the piece's page
//! - `GET /practice-logs/:piece_id/:date`: the aggregated day

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use stretto_common::time::is_calendar_date;
use stretto_common::validation::{validate_practice_log, NoteIdPolicy};
use tracing::info;

use super::parse_payload;
use crate::error::{ApiError, ApiResult};
use crate::services::{aggregate, mirror_day, SecondaryResult, TwoPhaseOutcome};
use crate::AppState;

const STORE_FAILED: &str = "Store operation failed";
const INSERT_FAILED: &str = "Failed to insert practice log";
pub(crate) const MIRROR_DISABLED: &str = "Remote document API not configured";

/// POST /practice-logs
pub async fn upsert_practice_log(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Value>> {
    let payload = parse_payload(&body)?;
    let record = validate_practice_log(&payload, NoteIdPolicy::Required).map_err(ApiError::Validation)?;

    info!(note_id = %record.note_id, piece_id = %record.piece_id, "Writing practice log");
    let summary = state
        .store
        .upsert_log(&record)
        .await
        .map_err(|e| ApiError::from_common(e, STORE_FAILED))?;

    Ok(Json(json!({
        "message": "Note processed in store",
        "store": summary,
        "note": record,
    })))
}

/// POST /practice-notes
pub async fn save_practice_note(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Value>> {
    let payload = parse_payload(&body)?;
    let record = validate_practice_log(&payload, NoteIdPolicy::Generate).map_err(ApiError::Validation)?;

    let inserted_id = state
        .store
        .insert_log(&record)
        .await
        .map_err(|e| ApiError::from_common(e, INSERT_FAILED))?;

    info!(note_id = %record.note_id, inserted_id = %inserted_id, "Practice note saved");
    Ok(Json(json!({
        "message": "Practice note saved",
        "inserted_id": inserted_id,
        "note_id": record.note_id,
    })))
}

/// POST /practice-logs/sync
///
/// The store write is the primary phase and aborts the request on failure.
/// The mirror is secondary: its failure turns the response into 202.
pub async fn sync_practice_log(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let payload = parse_payload(&body)?;
    let record = validate_practice_log(&payload, NoteIdPolicy::Generate).map_err(ApiError::Validation)?;

    let summary = state
        .store
        .upsert_log(&record)
        .await
        .map_err(|e| ApiError::from_common(e, STORE_FAILED))?;

    let outcome = match &state.documents {
        Some(api) => {
            let mirror = mirror_day(
                state.store.as_ref(),
                api.as_ref(),
                &record,
                state.children_page_size,
            );
            TwoPhaseOutcome::after(summary, mirror).await
        }
        None => TwoPhaseOutcome::skipped(summary, MIRROR_DISABLED),
    };

    let (status, message) = match &outcome.secondary {
        SecondaryResult::Succeeded(_) => (StatusCode::OK, "Note stored and mirrored"),
        SecondaryResult::Skipped { .. } => (StatusCode::OK, "Note stored; mirror skipped"),
        SecondaryResult::Failed { .. } => (StatusCode::ACCEPTED, "Note stored; mirror failed"),
    };
    info!(
        note_id = %record.note_id,
        piece_id = %record.piece_id,
        date = %record.date,
        degraded = outcome.is_degraded(),
        "{}",
        message
    );

    Ok((
        status,
        Json(json!({
            "message": message,
            "note_id": record.note_id,
            "store": outcome.primary,
            "mirror": outcome.secondary,
        })),
    ))
}

/// GET /practice-logs/:piece_id/:date
pub async fn get_practice_day(
    State(state): State<AppState>,
    Path((piece_id, date)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    if !is_calendar_date(&date) {
        return Err(ApiError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", date)));
    }

    let notes = aggregate(state.store.as_ref(), &piece_id, &date)
        .await
        .map_err(|e| ApiError::from_common(e, STORE_FAILED))?;

    Ok(Json(json!({
        "piece_id": piece_id,
        "date": date,
        "notes": notes,
    })))
}
