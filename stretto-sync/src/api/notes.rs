//! Session note creation

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use stretto_common::time::now_iso;
use stretto_common::validation::validate_session_note;
use tracing::info;

use super::parse_payload;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const CREATE_FAILED: &str = "Failed to create note";

/// POST /notes
///
/// Validates a session note, stamps `created_at`/`updated_at` and stores it.
pub async fn create_note(State(state): State<AppState>, body: Bytes) -> ApiResult<(StatusCode, Json<Value>)> {
    let payload = parse_payload(&body)?;
    let note = validate_session_note(&payload).map_err(ApiError::Validation)?;

    let mut document = serde_json::to_value(&note).map_err(|e| ApiError::internal(CREATE_FAILED, e))?;
    let now = now_iso();
    document["created_at"] = json!(now);
    document["updated_at"] = json!(now);

    let id = state
        .store
        .insert_note(&note.rep_id, &document)
        .await
        .map_err(|e| ApiError::from_common(e, CREATE_FAILED))?;

    info!(rep_id = %note.rep_id, id = %id, entries = note.entries.len(), "Session note created");
    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "id": id }))))
}
