//! Repertoire record creation

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use stretto_common::time::now_iso;
use stretto_common::validation::validate_repertoire;
use tracing::info;

use super::parse_payload;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const CREATE_FAILED: &str = "Failed to create repertoire";

fn duplicate(rep_id: &str) -> ApiError {
    ApiError::Conflict(format!("Repertoire with rep_id '{}' already exists", rep_id))
}

/// POST /repertoire
///
/// Rejects a `rep_id` that already exists with 409.
pub async fn create_repertoire(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let payload = parse_payload(&body)?;
    let repertoire = validate_repertoire(&payload).map_err(ApiError::Validation)?;
    let rep_id = repertoire.rep_id.clone();

    let existing = state
        .store
        .find_repertoire(&rep_id)
        .await
        .map_err(|e| ApiError::from_common(e, CREATE_FAILED))?;
    if existing.is_some() {
        return Err(duplicate(&rep_id));
    }

    let mut document = serde_json::to_value(&repertoire).map_err(|e| ApiError::internal(CREATE_FAILED, e))?;
    let now = now_iso();
    document["created_at"] = json!(now);
    document["updated_at"] = json!(now);

    // Another writer can take the rep_id between the lookup and the insert
    let id = match state.store.insert_repertoire(&rep_id, &document).await {
        Ok(id) => id,
        Err(stretto_common::Error::Conflict(_)) => return Err(duplicate(&rep_id)),
        Err(e) => return Err(ApiError::from_common(e, CREATE_FAILED)),
    };

    info!(rep_id = %rep_id, id = %id, "Repertoire created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "id": id, "rep_id": rep_id })),
    ))
}
