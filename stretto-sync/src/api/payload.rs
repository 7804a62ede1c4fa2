//! Request body decoding
//!
//! Callers send either a JSON object or a JSON string whose content is the
//! object (the shape produced by gateway proxies). Both decode to the same
//! value.

use serde_json::Value;

use crate::error::{ApiError, ApiResult};

const INVALID_JSON: &str = "Invalid JSON in request body";

/// Decode a request body into a JSON value, unwrapping one level of string
pub fn parse_payload(body: &[u8]) -> ApiResult<Value> {
    let value: Value =
        serde_json::from_slice(body).map_err(|_| ApiError::BadRequest(INVALID_JSON.to_string()))?;

    match value {
        Value::String(inner) => {
            serde_json::from_str(&inner).map_err(|_| ApiError::BadRequest(INVALID_JSON.to_string()))
        }
        other => Ok(other),
    }
}
