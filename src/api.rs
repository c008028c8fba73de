//! Shared HTTP plumbing for the action-multiplexed RPC surface.
//!
//! Both the node service and the router expose the same wire contract:
//! requests POST to the root endpoint with an `X-Amz-Target` header whose
//! segment after the dot names the operation, and errors come back as the
//! JSON envelope from `crate::error` with a kind-specific status. The
//! helpers here keep the two services byte-compatible.

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, ErrorBody, Result};
use crate::storage::protocol::TARGET_HEADER;

/// Extracts the action name from the target header, e.g.
/// `DynamoDB_20120810.PutItem` → `PutItem`.
pub fn extract_action(headers: &HeaderMap) -> Result<String> {
    let target = headers
        .get(TARGET_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Error::InvalidRequest("missing X-Amz-Target header".to_string()))?;
    Ok(target.rsplit('.').next().unwrap_or(target).to_string())
}

/// Deserializes a request body, mapping malformed JSON to a 400.
pub fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| Error::InvalidRequest(format!("invalid request body: {}", e)))
}

/// A 200 response with a JSON body.
pub fn ok_response<T: Serialize>(value: T) -> Response {
    (StatusCode::OK, Json(value)).into_response()
}

/// The error envelope with the kind-specific status.
pub fn error_response(err: &Error) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorBody::from(err))).into_response()
}
