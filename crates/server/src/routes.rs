//! Request dispatch
//!
//! The whole URL path is a store path, so instead of a route table there
//! is a single fallback handler that switches on the method:
//!
//! | Method | Store operation | Success | Missing |
//! |--------|-----------------|---------|---------|
//! | GET    | `get(path)` (root: `snapshot`) | 200 value | 404 |
//! | POST   | `create(path, body)` | 201 stamped doc | — |
//! | PUT    | `set(path, body)` | 200 body | — |
//! | PATCH  | `merge(path, patch)` | 200 doc | 404 |
//! | DELETE | `delete(path)` | 200 `{"success":true}` | 404 |

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use phonebase_core::StorePath;
use serde_json::{json, Value};
use tracing::info;

/// Parse the request body as JSON, treating an empty body as `null`
fn parse_body(bytes: &Bytes) -> Result<Value, ApiError> {
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).map_err(|_| ApiError::MalformedBody)
}

/// The single dispatch handler behind every path
pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Result<Response, ApiError> {
    let path: StorePath = uri
        .path()
        .parse()
        .map_err(|e: phonebase_core::PathParseError| ApiError::BadRequest(e.to_string()))?;

    info!(%method, path = %path, "request");

    match method {
        Method::GET => handle_get(&state, &path),
        Method::POST => handle_post(&state, &path, parse_body(&body)?),
        Method::PUT => handle_put(&state, &path, parse_body(&body)?),
        Method::PATCH => handle_patch(&state, &path, parse_body(&body)?),
        Method::DELETE => handle_delete(&state, &path),
        _ => Err(ApiError::BadRequest(format!(
            "method {} not supported",
            method
        ))),
    }
}

fn handle_get(state: &AppState, path: &StorePath) -> Result<Response, ApiError> {
    // Root returns the full data set, the original "data snapshot"
    if path.is_root() {
        let snapshot = state.store.snapshot()?;
        return Ok(Json(snapshot).into_response());
    }
    match state.store.get(path)? {
        Some(value) => Ok(Json(value).into_response()),
        None => Err(ApiError::NotFound),
    }
}

fn handle_post(state: &AppState, path: &StorePath, body: Value) -> Result<Response, ApiError> {
    let doc = state.store.create(path, body)?;
    Ok((StatusCode::CREATED, Json(doc)).into_response())
}

fn handle_put(state: &AppState, path: &StorePath, body: Value) -> Result<Response, ApiError> {
    state.store.set(path, body.clone())?;
    Ok(Json(body).into_response())
}

fn handle_patch(state: &AppState, path: &StorePath, patch: Value) -> Result<Response, ApiError> {
    match state.store.merge(path, patch)? {
        Some(doc) => Ok(Json(doc).into_response()),
        None => Err(ApiError::NotFound),
    }
}

fn handle_delete(state: &AppState, path: &StorePath) -> Result<Response, ApiError> {
    if state.store.delete(path)? {
        Ok(Json(json!({"success": true})).into_response())
    } else {
        Err(ApiError::NotFound)
    }
}
