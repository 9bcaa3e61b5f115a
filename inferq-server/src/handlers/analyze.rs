use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use crate::{error::ApiError, state::AppState};

/// POST /api/v1/analyze
/// Accept a `(prompt, input)` pair and enqueue it for processing.
pub async fn submit(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let prompt = payload
        .get("prompt")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::bad_request("invalid request payload: missing prompt"))?;
    let input = payload
        .get("input")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::bad_request("invalid request payload: missing input"))?;

    let job = state.submit(prompt, input).await?;
    info!(job_id = %job.id, "job submitted");

    Ok((StatusCode::ACCEPTED, Json(json!({ "job_id": job.id }))))
}
