use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use inferq_job_queue::{JobId, JobState};

use crate::{error::ApiError, state::AppState};

/// GET /api/v1/results/{id}
/// Report the status of a job, with its result or error once terminal.
///
/// Terminal states answer 200; a job still in flight answers 202 so clients
/// keep polling. An unrecognized or unparseable id is a plain 404 and never
/// distinguishable from a never-issued one.
pub async fn get(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let id: JobId = id
        .parse()
        .map_err(|_| ApiError::not_found("invalid job ID"))?;

    let job = state
        .store
        .get(id)
        .await
        .ok_or_else(|| ApiError::not_found("invalid job ID"))?;

    let mut body = json!({ "status": job.state.to_string() });
    let status = match job.state {
        JobState::Completed => {
            body["result"] = json!(job.result);
            StatusCode::OK
        }
        JobState::Failed => {
            body["error"] = json!(job.error);
            StatusCode::OK
        }
        JobState::Queued | JobState::Running => StatusCode::ACCEPTED,
    };

    Ok((status, Json(body)))
}
