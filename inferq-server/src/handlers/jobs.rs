use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Query};
use axum::Json;
use serde_json::{json, Value};

use crate::{error::ApiError, state::AppState};

fn parse_positive_usize(
    raw: Option<&String>,
    default: usize,
    name: &str,
) -> Result<usize, ApiError> {
    match raw {
        None => Ok(default),
        Some(s) => match s.parse::<usize>() {
            Ok(v) if v > 0 => Ok(v),
            _ => Err(ApiError::bad_request(format!(
                "{name} must be a positive integer"
            ))),
        },
    }
}

/// GET /api/v1/jobs
/// List recent jobs with pagination, most recent first. Debug surface.
pub async fn list(
    Extension(state): Extension<Arc<AppState>>,
    query: Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let params = query.0;
    let page = parse_positive_usize(params.get("page"), 1, "page")?;
    let per_page = parse_positive_usize(params.get("perPage"), 20, "perPage")?;
    let offset = (page - 1) * per_page;

    let total = state.store.count().await;
    let jobs = state.store.list(per_page, offset).await;

    let items: Vec<Value> = jobs
        .into_iter()
        .map(|job| {
            json!({
                "id": job.id,
                "status": job.state.to_string(),
                "submittedAt": job.submitted_at.to_rfc3339(),
                "finishedAt": job.finished_at.map(|dt| dt.to_rfc3339()),
            })
        })
        .collect();

    Ok(Json(json!({
        "items": items,
        "pagination": {
            "page": page,
            "perPage": per_page,
            "total": total,
        }
    })))
}
