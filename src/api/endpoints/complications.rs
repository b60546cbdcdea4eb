//! `POST /api/complications`: complications projection of the pipeline.

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::pipeline::processor::process;

#[derive(Debug, Deserialize)]
pub struct ComplicationsRequest {
    pub text: String,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplicationsResponse {
    pub has_complications: bool,
    pub complications: Vec<String>,
}

/// `POST /api/complications`: text only; reports complications found by
/// the same extraction that backs `/api/extract`.
pub async fn detect(
    Json(payload): Json<ComplicationsRequest>,
) -> Result<Json<ComplicationsResponse>, ApiError> {
    if payload.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Request must contain non-empty text".into()));
    }

    let text = payload.text;
    let outcome = tokio::task::spawn_blocking(move || process(&text))
        .await
        .map_err(|e| ApiError::Internal(format!("Pipeline task failed: {e}")))?;

    let response = project(outcome.extracted_data.complications);
    tracing::info!(
        found = response.complications.len(),
        "Complications projection served"
    );
    Ok(Json(response))
}

/// Absent and explicitly-none both report no complications.
fn project(found: Option<Vec<String>>) -> ComplicationsResponse {
    let list = found.unwrap_or_default();
    ComplicationsResponse {
        has_complications: !list.is_empty(),
        complications: list,
    }
}
