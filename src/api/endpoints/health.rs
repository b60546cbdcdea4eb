//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;
use crate::pipeline::acquisition::WorkerStatus;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Whether the OCR worker is constructed and idle-ready.
    pub ocr_ready: bool,
    pub ocr_backend: &'static str,
}

/// `GET /api/health`: liveness plus OCR worker readiness. Never starts
/// the worker.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        ocr_ready: ctx.acquisition.status() == WorkerStatus::Ready,
        ocr_backend: ctx.acquisition.backend(),
    })
}
