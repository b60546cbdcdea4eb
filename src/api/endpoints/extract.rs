//! `POST /api/extract`: pasted text or photographed pages → case record.
//!
//! Images arrive as base64, optionally wrapped in a data URL. They are
//! decoded and size-checked here, read by the shared OCR worker, and the
//! joined text goes through the same pipeline as pasted text.

use axum::extract::State;
use axum::Json;
use base64::Engine;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, RequestLimits};
use crate::pipeline::processor::{process_with_audit, ProcessingOutcome};

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub text: Option<String>,
    /// Single base64 image or data URL.
    pub image: Option<String>,
    /// Several pages, in reading order.
    pub images: Option<Vec<String>>,
}

/// Where the document text comes from once the request is validated.
#[derive(Debug, PartialEq)]
enum DocumentSource {
    Text(String),
    Images(Vec<Vec<u8>>),
}

/// `POST /api/extract`: run the ingestion pipeline on one document.
pub async fn extract(
    State(ctx): State<ApiContext>,
    Json(payload): Json<ExtractRequest>,
) -> Result<Json<ProcessingOutcome>, ApiError> {
    let request_id = Uuid::new_v4();

    let text = match resolve_source(payload, &ctx.limits)? {
        DocumentSource::Text(text) => text,
        DocumentSource::Images(images) => {
            tracing::info!(%request_id, pages = images.len(), "Acquiring text from images");
            ctx.acquisition.extract_text(images).await?
        }
    };

    let chars = text.chars().count();
    let (outcome, redaction) = tokio::task::spawn_blocking(move || process_with_audit(&text))
        .await
        .map_err(|e| ApiError::Internal(format!("Pipeline task failed: {e}")))?;

    tracing::info!(
        %request_id,
        chars,
        document_type = %outcome.document_type,
        fields = outcome.auto_filled_fields.len(),
        redactions = redaction.redacted_items.len(),
        "Document extracted"
    );
    tracing::debug!(%request_id, redacted = %redaction.redacted_text, "Redacted source");

    Ok(Json(outcome))
}

/// Validate the payload shape and limits without running the pipeline.
fn resolve_source(
    payload: ExtractRequest,
    limits: &RequestLimits,
) -> Result<DocumentSource, ApiError> {
    let mut encoded: Vec<String> = payload.image.into_iter().collect();
    let images_field_present = payload.images.is_some();
    encoded.extend(payload.images.unwrap_or_default());

    let text = payload.text.filter(|t| !t.trim().is_empty());

    match (text, encoded.is_empty()) {
        (Some(_), false) => Err(ApiError::BadRequest(
            "Supply either text or images, not both".into(),
        )),
        (Some(text), true) => Ok(DocumentSource::Text(text)),
        (None, true) if images_field_present => {
            Err(ApiError::BadRequest("Image list is empty".into()))
        }
        (None, true) => Err(ApiError::BadRequest(
            "Request must contain non-empty text or at least one image".into(),
        )),
        (None, false) => decode_images(&encoded, limits).map(DocumentSource::Images),
    }
}

fn decode_images(encoded: &[String], limits: &RequestLimits) -> Result<Vec<Vec<u8>>, ApiError> {
    if encoded.len() > limits.max_images {
        return Err(ApiError::BadRequest(format!(
            "Maximum {} images per request",
            limits.max_images
        )));
    }

    encoded
        .iter()
        .enumerate()
        .map(|(index, data)| {
            let bytes = decode_data_url(data).map_err(|e| {
                ApiError::BadRequest(format!("Invalid image data for page {}: {e}", index + 1))
            })?;
            if bytes.is_empty() {
                return Err(ApiError::BadRequest(format!("Page {} is empty", index + 1)));
            }
            if bytes.len() > limits.max_image_bytes {
                return Err(ApiError::BadRequest(format!(
                    "Page {} exceeds the {} byte size limit ({} bytes)",
                    index + 1,
                    limits.max_image_bytes,
                    bytes.len()
                )));
            }
            Ok(bytes)
        })
        .collect()
}

/// Decode a base64 data URL to raw bytes.
///
/// Handles both `data:image/jpeg;base64,...` and raw base64 strings.
fn decode_data_url(data_url: &str) -> Result<Vec<u8>, String> {
    let base64_data = match data_url.find(',') {
        Some(idx) => &data_url[idx + 1..],
        None => data_url,
    };

    base64::engine::general_purpose::STANDARD
        .decode(base64_data.trim())
        .map_err(|e| format!("Base64 decode failed: {e}"))
}
