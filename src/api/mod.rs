//! HTTP API for the ingestion service.
//!
//! Routes are nested under `/api/`:
//! - `POST /api/extract`: text or base64 images → processing outcome
//! - `POST /api/complications`: text → complications projection
//! - `GET /api/health`: liveness and OCR worker readiness

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use types::ApiContext;
