//! Text acquisition: images → raw text through a single shared OCR worker.

pub mod ocr;
pub mod sanitize;
pub mod types;
pub mod worker;

pub use ocr::*;
pub use sanitize::*;
pub use types::*;
pub use worker::*;

use std::path::PathBuf;

use thiserror::Error;

/// Separator placed between the text of consecutive images.
pub const PAGE_SEPARATOR: &str = "\n\n---\n\n";

/// Failures of the OCR backend. Cloneable so one construction failure can be
/// delivered to every caller waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    #[error("OCR engine initialization failed: {0}")]
    EngineInit(String),

    #[error("Tessdata not found at: {0}")]
    TessdataNotFound(PathBuf),

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("OCR worker unavailable: {0}")]
    WorkerUnavailable(String),

    #[error("No images supplied for text acquisition")]
    NoImages,
}
