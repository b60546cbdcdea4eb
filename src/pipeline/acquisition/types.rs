use super::AcquisitionError;

/// Raw OCR result for one image.
#[derive(Debug, Clone)]
pub struct OcrPageResult {
    pub text: String,
    /// Mean recognition confidence, 0.0–1.0.
    pub confidence: f32,
}

/// OCR engine abstraction (allows mocking for tests).
pub trait OcrEngine: Send + Sync {
    fn ocr_image(&self, image_bytes: &[u8]) -> Result<OcrPageResult, AcquisitionError>;
}

/// Builds the shared OCR worker. Construction is assumed expensive and
/// blocking; it is only ever run off the async executor.
pub trait OcrEngineFactory: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    fn create(&self) -> Result<Box<dyn OcrEngine>, AcquisitionError>;
}
