use std::sync::Mutex;

use super::types::{OcrEngine, OcrEngineFactory, OcrPageResult};
use super::AcquisitionError;

/// One loaded engine handle, reused for every page. A page that fails
/// drops the handle; the next page loads a fresh one.
#[cfg_attr(not(feature = "ocr"), allow(dead_code))]
struct LoadedHandle<H> {
    slot: Mutex<Option<H>>,
}

#[cfg_attr(not(feature = "ocr"), allow(dead_code))]
impl<H> LoadedHandle<H> {
    fn new(handle: H) -> Self {
        Self {
            slot: Mutex::new(Some(handle)),
        }
    }

    /// Run `page` with the loaded handle, loading one first if a previous
    /// page lost it. `page` hands the handle back on success.
    fn with_handle<R>(
        &self,
        load: impl FnOnce() -> Result<H, AcquisitionError>,
        page: impl FnOnce(H) -> Result<(H, R), AcquisitionError>,
    ) -> Result<R, AcquisitionError> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|_| AcquisitionError::WorkerUnavailable("OCR handle lock poisoned".into()))?;
        let handle = match guard.take() {
            Some(handle) => handle,
            None => load()?,
        };
        let (handle, result) = page(handle)?;
        *guard = Some(handle);
        Ok(result)
    }
}

/// Tesseract OCR engine.
/// Only available when compiled with the `ocr` feature flag.
#[cfg(feature = "ocr")]
pub struct TesseractEngine {
    tessdata_dir: std::path::PathBuf,
    lang: String,
    handle: LoadedHandle<tesseract::Tesseract>,
}

#[cfg(feature = "ocr")]
impl TesseractEngine {
    /// Validate the tessdata directory and load the language data once. The
    /// loaded handle is kept for every later page.
    pub fn new(tessdata_dir: &std::path::Path, lang: &str) -> Result<Self, AcquisitionError> {
        let primary = lang.split('+').next().unwrap_or("eng");
        if !tessdata_dir.join(format!("{primary}.traineddata")).exists() {
            return Err(AcquisitionError::TessdataNotFound(tessdata_dir.to_path_buf()));
        }

        let handle = load_tesseract(tessdata_dir, lang)?;
        tracing::info!(lang = %lang, "Tesseract language data loaded");
        Ok(Self {
            tessdata_dir: tessdata_dir.to_path_buf(),
            lang: lang.to_string(),
            handle: LoadedHandle::new(handle),
        })
    }
}

#[cfg(feature = "ocr")]
fn load_tesseract(
    tessdata_dir: &std::path::Path,
    lang: &str,
) -> Result<tesseract::Tesseract, AcquisitionError> {
    let tessdata_str = tessdata_dir
        .to_str()
        .ok_or_else(|| AcquisitionError::EngineInit("Invalid tessdata path".into()))?;

    tesseract::Tesseract::new(Some(tessdata_str), Some(lang))
        .map_err(|e| AcquisitionError::EngineInit(format!("{e:?}")))
}

#[cfg(feature = "ocr")]
impl OcrEngine for TesseractEngine {
    fn ocr_image(&self, image_bytes: &[u8]) -> Result<OcrPageResult, AcquisitionError> {
        self.handle.with_handle(
            || load_tesseract(&self.tessdata_dir, &self.lang),
            |tess| {
                let mut tess = tess
                    .set_image_from_mem(image_bytes)
                    .map_err(|e| AcquisitionError::OcrProcessing(format!("{e:?}")))?;

                let text = tess
                    .get_text()
                    .map_err(|e| AcquisitionError::OcrProcessing(format!("{e:?}")))?;

                let confidence = tess.mean_text_conf().max(0) as f32 / 100.0;

                Ok((tess, OcrPageResult { text, confidence }))
            },
        )
    }
}

/// Factory for the Tesseract worker.
#[cfg(feature = "ocr")]
pub struct TesseractFactory {
    pub tessdata_dir: std::path::PathBuf,
    pub lang: String,
}

#[cfg(feature = "ocr")]
impl OcrEngineFactory for TesseractFactory {
    fn backend(&self) -> &'static str {
        "tesseract"
    }

    fn create(&self) -> Result<Box<dyn OcrEngine>, AcquisitionError> {
        Ok(Box::new(TesseractEngine::new(&self.tessdata_dir, &self.lang)?))
    }
}

/// Stand-in used when no OCR backend is configured. Every construction
/// fails, so image requests surface an acquisition error while text
/// requests keep working.
pub struct UnavailableOcrFactory {
    pub reason: String,
}

impl UnavailableOcrFactory {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl OcrEngineFactory for UnavailableOcrFactory {
    fn backend(&self) -> &'static str {
        "unavailable"
    }

    fn create(&self) -> Result<Box<dyn OcrEngine>, AcquisitionError> {
        Err(AcquisitionError::EngineInit(self.reason.clone()))
    }
}

/// Mock OCR engine for unit testing without Tesseract.
pub struct MockOcrEngine {
    /// Fixed text to return. `None` echoes the image bytes as UTF-8.
    pub text: Option<String>,
    pub confidence: f32,
}

impl MockOcrEngine {
    pub fn new(text: &str, confidence: f32) -> Self {
        Self {
            text: Some(text.to_string()),
            confidence,
        }
    }

    /// Returns each image's bytes decoded as text, so tests can "photograph"
    /// a document by sending its text.
    pub fn echo() -> Self {
        Self {
            text: None,
            confidence: 1.0,
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn ocr_image(&self, image_bytes: &[u8]) -> Result<OcrPageResult, AcquisitionError> {
        let text = match &self.text {
            Some(text) => text.clone(),
            None => String::from_utf8_lossy(image_bytes).into_owned(),
        };
        Ok(OcrPageResult {
            text,
            confidence: self.confidence,
        })
    }
}

/// Factory producing an echoing [`MockOcrEngine`].
pub struct MockOcrFactory;

impl OcrEngineFactory for MockOcrFactory {
    fn backend(&self) -> &'static str {
        "mock"
    }

    fn create(&self) -> Result<Box<dyn OcrEngine>, AcquisitionError> {
        Ok(Box::new(MockOcrEngine::echo()))
    }
}
