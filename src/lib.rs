pub mod api;
pub mod config;
pub mod models;
pub mod pipeline;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::server::start_api_server;
use crate::api::types::{ApiContext, RequestLimits};
use crate::config::ServiceConfig;
use crate::pipeline::acquisition::{OcrEngineFactory, TextAcquisition, UnavailableOcrFactory};

/// Run the ingestion service until Ctrl-C.
pub async fn run() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = ServiceConfig::from_env();
    let acquisition = Arc::new(TextAcquisition::new(build_ocr_factory(&config)));
    let ctx = ApiContext::new(Arc::clone(&acquisition), RequestLimits::from(&config));

    let mut server = start_api_server(ctx, config.bind_addr).await?;
    tracing::info!(addr = %server.addr, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }

    server.shutdown().await;
    acquisition.shutdown();
    Ok(())
}

/// Pick the OCR backend, respecting feature flags. Without a usable
/// backend, text requests still work and image requests fail cleanly.
fn build_ocr_factory(config: &ServiceConfig) -> Arc<dyn OcrEngineFactory> {
    #[cfg(feature = "ocr")]
    {
        match find_tessdata_dir(config) {
            Some(tessdata_dir) => {
                tracing::info!(tessdata = %tessdata_dir.display(), lang = %config.ocr_lang, "Tesseract OCR configured");
                return Arc::new(crate::pipeline::acquisition::TesseractFactory {
                    tessdata_dir,
                    lang: config.ocr_lang.clone(),
                });
            }
            None => tracing::warn!("Tesseract data not found, images will not be OCR'd"),
        }
    }

    #[cfg(not(feature = "ocr"))]
    {
        if config.tessdata_dir.is_some() {
            tracing::warn!("CASELOG_TESSDATA is set but this build has no OCR support");
        }
    }

    tracing::info!("Image OCR unavailable");
    Arc::new(UnavailableOcrFactory::new(
        "no OCR backend configured; set CASELOG_TESSDATA and build with the `ocr` feature",
    ))
}

/// Locate a tessdata directory holding the primary language model: the
/// configured directory, then `TESSDATA_PREFIX`, then common system paths.
#[cfg(feature = "ocr")]
fn find_tessdata_dir(config: &ServiceConfig) -> Option<std::path::PathBuf> {
    use std::path::PathBuf;

    let primary = config.ocr_lang.split('+').next().unwrap_or("eng");
    let model = format!("{primary}.traineddata");

    let candidates = config
        .tessdata_dir
        .clone()
        .into_iter()
        .chain(std::env::var("TESSDATA_PREFIX").ok().map(PathBuf::from))
        .chain(
            [
                "/usr/share/tesseract-ocr/5/tessdata",
                "/usr/share/tesseract-ocr/4.00/tessdata",
                "/usr/share/tessdata",
                "/usr/local/share/tessdata",
                "/opt/homebrew/share/tessdata",
            ]
            .into_iter()
            .map(PathBuf::from),
        );

    for dir in candidates {
        if dir.join(&model).exists() {
            return Some(dir);
        }
    }
    None
}
