use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Caselog";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bind address for the ingestion service.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

/// Default Tesseract language string.
pub const DEFAULT_OCR_LANG: &str = "eng";

/// Maximum images accepted in one extraction request.
pub const DEFAULT_MAX_IMAGES: usize = 10;

/// Maximum decoded size of a single image (8 MB).
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

/// Default `tracing` filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> String {
    "caselog=info,caselog_lib=info,tower_http=warn".to_string()
}

/// Runtime configuration for the HTTP service, read from `CASELOG_*` variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    /// Directory holding `*.traineddata`. Only used with the `ocr` feature.
    pub tessdata_dir: Option<PathBuf>,
    pub ocr_lang: String,
    pub max_images: usize,
    pub max_image_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8787))),
            tessdata_dir: None,
            ocr_lang: DEFAULT_OCR_LANG.to_string(),
            max_images: DEFAULT_MAX_IMAGES,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl ServiceConfig {
    /// Build from the process environment, falling back to defaults for
    /// unset or unparseable values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let bind_addr = match lookup("CASELOG_BIND") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid CASELOG_BIND, using default");
                defaults.bind_addr
            }),
            None => defaults.bind_addr,
        };

        Self {
            bind_addr,
            tessdata_dir: lookup("CASELOG_TESSDATA")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            ocr_lang: lookup("CASELOG_OCR_LANG")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.ocr_lang),
            max_images: parse_limit(lookup("CASELOG_MAX_IMAGES"), defaults.max_images),
            max_image_bytes: parse_limit(
                lookup("CASELOG_MAX_IMAGE_BYTES"),
                defaults.max_image_bytes,
            ),
        }
    }
}

fn parse_limit(raw: Option<String>, default: usize) -> usize {
    raw.and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn app_name_is_caselog() {
        assert_eq!(APP_NAME, "Caselog");
    }

    #[test]
    fn defaults_when_environment_empty() {
        let config = ServiceConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.ocr_lang, "eng");
        assert!(config.tessdata_dir.is_none());
        assert_eq!(config.max_images, DEFAULT_MAX_IMAGES);
        assert_eq!(config.max_image_bytes, DEFAULT_MAX_IMAGE_BYTES);
    }

    #[test]
    fn reads_overrides() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("CASELOG_BIND", "0.0.0.0:9000"),
            ("CASELOG_TESSDATA", "/usr/share/tessdata"),
            ("CASELOG_OCR_LANG", "eng+mri"),
            ("CASELOG_MAX_IMAGES", "3"),
        ]));
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(
            config.tessdata_dir.as_deref(),
            Some(std::path::Path::new("/usr/share/tessdata"))
        );
        assert_eq!(config.ocr_lang, "eng+mri");
        assert_eq!(config.max_images, 3);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("CASELOG_BIND", "not-an-address"),
            ("CASELOG_MAX_IMAGES", "0"),
            ("CASELOG_MAX_IMAGE_BYTES", "lots"),
        ]));
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.max_images, DEFAULT_MAX_IMAGES);
        assert_eq!(config.max_image_bytes, DEFAULT_MAX_IMAGE_BYTES);
    }

    #[test]
    fn log_filter_targets_crate() {
        assert!(default_log_filter().contains("caselog"));
    }
}
