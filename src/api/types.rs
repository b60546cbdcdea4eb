//! Shared types for the API layer.

use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::pipeline::acquisition::TextAcquisition;

/// Upper bounds applied to request payloads before the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    pub max_images: usize,
    pub max_image_bytes: usize,
}

impl RequestLimits {
    /// Largest request body the limits allow: every image at its maximum
    /// size as base64, plus room for the JSON envelope.
    pub fn max_body_bytes(&self) -> usize {
        const ENVELOPE_BYTES: usize = 64 * 1024;
        let encoded_image = self.max_image_bytes.div_ceil(3) * 4;
        self.max_images
            .saturating_mul(encoded_image)
            .saturating_add(ENVELOPE_BYTES)
    }
}

impl From<&ServiceConfig> for RequestLimits {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            max_images: config.max_images,
            max_image_bytes: config.max_image_bytes,
        }
    }
}

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub acquisition: Arc<TextAcquisition>,
    pub limits: RequestLimits,
}

impl ApiContext {
    pub fn new(acquisition: Arc<TextAcquisition>, limits: RequestLimits) -> Self {
        Self { acquisition, limits }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_follow_config() {
        let config = ServiceConfig {
            max_images: 2,
            max_image_bytes: 300,
            ..ServiceConfig::default()
        };
        let limits = RequestLimits::from(&config);
        assert_eq!(limits.max_images, 2);
        assert_eq!(limits.max_image_bytes, 300);
        assert_eq!(limits.max_body_bytes(), 2 * 400 + 64 * 1024);
    }

    #[test]
    fn body_limit_saturates() {
        let limits = RequestLimits {
            max_images: usize::MAX,
            max_image_bytes: usize::MAX / 2,
        };
        assert_eq!(limits.max_body_bytes(), usize::MAX);
    }
}
