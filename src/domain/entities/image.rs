//! Domain types for preloaded images.

use std::sync::Arc;

use crate::domain::errors::PreloadError;

/// Shared handle to a decoded image.
///
/// Every caller that preloads the same URL receives a clone of the same `Arc`.
pub type ImageHandle = Arc<image::DynamicImage>;

/// Result type for preload operations.
pub type PreloadResult<T> = std::result::Result<T, PreloadError>;

/// Settled result of one URL's load attempt, as reported by the aggregate
/// preload operations.
#[derive(Debug, Clone)]
pub struct PreloadOutcome {
    /// The requested URL.
    pub url: String,
    /// The loaded image, or the reason it could not be loaded.
    pub result: PreloadResult<ImageHandle>,
}

impl PreloadOutcome {
    /// Creates an outcome for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>, result: PreloadResult<ImageHandle>) -> Self {
        Self {
            url: url.into(),
            result,
        }
    }

    /// Returns true if the image was loaded.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns true if the load failed.
    #[must_use]
    pub const fn is_err(&self) -> bool {
        self.result.is_err()
    }

    /// Returns the loaded image, if any.
    #[must_use]
    pub fn image(&self) -> Option<&ImageHandle> {
        self.result.as_ref().ok()
    }

    /// Returns the failure, if any.
    #[must_use]
    pub fn error(&self) -> Option<&PreloadError> {
        self.result.as_ref().err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::FetchError;

    #[test]
    fn test_outcome_accessors() {
        let image = Arc::new(image::DynamicImage::new_rgb8(4, 4));
        let ok = PreloadOutcome::new("a.png", Ok(image));
        assert!(ok.is_ok());
        assert_eq!(ok.image().map(|img| img.width()), Some(4));
        assert!(ok.error().is_none());

        let failed = PreloadOutcome::new(
            "b.png",
            Err(PreloadError::load_failed(
                "b.png",
                FetchError::Http { status: 404 },
            )),
        );
        assert!(failed.is_err());
        assert!(failed.image().is_none());
        assert_eq!(failed.error().map(PreloadError::url), Some("b.png"));
    }
}
