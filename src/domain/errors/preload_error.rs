//! Preload error types.

use thiserror::Error;

use crate::domain::ports::FetchError;

/// Error returned when an image could not be preloaded.
///
/// Cloneable so a single failure can be handed to every caller waiting on the
/// same in-flight load.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum PreloadError {
    #[error("failed to load image {url}: {source}")]
    LoadFailed {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("load task for {url} did not complete: {reason}")]
    Aborted { url: String, reason: String },

    #[error("no async runtime available to load {url}")]
    NoRuntime { url: String },
}

impl PreloadError {
    /// Creates load failure error.
    #[must_use]
    pub fn load_failed(url: impl Into<String>, source: FetchError) -> Self {
        Self::LoadFailed {
            url: url.into(),
            source,
        }
    }

    /// Creates aborted task error.
    #[must_use]
    pub fn aborted(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Aborted {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates missing runtime error.
    #[must_use]
    pub fn no_runtime(url: impl Into<String>) -> Self {
        Self::NoRuntime { url: url.into() }
    }

    /// Returns the URL that failed.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::LoadFailed { url, .. } | Self::Aborted { url, .. } | Self::NoRuntime { url } => {
                url
            }
        }
    }

    /// Returns whether the underlying fetch timed out.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::LoadFailed {
                source: FetchError::TimedOut { .. },
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_names_url() {
        let err = PreloadError::load_failed("https://shop.test/a.png", FetchError::Http { status: 404 });
        let msg = err.to_string();
        assert!(msg.contains("https://shop.test/a.png"));
        assert!(msg.contains("404"));
    }

    #[test]
    fn test_url_accessor() {
        assert_eq!(PreloadError::aborted("a.png", "panicked").url(), "a.png");
        assert_eq!(PreloadError::no_runtime("b.png").url(), "b.png");
    }

    #[test]
    fn test_is_timeout() {
        let timed_out = PreloadError::load_failed("a.png", FetchError::TimedOut { after_ms: 10 });
        assert!(timed_out.is_timeout());
        assert!(!PreloadError::load_failed("a.png", FetchError::Decode("bad".into())).is_timeout());
    }
}
