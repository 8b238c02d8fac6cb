//! Port definition for fetching images.

use crate::domain::entities::ImageHandle;

/// Result type for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Errors that can occur while fetching an image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Transport-level failure (connection, DNS, malformed URL).
    #[error("Network error: {0}")]
    Network(String),
    /// Server answered with a non-success status.
    #[error("HTTP {status}")]
    Http {
        /// Response status code.
        status: u16,
    },
    /// Response body is not a decodable image.
    #[error("Decode error: {0}")]
    Decode(String),
    /// The load did not settle within the configured limit.
    #[error("Timed out after {after_ms}ms")]
    TimedOut {
        /// Configured limit in milliseconds.
        after_ms: u64,
    },
}

/// Port for turning an image URL into a decoded image.
/// Implementations must be thread-safe.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetches and decodes the image at `url`.
    async fn fetch(&self, url: &str) -> FetchResult<ImageHandle>;
}
