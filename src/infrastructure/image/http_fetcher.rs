//! HTTP image fetcher.
//!
//! Downloads image bytes with `reqwest` and decodes them on the blocking pool.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::Semaphore;
use tracing::{debug, trace};

use crate::domain::entities::ImageHandle;
use crate::domain::ports::{FetchError, FetchResult, ImageFetcher};

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFetcherConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum concurrent downloads.
    pub max_concurrent_downloads: usize,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_concurrent_downloads: 4,
            user_agent: format!("{}/{}", crate::NAME, crate::VERSION),
        }
    }
}

/// Fetches images over HTTP(S).
pub struct HttpImageFetcher {
    client: reqwest::Client,
    downloads: Arc<Semaphore>,
    config: HttpFetcherConfig,
}

impl std::fmt::Debug for HttpImageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpImageFetcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpImageFetcher {
    /// Creates a fetcher with the given configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: HttpFetcherConfig) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            downloads: Arc::new(Semaphore::new(config.max_concurrent_downloads.max(1))),
            config,
        })
    }

    /// Downloads image bytes from a URL.
    async fn download(&self, url: &str) -> FetchResult<Bytes> {
        let _permit = self
            .downloads
            .acquire()
            .await
            .map_err(|e| FetchError::Network(format!("Download limiter closed: {e}")))?;

        trace!(url, "Requesting image");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(format!("Failed to read body: {e}")))
    }
}

/// Decodes image bytes on the blocking pool.
async fn decode(bytes: Bytes) -> FetchResult<ImageHandle> {
    let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| FetchError::Decode(format!("Decode task panicked: {e}")))?
        .map_err(|e| FetchError::Decode(format!("Failed to decode image: {e}")))?;

    Ok(Arc::new(decoded))
}

#[async_trait::async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<ImageHandle> {
        let bytes = self.download(url).await?;
        let size = bytes.len();
        let image = decode(bytes).await?;
        debug!(
            url,
            size,
            width = image.width(),
            height = image.height(),
            "Fetched image"
        );
        Ok(image)
    }
}
