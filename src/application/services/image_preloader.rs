//! Deduplicating image preloader.
//!
//! Each URL is fetched at most once while it is in flight: the first caller
//! spawns the load and parks a shared future in the pending set, later callers
//! await that same future. Successful loads land in an [`ImageCache`] and are
//! served from there until the cache is cleared.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared, join_all};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

use crate::domain::entities::{CacheStats, ImageCache, ImageHandle, PreloadOutcome, PreloadResult};
use crate::domain::errors::PreloadError;
use crate::domain::ports::{FetchError, FetchResult, ImageFetcher};

/// Number of URLs loaded eagerly by [`ImagePreloader::preload_with_priority`].
pub const DEFAULT_PRIORITY_COUNT: usize = 6;
/// URLs per chunk in batched loading.
pub const DEFAULT_BATCH_SIZE: usize = 5;
/// Pause between chunks in batched loading.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(100);
/// Wait before the deferred remainder of a priority preload starts.
pub const DEFAULT_DEFERRED_DELAY: Duration = Duration::from_millis(500);

/// Configuration for the image preloader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloaderConfig {
    /// Maximum cached images; `None` never evicts.
    pub max_entries: Option<usize>,
    /// Per-load time limit; `None` waits indefinitely.
    pub load_timeout: Option<Duration>,
    /// Wait before the deferred remainder of a priority preload starts.
    pub deferred_delay: Duration,
    /// Chunk size used for the deferred remainder.
    pub batch_size: usize,
    /// Pause between chunks of the deferred remainder.
    pub batch_delay: Duration,
}

impl Default for PreloaderConfig {
    fn default() -> Self {
        Self {
            max_entries: None,
            load_timeout: None,
            deferred_delay: DEFAULT_DEFERRED_DELAY,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }
}

/// Result of [`ImagePreloader::preload_with_priority`].
#[derive(Debug)]
pub struct PriorityPreload {
    /// Outcomes for the priority prefix, in request order.
    pub outcomes: Vec<PreloadOutcome>,
    /// Task loading the remainder, if there was one.
    pub background: Option<JoinHandle<()>>,
}

impl PriorityPreload {
    /// Waits for the deferred remainder to finish.
    pub async fn wait_background(&mut self) {
        if let Some(task) = self.background.take()
            && let Err(e) = task.await
        {
            warn!(error = %e, "Deferred preload task did not complete");
        }
    }
}

type SharedLoad = Shared<BoxFuture<'static, PreloadResult<ImageHandle>>>;

struct InFlight {
    ticket: u64,
    load: SharedLoad,
}

struct PreloadState {
    cache: ImageCache,
    pending: HashMap<String, InFlight>,
    next_ticket: u64,
}

struct Inner {
    state: Mutex<PreloadState>,
    fetcher: Arc<dyn ImageFetcher>,
    config: PreloaderConfig,
}

/// Cloneable handle to a shared image cache with in-flight deduplication.
#[derive(Clone)]
pub struct ImagePreloader {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ImagePreloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePreloader")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ImagePreloader {
    /// Creates a preloader that loads images through `fetcher`.
    #[must_use]
    pub fn new(fetcher: Arc<dyn ImageFetcher>, config: PreloaderConfig) -> Self {
        let state = PreloadState {
            cache: ImageCache::with_max_entries(config.max_entries),
            pending: HashMap::new(),
            next_ticket: 0,
        };
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                fetcher,
                config,
            }),
        }
    }

    /// Creates a preloader with default configuration.
    #[must_use]
    pub fn with_defaults(fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self::new(fetcher, PreloaderConfig::default())
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &PreloaderConfig {
        &self.inner.config
    }

    /// Loads `url`, reusing a cached image or an in-flight load when possible.
    ///
    /// The load itself runs on its own task, so it completes and populates
    /// the cache even if this future is dropped.
    ///
    /// # Errors
    /// Returns [`PreloadError::LoadFailed`] if the fetch fails. Failures are
    /// not cached; the next call starts a fresh load.
    pub async fn preload_image(&self, url: &str) -> PreloadResult<ImageHandle> {
        let load = {
            let mut state = self.inner.state.lock();
            if let Some(image) = state.cache.get(url) {
                return Ok(image);
            }

            if let Some(flight) = state.pending.get(url) {
                trace!(url, "Joining in-flight load");
                flight.load.clone()
            } else {
                let runtime =
                    Handle::try_current().map_err(|_| PreloadError::no_runtime(url))?;
                let ticket = state.next_ticket;
                state.next_ticket += 1;

                let load = self.spawn_load(&runtime, url, ticket);
                state.pending.insert(
                    url.to_owned(),
                    InFlight {
                        ticket,
                        load: load.clone(),
                    },
                );
                load
            }
        };

        load.await
    }

    fn spawn_load(&self, runtime: &Handle, url: &str, ticket: u64) -> SharedLoad {
        let inner = Arc::clone(&self.inner);
        let task_url = url.to_owned();
        let task = runtime.spawn(async move { inner.run_load(task_url, ticket).await });

        let url = url.to_owned();
        async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(PreloadError::aborted(url, e.to_string())),
            }
        }
        .boxed()
        .shared()
    }

    /// Loads every URL concurrently and reports one outcome per input, in
    /// input order. Never fails as a whole.
    ///
    /// Returns an empty vector if there is no runtime to dispatch onto.
    pub async fn preload_images<I, S>(&self, urls: I) -> Vec<PreloadOutcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Err(e) = Handle::try_current() {
            error!(error = %e, "Cannot dispatch image preloads");
            return Vec::new();
        }

        let loads = urls.into_iter().map(Into::into).map(|url: String| async move {
            let result = self.preload_image(&url).await;
            PreloadOutcome::new(url, result)
        });

        join_all(loads).await
    }

    /// Loads the first `priority_count` URLs and returns their outcomes.
    /// The rest are loaded in batches by a background task that starts after
    /// the configured deferral delay.
    pub async fn preload_with_priority<I, S>(
        &self,
        urls: I,
        priority_count: usize,
    ) -> PriorityPreload
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut priority: Vec<String> = urls.into_iter().map(Into::into).collect();
        let deferred = priority.split_off(priority_count.min(priority.len()));

        let outcomes = self.preload_images(priority).await;
        let failed = outcomes.iter().filter(|o| o.is_err()).count();
        debug!(
            loaded = outcomes.len() - failed,
            failed,
            deferred = deferred.len(),
            "Priority preload settled"
        );

        let background = if deferred.is_empty() {
            None
        } else {
            self.spawn_deferred(deferred)
        };

        PriorityPreload {
            outcomes,
            background,
        }
    }

    fn spawn_deferred(&self, urls: Vec<String>) -> Option<JoinHandle<()>> {
        let Ok(runtime) = Handle::try_current() else {
            error!(count = urls.len(), "Cannot schedule deferred preload");
            return None;
        };

        let preloader = self.clone();
        let config = &self.inner.config;
        let (wait, batch_size, batch_delay) =
            (config.deferred_delay, config.batch_size, config.batch_delay);

        Some(runtime.spawn(async move {
            tokio::time::sleep(wait).await;
            debug!(count = urls.len(), "Starting deferred preload");
            preloader
                .preload_images_in_batches(urls, batch_size, batch_delay)
                .await;
        }))
    }

    /// Loads `urls` in consecutive chunks of `batch_size`, waiting for each
    /// chunk to settle and then for `delay` before starting the next one.
    ///
    /// Failures are logged and do not stop later chunks. A `batch_size` of
    /// zero is treated as one.
    pub async fn preload_images_in_batches<I, S>(&self, urls: I, batch_size: usize, delay: Duration)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let urls: Vec<String> = urls.into_iter().map(Into::into).collect();
        let batch_size = batch_size.max(1);
        let total = urls.len().div_ceil(batch_size);

        for (index, batch) in urls.chunks(batch_size).enumerate() {
            let outcomes = self.preload_images(batch.iter().cloned()).await;
            for outcome in &outcomes {
                if let Some(e) = outcome.error() {
                    warn!(url = %outcome.url, error = %e, "Batched preload failed");
                }
            }
            trace!(batch = index + 1, total, "Preload batch settled");

            if index + 1 < total {
                tokio::time::sleep(delay).await;
            }
        }
    }

    /// Returns true if `url` has a cached image. In-flight loads do not count.
    #[must_use]
    pub fn is_cached(&self, url: &str) -> bool {
        self.inner.state.lock().cache.contains(url)
    }

    /// Returns true if a load for `url` is in flight.
    #[must_use]
    pub fn is_pending(&self, url: &str) -> bool {
        self.inner.state.lock().pending.contains_key(url)
    }

    /// Drops every cached image and forgets in-flight loads.
    ///
    /// Loads already running still settle for their callers, and a successful
    /// one still stores its image in the now-empty cache.
    pub fn clear_cache(&self) {
        let mut state = self.inner.state.lock();
        let (cached, pending) = (state.cache.len(), state.pending.len());
        state.cache.clear();
        state.pending.clear();
        debug!(cached, pending, "Cleared image preload cache");
    }

    /// Number of cached images.
    #[must_use]
    pub fn cache_size(&self) -> usize {
        self.inner.state.lock().cache.len()
    }

    /// Number of loads in flight.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// Returns cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let state = self.inner.state.lock();
        state.cache.stats(state.pending.len())
    }
}

impl Inner {
    async fn run_load(&self, url: String, ticket: u64) -> PreloadResult<ImageHandle> {
        let mut flight = FlightGuard {
            inner: self,
            url: &url,
            ticket,
            image: None,
        };

        debug!(url = %url, "Dispatching image load");
        match self.fetch(&url).await {
            Ok(image) => {
                flight.image = Some(image.clone());
                drop(flight);
                debug!(url = %url, "Image loaded");
                Ok(image)
            }
            Err(source) => {
                drop(flight);
                debug!(url = %url, error = %source, "Image load failed");
                Err(PreloadError::load_failed(url, source))
            }
        }
    }

    async fn fetch(&self, url: &str) -> FetchResult<ImageHandle> {
        let Some(limit) = self.config.load_timeout else {
            return self.fetcher.fetch(url).await;
        };

        tokio::time::timeout(limit, self.fetcher.fetch(url))
            .await
            .unwrap_or_else(|_| {
                Err(FetchError::TimedOut {
                    after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                })
            })
    }
}

/// Settles a load's bookkeeping when dropped, including when the fetcher
/// panics.
///
/// A produced image is cached and the URL leaves the pending set, even when a
/// newer load for it was started after a clear; callers of that load keep
/// their own handle to it. Without an image, only this load's own pending
/// entry is removed.
struct FlightGuard<'a> {
    inner: &'a Inner,
    url: &'a str,
    ticket: u64,
    image: Option<ImageHandle>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock();
        if let Some(image) = self.image.take() {
            state.cache.put(self.url.to_owned(), image);
            state.pending.remove(self.url);
        } else if state
            .pending
            .get(self.url)
            .is_some_and(|flight| flight.ticket == self.ticket)
        {
            state.pending.remove(self.url);
        }
    }
}
