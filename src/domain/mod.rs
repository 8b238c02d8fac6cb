//! Domain layer with core entities and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{CacheStats, ImageCache, ImageHandle, PreloadOutcome, PreloadResult};
pub use errors::PreloadError;
pub use ports::{FetchError, FetchResult, ImageFetcher};
