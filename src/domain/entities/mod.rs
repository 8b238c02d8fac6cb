//! Domain entity definitions.

mod image;
mod image_cache;

pub use image::{ImageHandle, PreloadOutcome, PreloadResult};
pub use image_cache::{CacheStats, ImageCache};
