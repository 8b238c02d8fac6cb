//! Application layer with the preloading services.

/// Application services.
pub mod services;

pub use services::{ImagePreloader, PreloaderConfig, PriorityPreload};
