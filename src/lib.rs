//! imgwarm - deduplicating image preload cache.
//!
//! This crate loads each image URL at most once at a time, keeps the decoded
//! result for instant reuse, and spreads bulk preloads over a priority prefix
//! and delayed background batches.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the preloading services.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing configuration and the HTTP adapter.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "imgwarm";
