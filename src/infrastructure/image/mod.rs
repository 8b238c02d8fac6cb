//! Image transport.
//!
//! This module provides the HTTP adapter for the [`ImageFetcher`] port.
//!
//! [`ImageFetcher`]: crate::domain::ports::ImageFetcher

pub mod http_fetcher;

pub use http_fetcher::{HttpFetcherConfig, HttpImageFetcher};
