//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Image transport.
pub mod image;

pub use config::{AppConfig, CliArgs, ConfigError, ConfigStore, LogLevel};
pub use image::{HttpFetcherConfig, HttpImageFetcher};
