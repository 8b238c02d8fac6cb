//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::args::CliArgs;
use crate::application::services::{
    DEFAULT_BATCH_DELAY, DEFAULT_BATCH_SIZE, DEFAULT_DEFERRED_DELAY, DEFAULT_PRIORITY_COUNT,
    PreloaderConfig,
};
use crate::infrastructure::image::HttpFetcherConfig;

pub(super) const APP_NAME: &str = "imgwarm";
pub(super) const APP_QUALIFIER: &str = "dev";
pub(super) const APP_ORGANIZATION: &str = "imgwarm";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Converts to tracing level.
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

/// Application configuration, read from `config.toml` and overridden by CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log file path. Logs go to stderr when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Preloading behavior.
    #[serde(default)]
    pub preload: PreloadSettings,

    /// HTTP transport.
    #[serde(default)]
    pub http: HttpSettings,
}

/// Preloading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadSettings {
    /// URLs loaded eagerly before the rest is deferred.
    #[serde(default = "default_priority_count")]
    pub priority_count: usize,

    /// URLs per chunk when loading the deferred remainder.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between chunks in milliseconds.
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Wait before the deferred remainder starts, in milliseconds.
    #[serde(default = "default_deferred_delay_ms")]
    pub deferred_delay_ms: u64,

    /// Maximum cached images. Unbounded when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,

    /// Per-image load limit in milliseconds. No limit when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_timeout_ms: Option<u64>,
}

impl Default for PreloadSettings {
    fn default() -> Self {
        Self {
            priority_count: default_priority_count(),
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            deferred_delay_ms: default_deferred_delay_ms(),
            max_entries: None,
            load_timeout_ms: None,
        }
    }
}

impl PreloadSettings {
    /// Builds the preloader configuration.
    #[must_use]
    pub fn preloader_config(&self) -> PreloaderConfig {
        PreloaderConfig {
            max_entries: self.max_entries,
            load_timeout: self.load_timeout_ms.map(Duration::from_millis),
            deferred_delay: Duration::from_millis(self.deferred_delay_ms),
            batch_size: self.batch_size,
            batch_delay: Duration::from_millis(self.batch_delay_ms),
        }
    }
}

/// HTTP transport configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum concurrent downloads.
    #[serde(default = "default_max_concurrent_downloads")]
    pub max_concurrent_downloads: usize,

    /// User-Agent header.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_concurrent_downloads: default_max_concurrent_downloads(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpSettings {
    /// Builds the HTTP fetcher configuration.
    #[must_use]
    pub fn fetcher_config(&self) -> HttpFetcherConfig {
        HttpFetcherConfig {
            timeout_secs: self.timeout_secs,
            max_concurrent_downloads: self.max_concurrent_downloads,
            user_agent: self.user_agent.clone(),
        }
    }
}

fn default_priority_count() -> usize {
    DEFAULT_PRIORITY_COUNT
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_batch_delay_ms() -> u64 {
    u64::try_from(DEFAULT_BATCH_DELAY.as_millis()).unwrap_or(100)
}

fn default_deferred_delay_ms() -> u64 {
    u64::try_from(DEFAULT_DEFERRED_DELAY.as_millis()).unwrap_or(500)
}

fn default_timeout_secs() -> u64 {
    HttpFetcherConfig::default().timeout_secs
}

fn default_max_concurrent_downloads() -> usize {
    HttpFetcherConfig::default().max_concurrent_downloads
}

fn default_user_agent() -> String {
    HttpFetcherConfig::default().user_agent
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(priority_count) = args.priority_count {
            self.preload.priority_count = priority_count;
        }
        if let Some(batch_size) = args.batch_size {
            self.preload.batch_size = batch_size;
        }
        if let Some(batch_delay_ms) = args.batch_delay_ms {
            self.preload.batch_delay_ms = batch_delay_ms;
        }
        if let Some(deferred_delay_ms) = args.deferred_delay_ms {
            self.preload.deferred_delay_ms = deferred_delay_ms;
        }
        if let Some(max_entries) = args.max_entries {
            self.preload.max_entries = Some(max_entries);
        }
        if let Some(load_timeout_ms) = args.load_timeout_ms {
            self.preload.load_timeout_ms = Some(load_timeout_ms);
        }
        if let Some(max_concurrent_downloads) = args.max_concurrent_downloads {
            self.http.max_concurrent_downloads = max_concurrent_downloads;
        }
    }
}
