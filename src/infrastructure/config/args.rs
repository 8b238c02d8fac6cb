use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "imgwarm",
    version,
    about = "Warm an image cache: load the first few URLs eagerly, the rest in background batches",
    long_about = None
)]
pub struct CliArgs {
    /// Image URLs to preload, in priority order.
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,

    /// File with one URL per line. Blank lines and `#` comments are skipped.
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// URLs loaded eagerly before the rest is deferred.
    #[arg(short, long)]
    pub priority_count: Option<usize>,

    /// URLs per background batch.
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Pause between background batches in milliseconds.
    #[arg(long)]
    pub batch_delay_ms: Option<u64>,

    /// Wait before background loading starts, in milliseconds.
    #[arg(long)]
    pub deferred_delay_ms: Option<u64>,

    /// Maximum cached images.
    #[arg(long)]
    pub max_entries: Option<usize>,

    /// Per-image load limit in milliseconds.
    #[arg(long)]
    pub load_timeout_ms: Option<u64>,

    /// Maximum concurrent downloads.
    #[arg(long)]
    pub max_concurrent_downloads: Option<usize>,

    /// Exit without waiting for the background batches.
    #[arg(long)]
    pub no_wait: bool,

    /// Write the effective configuration to the config file and exit.
    #[arg(long)]
    pub write_config: bool,
}
