use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, bail};
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use imgwarm::application::ImagePreloader;
use imgwarm::infrastructure::{AppConfig, CliArgs, ConfigStore, HttpImageFetcher};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::default()
            .add_directive(LevelFilter::from_level(config.log_level.to_tracing_level()).into())
    });

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config(store: &ConfigStore, args: &CliArgs) -> Result<AppConfig> {
    let mut config = store.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

/// One URL per line; blank lines and `#` comments are skipped.
fn parse_url_list(content: &str) -> impl Iterator<Item = String> + '_ {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
}

fn collect_urls(args: &CliArgs) -> Result<Vec<String>> {
    let mut urls = args.urls.clone();
    if let Some(path) = &args.input {
        urls.extend(read_url_file(path)?);
    }
    Ok(urls)
}

fn read_url_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read URL list {}", path.display()))?;
    Ok(parse_url_list(&content).collect())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let store = ConfigStore::new()?;
    let config = load_config(&store, &args)?;
    init_logging(&config)?;

    info!(version = imgwarm::VERSION, "Starting imgwarm");

    if args.write_config {
        let path = store.save_config(args.config.as_deref(), &config)?;
        info!(path = %path.display(), "Configuration written");
        println!("wrote {}", path.display());
        return Ok(());
    }

    let urls = collect_urls(&args)?;
    if urls.is_empty() {
        bail!("no image URLs given; pass them as arguments or with --input");
    }

    let fetcher = Arc::new(HttpImageFetcher::new(config.http.fetcher_config())?);
    let preloader = ImagePreloader::new(fetcher, config.preload.preloader_config());

    let mut result = preloader
        .preload_with_priority(urls, config.preload.priority_count)
        .await;

    for outcome in &result.outcomes {
        match &outcome.result {
            Ok(image) => println!("ok    {} ({}x{})", outcome.url, image.width(), image.height()),
            Err(e) => println!("fail  {e}"),
        }
    }

    if args.no_wait {
        if result.background.is_some() {
            warn!("Exiting before background batches finished");
        }
    } else {
        result.wait_background().await;
    }

    println!("{}", preloader.stats());
    Ok(())
}
