use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use satania_images::application::{ImageFetcher, LinkMatcher, LinkResolver};
use satania_images::domain::entities::{ChatCache, ImageLayer, Message, User};
use satania_images::domain::errors::RenderError;
use satania_images::infrastructure::image::render_encoded;
use satania_images::infrastructure::{
    AppConfig, CliArgs, Command, HttpClient, LayerSpec, OutputFormat, SpecSource, StorageManager,
};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

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
        let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

fn create_fetcher(config: &AppConfig) -> Result<ImageFetcher> {
    let http = Arc::new(HttpClient::new(&config.download)?);
    Ok(ImageFetcher::new(http, config.fetch.clone()))
}

fn print_links(text: &str) -> Result<()> {
    let urls: Vec<String> = LinkMatcher::match_urls(text)
        .iter()
        .map(|link| link.url().to_string())
        .collect();
    let emojis: Vec<String> = LinkMatcher::match_emojis(text)
        .iter()
        .map(ToString::to_string)
        .collect();

    let author = User::new(0_u64, "satania", "0", None);
    let message = Message::new(0_u64, 0_u64, author, text);
    let cache = ChatCache::new();
    let resolved = LinkResolver::new(&cache).resolve(&message).map(|link| {
        json!({
            "kind": link.kind().as_str(),
            "url": link.url(),
            "animated_url": link.animated_url(),
            "name": link.name(),
        })
    });

    let report = json!({ "urls": urls, "emojis": emojis, "resolved": resolved });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn fetch(config: &AppConfig, urls: &[String], output: &Path) -> Result<()> {
    let fetcher = create_fetcher(config)?;
    let bytes = fetcher
        .fetch_first(urls)
        .await
        .wrap_err("no image could be fetched")?;

    tokio::fs::write(output, &bytes).await?;
    info!(path = %output.display(), size = bytes.len(), "Image written");
    Ok(())
}

async fn compose(
    config: &AppConfig,
    specs: Vec<LayerSpec>,
    output: &Path,
    format: OutputFormat,
    quality: u8,
) -> Result<()> {
    let fetcher = create_fetcher(config)?;
    let layers: Vec<ImageLayer<'_>> = specs
        .into_iter()
        .map(|spec| {
            let layer = match spec.source {
                SpecSource::Path(path) => ImageLayer::from_path(path),
                SpecSource::Url(url) => {
                    let fetcher = &fetcher;
                    ImageLayer::pending(async move {
                        fetcher.fetch(&url).await.map_err(RenderError::from)
                    })
                }
            };
            layer.with_options(spec.options)
        })
        .collect();

    let bytes = render_encoded(layers, format, quality)
        .await
        .wrap_err("image could not be processed")?;

    tokio::fs::write(output, &bytes).await?;
    info!(path = %output.display(), size = bytes.len(), format = format.mime(), "Image written");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let config = load_config(&args)?;

    init_logging(&config)?;

    info!(version = satania_images::VERSION, "Starting satania-images");

    match args.command {
        Command::Links { text } => print_links(&text),
        Command::Fetch { urls, output } => fetch(&config, &urls, &output).await,
        Command::Compose {
            layers,
            output,
            format,
            quality,
        } => compose(&config, layers, &output, format, quality).await,
    }
}
