use super::app_config::LogLevel;
use crate::infrastructure::image::{LayerSpec, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "satania-images",
    version,
    about = "Find, fetch and composite the image a Discord message points at",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", env = "SATANIA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Retries for transient download failures.
    #[arg(long)]
    pub retry: Option<u32>,

    /// Download timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Largest accepted download in bytes.
    #[arg(long)]
    pub max_size: Option<u64>,

    /// Requests one fetch chain may make.
    #[arg(long)]
    pub max_fetch: Option<u32>,

    /// Fail instead of reading HTML pages.
    #[arg(long)]
    pub expect_image: Option<bool>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the URLs and emoji in a text and the image it points at.
    Links {
        /// Message text, as typed in chat.
        text: String,
    },

    /// Download the image a URL leads to.
    Fetch {
        /// Page or image URLs, tried in order.
        #[arg(required = true)]
        urls: Vec<String>,

        /// Where to write the image.
        #[arg(short, long, value_name = "PATH")]
        output: PathBuf,
    },

    /// Stack image layers into one picture.
    Compose {
        /// Layer as comma separated `key=value` pairs, bottom first.
        #[arg(short, long = "layer", value_name = "SPEC", required = true)]
        layers: Vec<LayerSpec>,

        /// Where to write the picture.
        #[arg(short, long, value_name = "PATH")]
        output: PathBuf,

        /// Output encoding.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Png)]
        format: OutputFormat,

        /// JPEG quality.
        #[arg(short, long, default_value_t = 90, value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: u8,
    },
}
