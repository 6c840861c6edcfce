//! Infrastructure layer with adapters for files, the network and codecs.

/// Application configuration.
pub mod config;
/// reqwest download client.
pub mod http;
/// Image codecs and the layered compositor.
pub mod image;

pub use config::{AppConfig, CliArgs, Command, DownloadConfig, LogLevel, StorageManager};
pub use http::HttpClient;
pub use image::{LayerSpec, OutputFormat, SpecSource};
