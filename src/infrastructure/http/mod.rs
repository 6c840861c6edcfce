//! HTTP adapter.

mod client;

pub use client::HttpClient;
