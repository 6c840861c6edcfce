//! Application layer: link matching, resolution and image fetching.

/// Pipeline services.
pub mod services;

pub use services::{FetchOptions, ImageFetcher, LinkMatcher, LinkResolver};
