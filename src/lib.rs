//! Satania images - finds, fetches and composites the images chat messages
//! point at.
//!
//! This crate resolves a Discord message (or anything mentioned in it) to the
//! most relevant image URL, downloads it while following HTML pages that wrap
//! an image, and stacks decoded layers into a single picture.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the link matcher, resolver and image fetcher.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "satania-images";
