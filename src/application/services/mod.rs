//! Image pipeline services.

pub mod image_fetcher;
pub mod link_matcher;
pub mod link_resolver;
pub mod names;

pub use image_fetcher::{ExtractionRule, FetchOptions, ImageFetcher};
pub use link_matcher::LinkMatcher;
pub use link_resolver::{LinkResolver, command_args, last_image, last_images, sanitize_name};
pub use names::{channel_icon, channel_name, domain, domain_with_path, nick};
