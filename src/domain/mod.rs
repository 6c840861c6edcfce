//! Domain layer with chat entities, compositor layers and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{Candidate, ImageLayer, Message, ResolvedLink};
pub use errors::{FetchImageError, HttpError, RenderError};
pub use ports::HttpPort;
