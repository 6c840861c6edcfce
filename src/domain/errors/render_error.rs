//! Compositor error types.

use thiserror::Error;

use super::FetchImageError;

/// Failure to produce a composed image.
///
/// Decoder and encoder failures without their own classification all land in
/// `Render`, so callers can show one "unsupported or corrupt image" message.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum RenderError {
    #[error("failed to fetch layer: {0}")]
    Fetch(#[from] FetchImageError),

    #[error("failed to read layer: {0}")]
    Io(#[from] std::io::Error),

    #[error("image could not be processed: {0}")]
    Render(String),
}

impl RenderError {
    /// Creates generic render error.
    #[must_use]
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }
}

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        Self::Render(err.to_string())
    }
}

impl From<tokio::task::JoinError> for RenderError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Render(format!("decode task failed: {err}"))
    }
}
