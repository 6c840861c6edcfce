//! Image fetcher error types.

use thiserror::Error;

use super::HttpError;

/// Terminal outcomes of an image fetch chain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum FetchImageError {
    #[error("no images found")]
    NoImagesFound,

    #[error("server answered with status {status}")]
    NotOk { status: u16 },

    #[error("expected an image")]
    ImageExpected,

    #[error(transparent)]
    Http(#[from] HttpError),
}

impl FetchImageError {
    /// Stable tag for presenting the error to users.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NoImagesFound => "no-images",
            Self::NotOk { .. } => "not-ok",
            Self::ImageExpected => "image-expected",
            Self::Http(_) => "http",
        }
    }
}
