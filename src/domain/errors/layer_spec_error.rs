use thiserror::Error;

/// Invalid layer option.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum LayerSpecError {
    #[error("unknown resize fit: {0}")]
    UnknownFit(String),

    #[error("invalid colour: {0}")]
    InvalidColor(String),

    #[error("rotation must be a multiple of 90 degrees, got {0}")]
    InvalidRotation(i64),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("unknown layer option: {0}")]
    UnknownKey(String),

    #[error("layer needs either a path or a url")]
    MissingSource,
}

impl LayerSpecError {
    /// Creates invalid value error.
    #[must_use]
    pub fn invalid_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
        }
    }
}
