use serde::{Deserialize, Serialize};

/// A URL matched in message text.
///
/// `start` and `end` are byte offsets into the source text. For a delimited
/// link the span covers both angle brackets, so `end - start` can differ from
/// `url.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    url: String,
    start: usize,
    end: usize,
    delimited: bool,
}

impl Link {
    #[must_use]
    pub fn new(url: impl Into<String>, start: usize, end: usize, delimited: bool) -> Self {
        Self {
            url: url.into(),
            start,
            end,
            delimited,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Whether the link was wrapped in `<` and `>`.
    #[must_use]
    pub const fn is_delimited(&self) -> bool {
        self.delimited
    }
}
