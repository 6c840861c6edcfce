//! Candidates offered to the link resolver and the links it produces.

use super::{Attachment, Channel, Embed, Emoji, Guild, Link, Member, Mentions, Message, User};

/// What kind of value produced a resolved link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum LinkKind {
    Guild,
    User,
    Member,
    Attachment,
    Embed,
    Link,
    Emoji,
    Channel,
}

impl LinkKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Guild => "guild",
            Self::User => "user",
            Self::Member => "member",
            Self::Attachment => "attachment",
            Self::Embed => "embed",
            Self::Link => "link",
            Self::Emoji => "emoji",
            Self::Channel => "channel",
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any value that might yield an image link.
///
/// Chat entities are borrowed; links and emoji parsed out of text are owned
/// because they do not outlive the parse. `Many` is tried in order, first
/// success wins.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Candidate<'a> {
    Guild(&'a Guild),
    User(&'a User),
    Member(&'a Member),
    Attachment(&'a Attachment),
    Embed(&'a Embed),
    Link(Link),
    Emoji(Emoji),
    Channel(&'a Channel),
    Message(&'a Message),
    Mentions(&'a Mentions),
    Many(Vec<Candidate<'a>>),
}

impl<'a> Candidate<'a> {
    /// Collects anything convertible into candidates into one ordered group.
    pub fn many<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        Self::Many(items.into_iter().map(Into::into).collect())
    }
}

macro_rules! candidate_from_ref {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl<'a> From<&'a $ty> for Candidate<'a> {
                fn from(value: &'a $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

candidate_from_ref! {
    Guild => Guild,
    User => User,
    Member => Member,
    Attachment => Attachment,
    Embed => Embed,
    Channel => Channel,
    Message => Message,
    Mentions => Mentions,
}

impl From<Link> for Candidate<'_> {
    fn from(value: Link) -> Self {
        Self::Link(value)
    }
}

impl From<Emoji> for Candidate<'_> {
    fn from(value: Emoji) -> Self {
        Self::Emoji(value)
    }
}

impl<'a> From<Vec<Candidate<'a>>> for Candidate<'a> {
    fn from(value: Vec<Candidate<'a>>) -> Self {
        Self::Many(value)
    }
}

/// The image a candidate resolved to.
///
/// `url` is never empty: a value without a usable URL does not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink<'a> {
    kind: LinkKind,
    url: String,
    animated_url: Option<String>,
    name: String,
    source: Candidate<'a>,
}

impl<'a> ResolvedLink<'a> {
    /// Returns `None` when `url` is empty.
    #[must_use]
    pub fn new(
        kind: LinkKind,
        url: impl Into<String>,
        name: impl Into<String>,
        source: Candidate<'a>,
    ) -> Option<Self> {
        let url = url.into();
        if url.is_empty() {
            return None;
        }

        Some(Self {
            kind,
            url,
            animated_url: None,
            name: name.into(),
            source,
        })
    }

    #[must_use]
    pub fn with_animated_url(mut self, animated_url: Option<String>) -> Self {
        self.animated_url = animated_url.filter(|url| !url.is_empty());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub const fn kind(&self) -> LinkKind {
        self.kind
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn animated_url(&self) -> Option<&str> {
        self.animated_url.as_deref()
    }

    /// Animated URL when there is one, otherwise the static URL.
    #[must_use]
    pub fn best_url(&self) -> &str {
        self.animated_url.as_deref().unwrap_or(&self.url)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn source(&self) -> &Candidate<'a> {
        &self.source
    }
}
