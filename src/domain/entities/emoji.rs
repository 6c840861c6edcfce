//! Custom and native emoji found in message text.

use serde::{Deserialize, Serialize};

use super::cdn;

/// Unique identifier for a custom emoji.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmojiId(pub u64);

impl EmojiId {
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EmojiId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EmojiId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<&str> for EmojiId {
    fn from(value: &str) -> Self {
        Self(value.parse().unwrap_or(0))
    }
}

/// What an emoji token refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmojiKind {
    /// Guild emoji, written `<:name:id>` or `<a:name:id>`.
    Custom {
        /// Emoji name.
        name: String,
        /// Emoji ID.
        id: EmojiId,
        /// Whether the emoji is a GIF.
        animated: bool,
    },
    /// Unicode emoji sequence.
    Native(String),
}

/// An emoji matched in a piece of text, with its byte span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emoji {
    kind: EmojiKind,
    start: usize,
    end: usize,
}

impl Emoji {
    #[must_use]
    pub fn custom(
        name: impl Into<String>,
        id: impl Into<EmojiId>,
        animated: bool,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            kind: EmojiKind::Custom {
                name: name.into(),
                id: id.into(),
                animated,
            },
            start,
            end,
        }
    }

    #[must_use]
    pub fn native(sequence: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind: EmojiKind::Native(sequence.into()),
            start,
            end,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &EmojiKind {
        &self.kind
    }

    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Custom emoji ID, `None` for native emoji.
    #[must_use]
    pub const fn id(&self) -> Option<EmojiId> {
        match &self.kind {
            EmojiKind::Custom { id, .. } => Some(*id),
            EmojiKind::Native(_) => None,
        }
    }

    #[must_use]
    pub const fn is_animated(&self) -> bool {
        matches!(self.kind, EmojiKind::Custom { animated: true, .. })
    }

    /// PNG for custom emoji, SVG for native emoji.
    #[must_use]
    pub fn static_url(&self) -> String {
        match &self.kind {
            EmojiKind::Custom { id, .. } => cdn::custom_emoji_url(id.as_u64(), false),
            EmojiKind::Native(sequence) => cdn::twemoji_url(sequence),
        }
    }

    #[must_use]
    pub fn animated_url(&self) -> Option<String> {
        match &self.kind {
            EmojiKind::Custom {
                id, animated: true, ..
            } => Some(cdn::custom_emoji_url(id.as_u64(), true)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Emoji {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            EmojiKind::Custom {
                name,
                id,
                animated: true,
            } => write!(f, "<a:{name}:{id}>"),
            EmojiKind::Custom { name, id, .. } => write!(f, "<:{name}:{id}>"),
            EmojiKind::Native(sequence) => f.write_str(sequence),
        }
    }
}

/// A custom emoji known to the client, as registered by its guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildEmoji {
    id: EmojiId,
    name: String,
    animated: bool,
}

impl GuildEmoji {
    #[must_use]
    pub fn new(id: impl Into<EmojiId>, name: impl Into<String>, animated: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            animated,
        }
    }

    #[must_use]
    pub const fn id(&self) -> EmojiId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for GuildEmoji {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = if self.animated { "a" } else { "" };
        write!(f, "<{prefix}:{}:{}>", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_emoji_urls() {
        let emoji = Emoji::custom("satania", 123_u64, true, 0, 20);

        assert_eq!(emoji.id(), Some(EmojiId(123)));
        assert_eq!(
            emoji.static_url(),
            "https://cdn.discordapp.com/emojis/123.png"
        );
        assert_eq!(
            emoji.animated_url().as_deref(),
            Some("https://cdn.discordapp.com/emojis/123.gif")
        );
        assert_eq!(emoji.to_string(), "<a:satania:123>");
    }

    #[test]
    fn test_native_emoji() {
        let emoji = Emoji::native("\u{1F608}", 3, 7);

        assert_eq!(emoji.id(), None);
        assert!(!emoji.is_animated());
        assert!(emoji.static_url().ends_with("/1f608.svg"));
        assert_eq!(emoji.animated_url(), None);
        assert_eq!(emoji.to_string(), "\u{1F608}");
    }

    #[test]
    fn test_guild_emoji_display() {
        assert_eq!(GuildEmoji::new(9_u64, "smug", false).to_string(), "<:smug:9>");
        assert_eq!(GuildEmoji::new(9_u64, "smug", true).to_string(), "<a:smug:9>");
    }
}
