use serde::{Deserialize, Serialize};

use super::{ChannelId, GuildId, Member, User};

/// Unique identifier for a Discord message.
///
/// Snowflakes grow with time, so ordering by ID is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl MessageId {
    /// Returns the underlying u64 value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MessageId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.parse().unwrap_or(0))
    }
}

/// Discord message attachment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Attachment {
    filename: String,
    url: String,
    width: Option<u32>,
    height: Option<u32>,
}

#[allow(missing_docs)]
impl Attachment {
    #[must_use]
    pub fn new(filename: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            url: url.into(),
            width: None,
            height: None,
        }
    }

    #[must_use]
    pub const fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Discord only reports dimensions for images and videos.
    #[must_use]
    pub const fn is_image(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }
}

/// Image or thumbnail of an embed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmbedMedia {
    /// Source URL of the media.
    pub url: String,
    /// Discord media proxy URL.
    #[serde(default)]
    pub proxy_url: Option<String>,
}

impl EmbedMedia {
    /// Creates media without a proxy URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            proxy_url: None,
        }
    }

    /// Sets the media proxy URL.
    #[must_use]
    pub fn with_proxy_url(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }

    /// Proxy URL when available, otherwise the source URL.
    #[must_use]
    pub fn fetch_url(&self) -> &str {
        self.proxy_url.as_deref().unwrap_or(&self.url)
    }
}

/// Rich embed attached to a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Embed {
    /// Full size image.
    #[serde(default)]
    pub image: Option<EmbedMedia>,
    /// Thumbnail image.
    #[serde(default)]
    pub thumbnail: Option<EmbedMedia>,
}

impl Embed {
    /// Image if present, otherwise the thumbnail.
    #[must_use]
    pub fn media(&self) -> Option<&EmbedMedia> {
        self.image.as_ref().or(self.thumbnail.as_ref())
    }

    #[must_use]
    pub const fn has_image(&self) -> bool {
        self.image.is_some() || self.thumbnail.is_some()
    }
}

/// Mentions parsed by Discord out of a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Mentions {
    /// Mentioned users.
    #[serde(default)]
    pub users: Vec<User>,
    /// Guild members for the mentioned users, when sent in a guild.
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Mentions {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.members.is_empty()
    }
}

/// The command prefix and alias that invoked a message, when it was a command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Invocation {
    /// Prefix that started the command, such as `s!` or a bot mention.
    pub prefix: String,
    /// Alias the command was called by.
    pub alias: String,
}

/// Discord message entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Message {
    id: MessageId,
    channel_id: ChannelId,
    guild_id: Option<GuildId>,
    author: User,
    content: String,
    #[serde(default)]
    attachments: Vec<Attachment>,
    #[serde(default)]
    embeds: Vec<Embed>,
    #[serde(default)]
    mentions: Mentions,
    #[serde(default)]
    invocation: Option<Invocation>,
}

#[allow(missing_docs)]
impl Message {
    #[must_use]
    pub fn new(
        id: impl Into<MessageId>,
        channel_id: impl Into<ChannelId>,
        author: User,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            channel_id: channel_id.into(),
            guild_id: None,
            author,
            content: content.into(),
            attachments: Vec::new(),
            embeds: Vec::new(),
            mentions: Mentions::default(),
            invocation: None,
        }
    }

    #[must_use]
    pub fn with_guild(mut self, guild_id: impl Into<GuildId>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    #[must_use]
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    #[must_use]
    pub fn with_embeds(mut self, embeds: Vec<Embed>) -> Self {
        self.embeds = embeds;
        self
    }

    #[must_use]
    pub fn with_mentions(mut self, mentions: Mentions) -> Self {
        self.mentions = mentions;
        self
    }

    #[must_use]
    pub fn with_invocation(mut self, prefix: impl Into<String>, alias: impl Into<String>) -> Self {
        self.invocation = Some(Invocation {
            prefix: prefix.into(),
            alias: alias.into(),
        });
        self
    }

    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    #[must_use]
    pub const fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    #[must_use]
    pub const fn guild_id(&self) -> Option<GuildId> {
        self.guild_id
    }

    #[must_use]
    pub const fn author(&self) -> &User {
        &self.author
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    #[must_use]
    pub fn embeds(&self) -> &[Embed] {
        &self.embeds
    }

    #[must_use]
    pub const fn mentions(&self) -> &Mentions {
        &self.mentions
    }

    #[must_use]
    pub const fn invocation(&self) -> Option<&Invocation> {
        self.invocation.as_ref()
    }

    /// Whether the message carries an image attachment or an embed image.
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.embeds.iter().any(Embed::has_image)
            || self.attachments.iter().any(Attachment::is_image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> User {
        User::new(1_u64, "satania", "0", None)
    }

    #[test]
    fn test_message_id_ordering_is_numeric() {
        assert!(MessageId::from("10") > MessageId::from("9"));
        assert!(MessageId(1_000_000_000_000_000_000) > MessageId(999_999_999_999_999_999));
    }

    #[test]
    fn test_embed_media_prefers_image() {
        let embed = Embed {
            image: Some(EmbedMedia::new("https://a.example/image.png")),
            thumbnail: Some(EmbedMedia::new("https://a.example/thumb.png")),
        };

        assert_eq!(
            embed.media().map(|m| m.url.as_str()),
            Some("https://a.example/image.png")
        );
    }

    #[test]
    fn test_embed_media_fetch_url_prefers_proxy() {
        let media = EmbedMedia::new("https://a.example/image.png")
            .with_proxy_url("https://media.discordapp.net/external/x/image.png");

        assert_eq!(
            media.fetch_url(),
            "https://media.discordapp.net/external/x/image.png"
        );
    }

    #[test]
    fn test_has_image() {
        let plain = Message::new(1_u64, 2_u64, author(), "hi")
            .with_attachments(vec![Attachment::new("notes.txt", "https://a/notes.txt")]);
        assert!(!plain.has_image());

        let picture = Message::new(1_u64, 2_u64, author(), "hi").with_attachments(vec![
            Attachment::new("cat.png", "https://a/cat.png").with_dimensions(10, 10),
        ]);
        assert!(picture.has_image());

        let embedded = Message::new(1_u64, 2_u64, author(), "hi").with_embeds(vec![Embed {
            image: None,
            thumbnail: Some(EmbedMedia::new("https://a/thumb.png")),
        }]);
        assert!(embedded.has_image());
    }
}
