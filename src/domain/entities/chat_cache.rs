use std::collections::{BTreeMap, HashMap};

use super::{
    Channel, ChannelId, EmojiId, Guild, GuildEmoji, GuildId, Member, Message, MessageId, User,
    UserId,
};

/// Snapshot of what the client knows about the chat it is connected to.
///
/// Messages are kept per channel, ordered by snowflake, so newest-first
/// scans are a reverse iteration.
#[derive(Debug, Clone, Default)]
pub struct ChatCache {
    current_user: Option<UserId>,
    guilds: HashMap<GuildId, Guild>,
    members: HashMap<(GuildId, UserId), Member>,
    channels: HashMap<ChannelId, Channel>,
    messages: HashMap<ChannelId, BTreeMap<MessageId, Message>>,
    emojis: HashMap<EmojiId, GuildEmoji>,
}

impl ChatCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_current_user(mut self, user_id: impl Into<UserId>) -> Self {
        self.current_user = Some(user_id.into());
        self
    }

    pub fn insert_guild(&mut self, guild: Guild) {
        self.guilds.insert(guild.id(), guild);
    }

    pub fn insert_member(&mut self, member: Member) {
        self.members
            .insert((member.guild_id(), member.user_id()), member);
    }

    pub fn insert_channel(&mut self, channel: Channel) {
        self.channels.insert(channel.id(), channel);
    }

    pub fn insert_message(&mut self, message: Message) {
        self.messages
            .entry(message.channel_id())
            .or_default()
            .insert(message.id(), message);
    }

    pub fn insert_emoji(&mut self, emoji: GuildEmoji) {
        self.emojis.insert(emoji.id(), emoji);
    }

    #[must_use]
    pub fn is_current_user(&self, user: &User) -> bool {
        self.current_user == Some(user.id())
    }

    #[must_use]
    pub fn guild(&self, guild_id: GuildId) -> Option<&Guild> {
        self.guilds.get(&guild_id)
    }

    #[must_use]
    pub fn member(&self, guild_id: GuildId, user_id: UserId) -> Option<&Member> {
        self.members.get(&(guild_id, user_id))
    }

    #[must_use]
    pub fn channel(&self, channel_id: ChannelId) -> Option<&Channel> {
        self.channels.get(&channel_id)
    }

    #[must_use]
    pub fn emoji(&self, emoji_id: EmojiId) -> Option<&GuildEmoji> {
        self.emojis.get(&emoji_id)
    }

    #[must_use]
    pub fn message(&self, channel_id: ChannelId, message_id: MessageId) -> Option<&Message> {
        self.messages.get(&channel_id)?.get(&message_id)
    }

    /// Cached messages of a channel, newest first.
    pub fn recent_messages(&self, channel_id: ChannelId) -> impl Iterator<Item = &Message> {
        self.messages
            .get(&channel_id)
            .into_iter()
            .flat_map(|messages| messages.values().rev())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: u64) -> Message {
        let author = User::new(1_u64, "satania", "0", None);
        Message::new(id, 5_u64, author, format!("message {id}"))
    }

    #[test]
    fn test_recent_messages_newest_first() {
        let mut cache = ChatCache::new();
        for id in [9_u64, 10, 100, 2] {
            cache.insert_message(message(id));
        }

        let ids: Vec<u64> = cache
            .recent_messages(ChannelId(5))
            .map(|m| m.id().as_u64())
            .collect();
        assert_eq!(ids, vec![100, 10, 9, 2]);
    }

    #[test]
    fn test_unknown_channel_has_no_messages() {
        let cache = ChatCache::new();
        assert_eq!(cache.recent_messages(ChannelId(5)).count(), 0);
    }

    #[test]
    fn test_member_lookup() {
        let mut cache = ChatCache::new().with_current_user(1_u64);
        let user = User::new(1_u64, "satania", "0", None);
        cache.insert_member(Member::new(3_u64, user.clone()).with_nick("Satan"));

        assert!(cache.is_current_user(&user));
        assert_eq!(
            cache.member(GuildId(3), UserId(1)).map(Member::display_name),
            Some("Satan")
        );
        assert!(cache.member(GuildId(4), UserId(1)).is_none());
    }

    #[test]
    fn test_message_lookup() {
        let mut cache = ChatCache::new();
        cache.insert_message(message(42));

        assert!(cache.message(ChannelId(5), MessageId(42)).is_some());
        assert!(cache.message(ChannelId(6), MessageId(42)).is_none());
    }
}
