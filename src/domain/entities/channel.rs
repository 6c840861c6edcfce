//! Discord channel entity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{GuildId, User, UserId, cdn};

/// Unique identifier for a Discord channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

impl ChannelId {
    /// Returns the underlying u64 value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChannelId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<&str> for ChannelId {
    fn from(value: &str) -> Self {
        Self(value.parse().unwrap_or(0))
    }
}

/// Where a channel lives and who can see it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChannelKind {
    /// Text channel inside a guild.
    Guild {
        /// Owning guild.
        guild_id: GuildId,
        /// Channel name, without the leading `#`.
        name: String,
    },
    /// One to one direct message.
    Dm {
        /// The other participant.
        recipient: User,
    },
    /// Group direct message.
    Group {
        /// Explicit group name.
        name: Option<String>,
        /// Group icon hash.
        icon: Option<String>,
        /// Participants, possibly including the current user.
        recipients: Vec<User>,
        /// Per-group nicknames.
        #[serde(default)]
        nicks: HashMap<UserId, String>,
    },
}

/// Discord channel information.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Channel {
    id: ChannelId,
    kind: ChannelKind,
}

impl Channel {
    /// Creates a guild text channel.
    #[must_use]
    pub fn guild(
        id: impl Into<ChannelId>,
        guild_id: impl Into<GuildId>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: ChannelKind::Guild {
                guild_id: guild_id.into(),
                name: name.into(),
            },
        }
    }

    /// Creates a direct message channel.
    #[must_use]
    pub fn dm(id: impl Into<ChannelId>, recipient: User) -> Self {
        Self {
            id: id.into(),
            kind: ChannelKind::Dm { recipient },
        }
    }

    /// Creates an unnamed group channel without an icon.
    #[must_use]
    pub fn group(id: impl Into<ChannelId>, recipients: Vec<User>) -> Self {
        Self {
            id: id.into(),
            kind: ChannelKind::Group {
                name: None,
                icon: None,
                recipients,
                nicks: HashMap::new(),
            },
        }
    }

    /// Sets the group name. No effect on other channel kinds.
    #[must_use]
    pub fn with_group_name(mut self, value: impl Into<String>) -> Self {
        if let ChannelKind::Group { name, .. } = &mut self.kind {
            *name = Some(value.into());
        }
        self
    }

    /// Sets the group icon hash. No effect on other channel kinds.
    #[must_use]
    pub fn with_group_icon(mut self, value: impl Into<String>) -> Self {
        if let ChannelKind::Group { icon, .. } = &mut self.kind {
            *icon = Some(value.into());
        }
        self
    }

    /// Sets a group nickname. No effect on other channel kinds.
    #[must_use]
    pub fn with_group_nick(mut self, user_id: impl Into<UserId>, nick: impl Into<String>) -> Self {
        if let ChannelKind::Group { nicks, .. } = &mut self.kind {
            nicks.insert(user_id.into(), nick.into());
        }
        self
    }

    #[must_use]
    pub const fn id(&self) -> ChannelId {
        self.id
    }

    #[must_use]
    pub const fn kind(&self) -> &ChannelKind {
        &self.kind
    }

    #[must_use]
    pub const fn guild_id(&self) -> Option<GuildId> {
        match &self.kind {
            ChannelKind::Guild { guild_id, .. } => Some(*guild_id),
            _ => None,
        }
    }

    /// Group icon URL, for groups that set one.
    #[must_use]
    pub fn group_icon_url(&self) -> Option<String> {
        match &self.kind {
            ChannelKind::Group {
                icon: Some(hash), ..
            } => Some(format!("{}/channel-icons/{}/{hash}.png", cdn::BASE, self.id)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guild_channel() {
        let channel = Channel::guild(5_u64, 10_u64, "general");

        assert_eq!(channel.id(), ChannelId(5));
        assert_eq!(channel.guild_id(), Some(GuildId(10)));
        assert_eq!(channel.group_icon_url(), None);
    }

    #[test]
    fn test_group_builders() {
        let user = User::new(1_u64, "vigne", "0", None);
        let channel = Channel::group(7_u64, vec![user])
            .with_group_name("Gabriel Dropout")
            .with_group_icon("cafe")
            .with_group_nick(1_u64, "Vigne");

        assert_eq!(channel.guild_id(), None);
        assert_eq!(
            channel.group_icon_url().as_deref(),
            Some("https://cdn.discordapp.com/channel-icons/7/cafe.png")
        );
        let ChannelKind::Group { name, nicks, .. } = channel.kind() else {
            panic!("expected group channel");
        };
        assert_eq!(name.as_deref(), Some("Gabriel Dropout"));
        assert_eq!(nicks.get(&UserId(1)).map(String::as_str), Some("Vigne"));
    }

    #[test]
    fn test_group_builders_ignored_for_dm() {
        let user = User::new(1_u64, "vigne", "0", None);
        let channel = Channel::dm(7_u64, user.clone()).with_group_name("nope");

        assert_eq!(channel.kind(), &ChannelKind::Dm { recipient: user });
    }
}
