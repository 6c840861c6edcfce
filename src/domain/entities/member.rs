use serde::{Deserialize, Serialize};

use super::{GuildId, User, UserId};

/// A user's membership in one guild.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Member {
    guild_id: GuildId,
    user: User,
    nick: Option<String>,
}

impl Member {
    #[must_use]
    pub fn new(guild_id: impl Into<GuildId>, user: User) -> Self {
        Self {
            guild_id: guild_id.into(),
            user,
            nick: None,
        }
    }

    #[must_use]
    pub fn with_nick(mut self, nick: impl Into<String>) -> Self {
        self.nick = Some(nick.into());
        self
    }

    #[must_use]
    pub const fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    #[must_use]
    pub const fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user.id()
    }

    #[must_use]
    pub fn nick(&self) -> Option<&str> {
        self.nick.as_deref()
    }

    /// Nickname if set, otherwise the username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.nick.as_deref().unwrap_or_else(|| self.user.username())
    }
}
