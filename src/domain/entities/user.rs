//! Discord user entity.

use serde::{Deserialize, Serialize};

use super::cdn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl UserId {
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.parse().unwrap_or(0))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: String,
    discriminator: String,
    avatar: Option<String>,
}

impl User {
    #[must_use]
    pub fn new(
        id: impl Into<UserId>,
        username: impl Into<String>,
        discriminator: impl Into<String>,
        avatar: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            discriminator: discriminator.into(),
            avatar,
        }
    }

    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }

    #[must_use]
    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    #[must_use]
    pub fn is_migrated(&self) -> bool {
        self.discriminator == "0"
    }

    /// Returns true if the avatar hash marks an animated avatar.
    #[must_use]
    pub fn has_animated_avatar(&self) -> bool {
        self.avatar.as_deref().is_some_and(|hash| hash.starts_with("a_"))
    }

    /// Static avatar URL, falling back to the default avatar.
    #[must_use]
    pub fn avatar_url(&self) -> String {
        match self.avatar.as_deref() {
            Some(hash) => format!("{}/avatars/{}/{hash}.webp", cdn::BASE, self.id),
            None => self.default_avatar_url(),
        }
    }

    /// Animated avatar URL, only for animated avatar hashes.
    #[must_use]
    pub fn animated_avatar_url(&self) -> Option<String> {
        self.has_animated_avatar().then(|| {
            format!(
                "{}/avatars/{}/{}.gif",
                cdn::BASE,
                self.id,
                self.avatar.as_deref().unwrap_or_default()
            )
        })
    }

    #[must_use]
    pub fn default_avatar_url(&self) -> String {
        let index = if self.is_migrated() {
            (self.id.as_u64() >> 22) % 6
        } else {
            self.discriminator.parse::<u64>().unwrap_or(0) % 5
        };

        format!("{}/embed/avatars/{index}.png", cdn::BASE)
    }
}
