//! Human readable names for users, channels and URLs.

use url::Url;

use crate::domain::entities::{Channel, ChannelKind, ChatCache, User};

/// Fallback name for a group without a name or other members.
pub const UNNAMED_GROUP: &str = "Unnamed";

/// The name `user` is shown under in `channel`.
///
/// Group nicknames and guild member nicknames win over the username.
#[must_use]
pub fn nick(user: &User, channel: &Channel, cache: &ChatCache) -> String {
    match channel.kind() {
        ChannelKind::Group { nicks, .. } => nicks.get(&user.id()).cloned(),
        ChannelKind::Guild { guild_id, .. } => cache
            .member(*guild_id, user.id())
            .map(|member| member.display_name().to_string()),
        ChannelKind::Dm { .. } => None,
    }
    .unwrap_or_else(|| user.username().to_string())
}

/// The name a channel is listed under.
#[must_use]
pub fn channel_name(channel: &Channel, cache: &ChatCache) -> String {
    match channel.kind() {
        ChannelKind::Guild { name, .. } => name.clone(),
        ChannelKind::Dm { recipient } => recipient.username().to_string(),
        ChannelKind::Group {
            name: Some(name), ..
        } => name.clone(),
        ChannelKind::Group { recipients, .. } => {
            let names: Vec<String> = recipients
                .iter()
                .filter(|user| !cache.is_current_user(user))
                .map(|user| nick(user, channel, cache))
                .collect();

            if names.is_empty() {
                UNNAMED_GROUP.to_string()
            } else {
                names.join(", ")
            }
        }
    }
}

/// Icon of a channel and its animated variant.
///
/// Guild channels use the guild icon, DMs the recipient's avatar, groups
/// their own icon or else the first other member's avatar.
#[must_use]
pub fn channel_icon(channel: &Channel, cache: &ChatCache) -> Option<(String, Option<String>)> {
    match channel.kind() {
        ChannelKind::Guild { guild_id, .. } => {
            let guild = cache.guild(*guild_id)?;
            Some((guild.icon_url()?, guild.animated_icon_url()))
        }
        ChannelKind::Dm { recipient } => {
            Some((recipient.avatar_url(), recipient.animated_avatar_url()))
        }
        ChannelKind::Group { recipients, .. } => channel.group_icon_url().map_or_else(
            || {
                recipients
                    .iter()
                    .find(|user| !cache.is_current_user(user))
                    .map(|user| (user.avatar_url(), user.animated_avatar_url()))
            },
            |icon| Some((icon, None)),
        ),
    }
}

/// Host of a URL, without `www.` and with punycode decoded.
///
/// Input that does not parse as a URL is returned unchanged.
#[must_use]
pub fn domain(url: &str) -> String {
    humanize(url, false)
}

/// Like [`domain`], followed by the path without its trailing slash.
#[must_use]
pub fn domain_with_path(url: &str) -> String {
    humanize(url, true)
}

fn humanize(input: &str, with_path: bool) -> String {
    let Ok(url) = Url::parse(input) else {
        return input.to_string();
    };
    let Some(host) = url.host_str() else {
        return input.to_string();
    };

    let labels: Vec<&str> = host.split('.').collect();
    let host = if labels.len() >= 3 && labels[0] == "www" {
        labels[1..].join(".")
    } else {
        host.to_string()
    };

    let (host, _) = idna::domain_to_unicode(&host);
    let mut name = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host,
    };

    if with_path {
        name.push_str(url.path().trim_end_matches('/'));
    }

    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Guild, Member};
    use test_case::test_case;

    #[test_case("https://www.google.com/page/", "google.com" ; "strips www")]
    #[test_case("https://www.com/", "www.com" ; "keeps www of two labels")]
    #[test_case("https://www.xn--espaol-zwa.com/", "español.com" ; "decodes punycode")]
    #[test_case("http://localhost:8080/x", "localhost:8080" ; "keeps port")]
    #[test_case("not a url", "not a url" ; "unparseable")]
    fn test_domain(input: &str, expected: &str) {
        assert_eq!(domain(input), expected);
    }

    #[test_case("https://www.google.com/page/", "google.com/page" ; "trailing slash")]
    #[test_case("https://example.com", "example.com" ; "root path")]
    #[test_case("https://example.com/a/b.png", "example.com/a/b.png" ; "file")]
    fn test_domain_with_path(input: &str, expected: &str) {
        assert_eq!(domain_with_path(input), expected);
    }

    fn user(id: u64, name: &str) -> User {
        User::new(id, name, "0", None)
    }

    #[test]
    fn test_nick_in_guild_uses_member_nickname() {
        let mut cache = ChatCache::new();
        let satania = user(1, "satania");
        cache.insert_member(Member::new(10_u64, satania.clone()).with_nick("Great Archdemon"));
        let channel = Channel::guild(5_u64, 10_u64, "general");

        assert_eq!(nick(&satania, &channel, &cache), "Great Archdemon");
        assert_eq!(nick(&user(2, "gabriel"), &channel, &cache), "gabriel");
    }

    #[test]
    fn test_nick_in_group_uses_group_nickname() {
        let cache = ChatCache::new();
        let raphiel = user(3, "raphiel");
        let channel =
            Channel::group(5_u64, vec![raphiel.clone()]).with_group_nick(3_u64, "Raphi");

        assert_eq!(nick(&raphiel, &channel, &cache), "Raphi");
    }

    #[test]
    fn test_channel_name_variants() {
        let cache = ChatCache::new().with_current_user(1_u64);

        let guild_channel = Channel::guild(5_u64, 10_u64, "general");
        assert_eq!(channel_name(&guild_channel, &cache), "general");

        let dm = Channel::dm(6_u64, user(2, "gabriel"));
        assert_eq!(channel_name(&dm, &cache), "gabriel");

        let named = Channel::group(7_u64, vec![user(2, "gabriel")]).with_group_name("Dropouts");
        assert_eq!(channel_name(&named, &cache), "Dropouts");

        let members = vec![user(1, "me"), user(2, "gabriel"), user(3, "vigne")];
        let unnamed = Channel::group(8_u64, members).with_group_nick(3_u64, "Vigne");
        assert_eq!(channel_name(&unnamed, &cache), "gabriel, Vigne");

        let alone = Channel::group(9_u64, vec![user(1, "me")]);
        assert_eq!(channel_name(&alone, &cache), UNNAMED_GROUP);
    }

    #[test]
    fn test_channel_icon_variants() {
        let mut cache = ChatCache::new().with_current_user(1_u64);
        cache.insert_guild(Guild::new(10_u64, "Heaven").with_icon("halo"));

        let guild_channel = Channel::guild(5_u64, 10_u64, "general");
        assert_eq!(
            channel_icon(&guild_channel, &cache).map(|(url, _)| url),
            Some("https://cdn.discordapp.com/icons/10/halo.png".to_string())
        );

        let iconless_guild_channel = Channel::guild(5_u64, 11_u64, "general");
        assert_eq!(channel_icon(&iconless_guild_channel, &cache), None);

        let group = Channel::group(7_u64, vec![user(1, "me"), user(2, "gabriel")]);
        assert_eq!(
            channel_icon(&group, &cache).map(|(url, _)| url),
            Some(user(2, "gabriel").avatar_url())
        );

        let iconic = group.with_group_icon("cafe");
        assert_eq!(
            channel_icon(&iconic, &cache),
            Some((
                "https://cdn.discordapp.com/channel-icons/7/cafe.png".to_string(),
                None
            ))
        );
    }
}
