//! Finds the most relevant image for anything a command can be pointed at.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};
use unicode_normalization::UnicodeNormalization;

use super::link_matcher::LinkMatcher;
use super::names::{channel_icon, channel_name, domain, nick};
use crate::domain::entities::{
    Attachment, Candidate, Channel, ChannelId, ChatCache, Embed, Emoji, Guild, Link, LinkKind,
    Member, Message, ResolvedLink, User,
};

const WORD_JOINER: &str = "\u{2060}";

static RAW_MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(@[!&]?\d+)>").expect("mention regex is valid"));

static EVERYONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(everyone|here)").expect("everyone regex is valid"));

// `^` and the look-alikes people type on other keyboards.
static LAST_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\^＾˄ˆᶺ⌃\s]+$").expect("caret regex is valid"));

/// Resolves candidates against a chat snapshot.
///
/// Resolution never suspends: the "last image" lookup reads the cache.
#[derive(Debug, Clone, Copy)]
pub struct LinkResolver<'a> {
    cache: &'a ChatCache,
}

impl<'a> LinkResolver<'a> {
    #[must_use]
    pub const fn new(cache: &'a ChatCache) -> Self {
        Self { cache }
    }

    /// Resolves one candidate, or the first resolvable item of a group.
    ///
    /// Groups are walked depth first in their own order. The returned name
    /// can never ping anyone.
    #[must_use]
    pub fn resolve(&self, candidate: impl Into<Candidate<'a>>) -> Option<ResolvedLink<'a>> {
        let link = self.resolve_candidate(candidate.into())?;
        let name = sanitize_name(link.name());

        debug!(kind = %link.kind(), url = %link.url(), "Resolved link");
        Some(link.with_name(name))
    }

    /// Resolves the first candidate that yields a link.
    #[must_use]
    pub fn resolve_any<I, T>(&self, candidates: I) -> Option<ResolvedLink<'a>>
    where
        I: IntoIterator<Item = T>,
        T: Into<Candidate<'a>>,
    {
        self.resolve(Candidate::many(candidates))
    }

    fn resolve_candidate(&self, candidate: Candidate<'a>) -> Option<ResolvedLink<'a>> {
        match candidate {
            Candidate::Many(items) => items
                .into_iter()
                .find_map(|item| self.resolve_candidate(item)),
            Candidate::Mentions(mentions) => self.resolve_candidate(Candidate::Many(vec![
                Candidate::many(&mentions.members),
                Candidate::many(&mentions.users),
            ])),
            Candidate::Message(message) => self.resolve_message(message),
            Candidate::Guild(guild) => resolve_guild(guild),
            Candidate::User(user) => resolve_user(user),
            Candidate::Member(member) => resolve_member(member),
            Candidate::Attachment(attachment) => resolve_attachment(attachment),
            Candidate::Embed(embed) => resolve_embed(embed),
            Candidate::Link(link) => resolve_link(link),
            Candidate::Emoji(emoji) => self.resolve_emoji(emoji),
            Candidate::Channel(channel) => self.resolve_channel(channel),
        }
    }

    fn resolve_emoji(&self, emoji: Emoji) -> Option<ResolvedLink<'a>> {
        let name = emoji
            .id()
            .and_then(|id| self.cache.emoji(id))
            .map_or_else(|| emoji.to_string(), ToString::to_string);
        let url = emoji.static_url();
        let animated_url = emoji.animated_url();

        ResolvedLink::new(LinkKind::Emoji, url, name, Candidate::Emoji(emoji))
            .map(|link| link.with_animated_url(animated_url))
    }

    fn resolve_channel(&self, channel: &'a Channel) -> Option<ResolvedLink<'a>> {
        let (url, animated_url) = channel_icon(channel, self.cache)?;
        let name = channel_name(channel, self.cache);

        ResolvedLink::new(LinkKind::Channel, url, name, Candidate::Channel(channel))
            .map(|link| link.with_animated_url(animated_url))
    }

    /// Attachments, then linked URLs, mentions, emoji, the guild or channel
    /// itself, embeds and finally the last image of the channel.
    fn resolve_message(&self, message: &'a Message) -> Option<ResolvedLink<'a>> {
        let args = command_args(message);
        let channel = self.cache.channel(message.channel_id());

        let mut candidates = vec![
            Candidate::many(message.attachments()),
            Candidate::many(LinkMatcher::match_urls(args)),
            Candidate::Mentions(message.mentions()),
            Candidate::many(LinkMatcher::match_emojis(args)),
        ];

        if let Some(container) = self.container(message, channel) {
            if self.names_container(args, &container) {
                trace!(message = %message.id(), "Message points at its guild or channel");
                candidates.push(container);
            }
        }

        candidates.push(Candidate::many(message.embeds()));

        if LAST_IMAGE_RE.is_match(args.trim()) {
            if let Some(last) = last_image(message.channel_id(), self.cache) {
                trace!(message = %message.id(), last = %last.id(), "Using last image");
                candidates.push(Candidate::many(last.attachments()));
                candidates.push(Candidate::many(last.embeds()));
            }
        }

        let link = self.resolve_candidate(Candidate::Many(candidates))?;

        let shown_as = match (link.source(), channel) {
            (Candidate::User(user), Some(channel)) if link.kind() == LinkKind::User => {
                Some(nick(user, channel, self.cache))
            }
            _ => None,
        };

        Some(match shown_as {
            Some(name) => link.with_name(name),
            None => link,
        })
    }

    /// The guild of a guild message, otherwise its channel.
    fn container(&self, message: &Message, channel: Option<&'a Channel>) -> Option<Candidate<'a>> {
        match message.guild_id().and_then(|id| self.cache.guild(id)) {
            Some(guild) => Some(Candidate::Guild(guild)),
            None => channel.map(Candidate::Channel),
        }
    }

    fn names_container(&self, args: &str, container: &Candidate<'a>) -> bool {
        if EVERYONE_RE.is_match(args) {
            return true;
        }

        let name = match container {
            Candidate::Guild(guild) => guild.name().to_string(),
            Candidate::Channel(channel) => channel_name(channel, self.cache),
            _ => return false,
        };

        !name.trim().is_empty() && normalize(args).contains(&normalize(&name))
    }
}

fn resolve_guild(guild: &Guild) -> Option<ResolvedLink<'_>> {
    ResolvedLink::new(
        LinkKind::Guild,
        guild.icon_url()?,
        guild.name(),
        Candidate::Guild(guild),
    )
    .map(|link| link.with_animated_url(guild.animated_icon_url()))
}

fn resolve_user(user: &User) -> Option<ResolvedLink<'_>> {
    ResolvedLink::new(
        LinkKind::User,
        user.avatar_url(),
        user.username(),
        Candidate::User(user),
    )
    .map(|link| link.with_animated_url(user.animated_avatar_url()))
}

fn resolve_member(member: &Member) -> Option<ResolvedLink<'_>> {
    let user = member.user();

    ResolvedLink::new(
        LinkKind::Member,
        user.avatar_url(),
        member.display_name(),
        Candidate::Member(member),
    )
    .map(|link| link.with_animated_url(user.animated_avatar_url()))
}

fn resolve_attachment(attachment: &Attachment) -> Option<ResolvedLink<'_>> {
    ResolvedLink::new(
        LinkKind::Attachment,
        attachment.url(),
        attachment.filename(),
        Candidate::Attachment(attachment),
    )
}

fn resolve_embed(embed: &Embed) -> Option<ResolvedLink<'_>> {
    let media = embed.media()?;

    ResolvedLink::new(
        LinkKind::Embed,
        media.fetch_url(),
        domain(&media.url),
        Candidate::Embed(embed),
    )
}

fn resolve_link<'a>(link: Link) -> Option<ResolvedLink<'a>> {
    let url = link.url().to_string();
    let name = domain(&url);

    ResolvedLink::new(LinkKind::Link, url, name, Candidate::Link(link))
}

/// Message content without the command prefix and alias.
#[must_use]
pub fn command_args(message: &Message) -> &str {
    let content = message.content();
    let Some(invocation) = message.invocation() else {
        return content;
    };
    let Some(index) = content.find(&invocation.prefix) else {
        return content;
    };

    let rest = content[index + invocation.prefix.len()..].trim_start();
    let alias_len = invocation.alias.len();
    let rest = match rest.get(..alias_len) {
        Some(head) if head.eq_ignore_ascii_case(&invocation.alias) => &rest[alias_len..],
        _ => rest,
    };

    rest.trim_start()
}

/// The newest cached message of a channel carrying an image.
#[must_use]
pub fn last_image(channel_id: ChannelId, cache: &ChatCache) -> Option<&Message> {
    cache
        .recent_messages(channel_id)
        .find(|message| message.has_image())
}

/// Every cached message of a channel carrying an image, newest first.
#[must_use]
pub fn last_images(channel_id: ChannelId, cache: &ChatCache) -> Vec<&Message> {
    cache
        .recent_messages(channel_id)
        .filter(|message| message.has_image())
        .collect()
}

/// Defuses user, role, `@everyone` and `@here` mentions with a word joiner.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    let name = RAW_MENTION_RE.replace_all(name, format!("<{WORD_JOINER}${{1}}>"));
    EVERYONE_RE
        .replace_all(&name, format!("@{WORD_JOINER}${{1}}"))
        .into_owned()
}

fn normalize(text: &str) -> String {
    text.to_lowercase().nfc().collect()
}
