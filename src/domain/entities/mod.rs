//! Domain entity definitions.

pub mod cdn;
mod channel;
mod chat_cache;
mod emoji;
mod guild;
mod layer;
mod link;
mod media_type;
mod member;
mod message;
mod resolved_link;
mod user;

pub use channel::{Channel, ChannelId, ChannelKind};
pub use chat_cache::ChatCache;
pub use emoji::{Emoji, EmojiId, EmojiKind, GuildEmoji};
pub use guild::{Guild, GuildId};
pub use layer::{
    Background, ImageLayer, LayerOptions, LayerSource, RawLayer, ResizeFit, Rotation,
};
pub use link::Link;
pub use media_type::{MediaType, accept_header, is_svg, parse_xml};
pub use member::Member;
pub use message::{Attachment, Embed, EmbedMedia, Invocation, Mentions, Message, MessageId};
pub use resolved_link::{Candidate, LinkKind, ResolvedLink};
pub use user::{User, UserId};
