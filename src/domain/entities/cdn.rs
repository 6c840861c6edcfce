//! Discord and emoji CDN URL builders.

/// Discord CDN origin.
pub const BASE: &str = "https://cdn.discordapp.com";

/// Vector emoji set served by jsDelivr.
pub const TWEMOJI_BASE: &str = "https://cdn.jsdelivr.net/gh/jdecked/twemoji@latest/assets/svg";

const ZWJ: char = '\u{200D}';
const VARIATION_SELECTOR_16: char = '\u{FE0F}';

/// Custom emoji URL, as a GIF when animated.
#[must_use]
pub fn custom_emoji_url(id: u64, animated: bool) -> String {
    let ext = if animated { "gif" } else { "png" };
    format!("{BASE}/emojis/{id}.{ext}")
}

/// Vector URL for a native emoji sequence.
///
/// Variation selector 16 is dropped unless the sequence is joined with a
/// zero width joiner, since the emoji set names its files that way.
#[must_use]
pub fn twemoji_url(sequence: &str) -> String {
    let keep_selector = sequence.contains(ZWJ);
    let codepoints: Vec<String> = sequence
        .chars()
        .filter(|c| keep_selector || *c != VARIATION_SELECTOR_16)
        .map(|c| format!("{:x}", u32::from(c)))
        .collect();

    format!("{TWEMOJI_BASE}/{}.svg", codepoints.join("-"))
}
