//! URL and emoji extraction from message text, following Discord's rules.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::entities::{Emoji, Link};

/// Characters Discord drops from the end of an undelimited URL.
const TRAILING_PUNCTUATION: [char; 8] = ['.', ',', ':', ';', '"', '\'', ']', ')'];

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:<(https?://[^ >]+)>|(https?://[^\s<]{2,}))").expect("url regex is valid")
});

static CUSTOM_EMOJI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(a?):(\w+):(\d+)>").expect("custom emoji regex is valid"));

// Flags, keycaps, then pictographs (text presentation included) with optional
// variation selector, skin tone, tag sequence and zero width joiner chains.
static NATIVE_EMOJI_RE: LazyLock<Regex> = LazyLock::new(|| {
    let atom = r"(?:\p{Extended_Pictographic}\x{FE0F}?\p{Emoji_Modifier}?|\p{Emoji_Presentation}\p{Emoji_Modifier}?)";
    let pattern = format!(
        r"\p{{Regional_Indicator}}{{2}}|[0-9#*]\x{{FE0F}}?\x{{20E3}}|{atom}(?:[\x{{E0020}}-\x{{E007E}}]+\x{{E007F}})?(?:\x{{200D}}{atom})*"
    );
    Regex::new(&pattern).expect("emoji regex is valid")
});

/// Stateless matcher for links and emoji in chat text.
pub struct LinkMatcher;

impl LinkMatcher {
    /// Finds every URL in `text`, left to right.
    ///
    /// `<url>` spans are taken verbatim; bare URLs lose trailing punctuation
    /// the way Discord trims them.
    #[must_use]
    pub fn match_urls(text: &str) -> Vec<Link> {
        if !text.contains(":/") {
            return Vec::new();
        }

        URL_RE
            .captures_iter(text)
            .filter_map(|cap| {
                let whole = cap.get(0)?;
                let start = whole.start();

                if let Some(delimited) = cap.get(1) {
                    return Some(Link::new(delimited.as_str(), start, whole.end(), true));
                }

                let url = Self::trim_url(cap.get(2)?.as_str());
                Some(Link::new(url, start, start + url.len(), false))
            })
            .collect()
    }

    /// Finds custom and native emoji in `text`, ordered by position.
    #[must_use]
    pub fn match_emojis(text: &str) -> Vec<Emoji> {
        let custom = CUSTOM_EMOJI_RE.captures_iter(text).filter_map(|cap| {
            let whole = cap.get(0)?;
            let animated = cap.get(1).is_some_and(|m| !m.as_str().is_empty());
            let name = cap.get(2)?.as_str();
            let id: u64 = cap.get(3)?.as_str().parse().ok()?;

            Some(Emoji::custom(name, id, animated, whole.start(), whole.end()))
        });

        let native = NATIVE_EMOJI_RE
            .find_iter(text)
            .map(|m| Emoji::native(m.as_str(), m.start(), m.end()));

        let mut emojis: Vec<Emoji> = custom.chain(native).collect();
        emojis.sort_by_key(Emoji::start);
        emojis
    }

    /// Strips trailing punctuation one character at a time.
    ///
    /// A closing parenthesis survives when the URL has at least as many
    /// opening ones, and trimming stops at the first parenthesis either way.
    #[must_use]
    pub fn trim_url(url: &str) -> &str {
        let mut url = url;

        while let Some(last) = url.chars().next_back() {
            if !TRAILING_PUNCTUATION.contains(&last) {
                break;
            }

            if last == ')' && url.matches('(').count() >= url.matches(')').count() {
                break;
            }

            url = &url[..url.len() - last.len_utf8()];

            if last == ')' {
                break;
            }
        }

        url
    }
}
