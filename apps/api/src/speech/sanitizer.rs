//! Speech-safe text sanitizer.
//!
//! Strips the artifacts an LLM answer carries that a TTS engine would read
//! aloud verbatim: markdown links, HTML anchors, bare URLs, citation markers,
//! attribution lines and emoji. Rules run in a fixed order and the whole
//! chain repeats until the text stops changing, so the output is always a
//! fixed point (`sanitize(sanitize(t)) == sanitize(t)`).

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use thiserror::Error;

/// Attribution markers stripped when no configuration overrides them.
pub const DEFAULT_ATTRIBUTION_MARKERS: &[&str] = &["Source:", "Sources:"];

/// `[label](url)`. The label may not contain brackets so nested links unwrap
/// innermost first. The url may hold one level of balanced parentheses, as
/// in `wiki/Cheetah_(animal)`.
static MARKDOWN_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([^\[\]]*)\]\((?:[^()]|\([^()]*\))*\)").expect("markdown link regex")
});

static HTML_ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<a\b[^>]*>(.*?)</a\s*>").expect("html anchor regex")
});

static BARE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)https?://\S+").expect("bare url regex"));

static WWW_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bwww\.\S+").expect("www address regex"));

/// `[3]`, `[1, 2]`, `[1-3]`, `[1–3]`.
static CITATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\d+(?:\s*[,\-\x{2013}]\s*\d+)*\]").expect("citation regex")
});

const PICTOGRAPH: &str = concat!(
    r"[\x{1F000}-\x{1FAFF}\x{2600}-\x{27BF}\x{2B1B}\x{2B1C}\x{2B50}\x{2B55}",
    r"\x{231A}\x{231B}\x{23E9}-\x{23F3}\x{23F8}-\x{23FA}]",
);

/// Two regional indicators make one flag.
const FLAG: &str = r"[\x{1F1E6}-\x{1F1FF}]{2}";

/// Variation selectors, keycap, skin tones and tag characters.
const EMOJI_MODIFIER: &str = r"[\x{FE0E}\x{FE0F}\x{20E3}\x{1F3FB}-\x{1F3FF}\x{E0020}-\x{E007F}]";

/// One whole emoji: a flag or pictograph with its modifiers, chained by ZWJ
/// into family and profession sequences.
pub(crate) static EMOJI_SEQUENCE: Lazy<String> = Lazy::new(|| {
    let unit = format!("(?:{FLAG}|{PICTOGRAPH}){EMOJI_MODIFIER}*");
    format!(r"{unit}(?:\x{{200D}}{unit})*\x{{200D}}?")
});

/// Whole emoji sequences, plus stray selectors and keycap marks.
static EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"{}|[\x{{FE0F}}\x{{20E3}}]+", *EMOJI_SEQUENCE)).expect("emoji regex")
});

static DEFAULT_SANITIZER: Lazy<Sanitizer> = Lazy::new(Sanitizer::default);

#[derive(Debug, Error)]
pub enum SanitizerError {
    #[error("invalid attribution marker pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// How many artifacts of each kind were stripped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Removals {
    pub links: usize,
    pub anchors: usize,
    pub urls: usize,
    pub www_addresses: usize,
    pub citations: usize,
    pub attribution_lines: usize,
    pub emoji: usize,
}

impl Removals {
    pub fn total(&self) -> usize {
        self.markup() + self.emoji
    }

    /// Everything except emoji.
    pub fn markup(&self) -> usize {
        self.links
            + self.anchors
            + self.urls
            + self.www_addresses
            + self.citations
            + self.attribution_lines
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    pub text: String,
    pub removals: Removals,
}

/// Ordered chain of speech-safety rules.
///
/// Only the attribution rule is configurable; the rest are fixed patterns
/// shared by every instance.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    attribution_line: Option<Regex>,
}

impl Sanitizer {
    /// Builds a sanitizer that drops every line opening with one of `markers`.
    ///
    /// Markers match literally and case-insensitively, after optional leading
    /// whitespace and list/emphasis decoration (`- `, `> `, `**`). A marker
    /// ending in `:` also matches with emphasis before the colon
    /// (`**Source**:`). Blank markers are ignored; an empty set disables the
    /// attribution rule.
    pub fn new<S: AsRef<str>>(markers: &[S]) -> Result<Self, SanitizerError> {
        let alternatives: Vec<String> = markers
            .iter()
            .map(|m| m.as_ref().trim())
            .filter(|m| !m.is_empty())
            .map(marker_pattern)
            .collect();

        let attribution_line = if alternatives.is_empty() {
            None
        } else {
            let pattern = format!(
                r"(?im)^[ \t]*(?:[-*>_][ \t]*)*(?:{})[^\n]*",
                alternatives.join("|")
            );
            Some(Regex::new(&pattern)?)
        };

        Ok(Self { attribution_line })
    }

    pub fn sanitize(&self, text: &str) -> Sanitized {
        let mut removals = Removals::default();
        let mut current = text.to_string();

        // Each effective rule shrinks the text, so this terminates.
        loop {
            let next = self.apply_rules(&current, &mut removals);
            if next == current {
                break;
            }
            current = next;
        }

        Sanitized {
            text: current,
            removals,
        }
    }

    fn apply_rules(&self, text: &str, removals: &mut Removals) -> String {
        let text = unwrap_label(&MARKDOWN_LINK, text, &mut removals.links);
        let text = unwrap_label(&HTML_ANCHOR, &text, &mut removals.anchors);
        let text = strip(&BARE_URL, &text, &mut removals.urls);
        let text = strip(&WWW_ADDRESS, &text, &mut removals.www_addresses);
        let text = strip(&CITATION, &text, &mut removals.citations);
        let text = match &self.attribution_line {
            Some(re) => strip(re, &text, &mut removals.attribution_lines),
            None => text,
        };
        strip(&EMOJI, &text, &mut removals.emoji)
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(DEFAULT_ATTRIBUTION_MARKERS).expect("default attribution markers are literal")
    }
}

/// Sanitizes `text` with the default rule set.
#[cfg_attr(not(test), allow(dead_code))]
pub fn sanitize(text: &str) -> String {
    DEFAULT_SANITIZER.sanitize(text).text
}

/// Number of whole emoji in `text`; a skin-toned thumb, a flag or a ZWJ
/// family each count once.
pub fn emoji_count(text: &str) -> usize {
    EMOJI.find_iter(text).count()
}

/// `Source:` becomes `Source[*_]*:` so bold markers written as
/// `**Source**:` still match.
fn marker_pattern(marker: &str) -> String {
    match marker.strip_suffix(':') {
        Some(word) => format!("{}[*_]*:", regex::escape(word)),
        None => regex::escape(marker),
    }
}

fn unwrap_label(re: &Regex, text: &str, tally: &mut usize) -> String {
    re.replace_all(text, |caps: &Captures<'_>| {
        *tally += 1;
        caps.get(1).map_or("", |m| m.as_str()).to_string()
    })
    .into_owned()
}

fn strip(re: &Regex, text: &str, tally: &mut usize) -> String {
    re.replace_all(text, |_: &Captures<'_>| {
        *tally += 1;
        ""
    })
    .into_owned()
}
