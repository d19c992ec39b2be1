//! Answer style check for the kid-facing Q&A voice.
//!
//! The model is told to answer only, never ask a question back, end on a
//! statement, keep sentences short and go easy on emoji. Models drift from
//! those rules; this flags the answers that did so the caller can retry or
//! log them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::speech::sanitizer::{emoji_count, Sanitizer, EMOJI_SEQUENCE};

/// Openers of the "turn it back on the kid" questions the prompt forbids.
const FOLLOW_UP_OPENERS: &[&str] = &[
    "do you know",
    "did you know",
    "can you",
    "could you",
    "what do you think",
    "do you want",
    "would you like",
    "have you ever",
    "guess what",
];

/// Whitespace, closing quotes/parens and emoji after the last real character.
static TRAILING_DECORATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"(?:{}|[\s"')\x{{201D}}\x{{2019}}\x{{FE0F}}\x{{20E3}}])+$"#,
        *EMOJI_SEQUENCE
    ))
    .expect("trailing decoration regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StyleLimits {
    pub max_emoji: usize,
    pub max_sentence_words: usize,
}

impl Default for StyleLimits {
    fn default() -> Self {
        Self {
            max_emoji: 1,
            max_sentence_words: 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleIssueKind {
    Empty,
    QuestionBack,
    FollowUpQuestion,
    MissingFinalPunctuation,
    TooManyEmoji,
    LongSentence,
    ContainsLinks,
}

#[derive(Debug, Clone, Serialize)]
pub struct StyleIssue {
    pub kind: StyleIssueKind,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StyleReport {
    pub passed: bool,
    pub issues: Vec<StyleIssue>,
    pub suggestions: Vec<String>,
}

impl StyleReport {
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn has(&self, kind: StyleIssueKind) -> bool {
        self.issues.iter().any(|i| i.kind == kind)
    }
}

/// Checks one generated answer against the kid-voice rules.
///
/// `sanitizer` decides what counts as link/citation/attribution noise.
pub fn check_answer(sanitizer: &Sanitizer, text: &str, limits: &StyleLimits) -> StyleReport {
    let mut issues = Vec::new();
    let mut suggestions = Vec::new();

    if text.trim().is_empty() {
        return StyleReport {
            passed: false,
            issues: vec![StyleIssue {
                kind: StyleIssueKind::Empty,
                detail: "Answer is empty".to_string(),
            }],
            suggestions: vec!["Regenerate the answer.".to_string()],
        };
    }

    let sentences = split_sentences(text);

    for sentence in sentences.iter().filter(|s| word_count(s) > 0) {
        if strip_trailing_decoration(sentence).ends_with('?') {
            let lower = sentence.to_lowercase();
            match FOLLOW_UP_OPENERS.iter().find(|&&o| lower.starts_with(o)) {
                Some(opener) => {
                    issues.push(StyleIssue {
                        kind: StyleIssueKind::FollowUpQuestion,
                        detail: format!("Follow-up question \"{sentence}\""),
                    });
                    suggestions.push(format!(
                        "Drop the \"{opener} ...?\" question and end on a fact instead."
                    ));
                }
                None => {
                    issues.push(StyleIssue {
                        kind: StyleIssueKind::QuestionBack,
                        detail: format!("Asks a question back: \"{sentence}\""),
                    });
                    suggestions.push("Answer only. Turn the question into a statement.".to_string());
                }
            }
        }

        let words = word_count(sentence);
        if words > limits.max_sentence_words {
            issues.push(StyleIssue {
                kind: StyleIssueKind::LongSentence,
                detail: format!(
                    "Sentence has {words} words (max {}): \"{sentence}\"",
                    limits.max_sentence_words
                ),
            });
            suggestions.push("Split it into shorter sentences with simple words.".to_string());
        }
    }

    match strip_trailing_decoration(text).chars().last() {
        Some('.') | Some('!') | Some('?') => {}
        _ => {
            issues.push(StyleIssue {
                kind: StyleIssueKind::MissingFinalPunctuation,
                detail: "Answer does not end with a period or exclamation mark".to_string(),
            });
            suggestions.push("End with a period or exclamation mark.".to_string());
        }
    }

    let emoji = emoji_count(text);
    if emoji > limits.max_emoji {
        issues.push(StyleIssue {
            kind: StyleIssueKind::TooManyEmoji,
            detail: format!("Uses {emoji} emoji (max {})", limits.max_emoji),
        });
        suggestions.push(format!("Keep it to {} emoji or fewer.", limits.max_emoji));
    }

    let markup = sanitizer.sanitize(text).removals.markup();
    if markup > 0 {
        issues.push(StyleIssue {
            kind: StyleIssueKind::ContainsLinks,
            detail: format!("Contains {markup} link, citation or source artifact(s)"),
        });
        suggestions.push("Tell the model not to include links, citations or sources.".to_string());
    }

    StyleReport {
        passed: issues.is_empty(),
        issues,
        suggestions,
    }
}

/// Splits on `.`, `!` or `?` runs that are followed by whitespace or the end
/// of the text, so "3.5" and "Wow!!" stay whole.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let at_boundary = chars.peek().map_or(true, |&(_, next)| next.is_whitespace());
        if at_boundary {
            let end = i + c.len_utf8();
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

fn word_count(sentence: &str) -> usize {
    sentence
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count()
}

fn strip_trailing_decoration(text: &str) -> &str {
    match TRAILING_DECORATION.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(text: &str) -> StyleReport {
        check_answer(&Sanitizer::default(), text, &StyleLimits::default())
    }

    #[test]
    fn test_good_answers_pass() {
        for answer in [
            "Wow, Saturn has 146 moons! That is so many!",
            "Light from the sun bounces in the air. Blue bounces the most!",
            "Cheetahs run super fast! As fast as a car! 🐆",
        ] {
            let report = check(answer);
            assert!(report.passed, "{answer:?} failed: {:?}", report.issues);
            assert!(report.suggestions.is_empty());
        }
    }

    #[test]
    fn test_empty_answer_fails() {
        let report = check("   ");
        assert!(!report.passed);
        assert!(report.has(StyleIssueKind::Empty));
        assert_eq!(report.issues.len(), 1);
    }

    #[test]
    fn test_follow_up_question_flagged() {
        let report = check("Cheetahs run super fast! Can you guess how fast?");
        assert!(!report.passed);
        assert!(report.has(StyleIssueKind::FollowUpQuestion));
        assert!(!report.has(StyleIssueKind::QuestionBack));
        // The '?' ending is acceptable punctuation; the question itself is the issue.
        assert!(!report.has(StyleIssueKind::MissingFinalPunctuation));
    }

    #[test]
    fn test_mid_answer_follow_up_flagged() {
        let report = check("Do you know what else? Saturn floats in water!");
        assert!(report.has(StyleIssueKind::FollowUpQuestion));
    }

    #[test]
    fn test_plain_question_back_flagged() {
        let report = check("The sky is blue. Why do birds fly?");
        assert!(report.has(StyleIssueKind::QuestionBack));
        assert!(!report.has(StyleIssueKind::FollowUpQuestion));
    }

    #[test]
    fn test_question_before_emoji_still_flagged() {
        let report = check("What do you think? 🤔");
        assert!(report.has(StyleIssueKind::FollowUpQuestion));
    }

    #[test]
    fn test_missing_final_punctuation() {
        let report = check("Saturn has rings");
        assert!(report.has(StyleIssueKind::MissingFinalPunctuation));
    }

    #[test]
    fn test_closing_quote_after_period_is_fine() {
        let report = check("The owl said \"hoot.\"");
        assert!(!report.has(StyleIssueKind::MissingFinalPunctuation));
    }

    #[test]
    fn test_too_many_emoji() {
        let report = check("Wow! 🐆🪐🚀");
        assert!(report.has(StyleIssueKind::TooManyEmoji));

        let relaxed = StyleLimits {
            max_emoji: 3,
            ..StyleLimits::default()
        };
        let report = check_answer(&Sanitizer::default(), "Wow! 🐆🪐🚀", &relaxed);
        assert!(report.passed);
    }

    #[test]
    fn test_modified_emoji_count_once() {
        for answer in [
            "Great job! 👍🏽",
            "Hello from the USA! 🇺🇸",
            "Family time is fun! 👨‍👩‍👧",
        ] {
            let report = check(answer);
            assert!(
                !report.has(StyleIssueKind::TooManyEmoji),
                "{answer:?} flagged: {:?}",
                report.issues
            );
            assert!(report.passed, "{answer:?} failed: {:?}", report.issues);
        }
    }

    #[test]
    fn test_two_flags_are_two_emoji() {
        let report = check("Hello friends! 🇺🇸🇫🇷");
        assert!(report.has(StyleIssueKind::TooManyEmoji));
    }

    #[test]
    fn test_long_sentence() {
        let report = check(
            "Saturn is a giant planet made mostly of gas with beautiful rings of ice and rock.",
        );
        assert!(report.has(StyleIssueKind::LongSentence));
    }

    #[test]
    fn test_links_and_citations_flagged() {
        let report = check("Saturn has 146 moons [1]!\nSource: NASA");
        assert!(report.has(StyleIssueKind::ContainsLinks));

        let report = check("See [this](https://nasa.gov) page.");
        assert!(report.has(StyleIssueKind::ContainsLinks));
    }

    #[test]
    fn test_emoji_alone_is_not_a_link_issue() {
        let report = check("Cool! 🪐");
        assert!(!report.has(StyleIssueKind::ContainsLinks));
    }

    #[test]
    fn test_split_sentences() {
        assert_eq!(
            split_sentences("It is 3.5 meters. Wow!! Really?! ok"),
            vec!["It is 3.5 meters.", "Wow!!", "Really?!", "ok"]
        );
        assert!(split_sentences("").is_empty());
    }
}
