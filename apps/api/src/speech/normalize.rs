use serde::Serialize;

use crate::speech::sanitizer::{Removals, Sanitizer};

/// Text ready to hand to a speech engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeechText {
    pub text: String,
    pub removals: Removals,
}

impl SpeechText {
    /// False when sanitizing left nothing worth saying aloud
    /// (empty, or only punctuation). Callers skip synthesis in that case.
    pub fn is_speakable(&self) -> bool {
        self.text.chars().any(char::is_alphanumeric)
    }
}

/// Sanitizes `text`, then folds every whitespace run (newlines included)
/// into a single space and trims the ends.
pub fn prepare_for_speech(sanitizer: &Sanitizer, text: &str) -> SpeechText {
    let sanitized = sanitizer.sanitize(text);

    SpeechText {
        text: collapse_whitespace(&sanitized.text),
        removals: sanitized.removals,
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
