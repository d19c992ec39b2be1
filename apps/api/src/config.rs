use std::str::FromStr;

use anyhow::{Context, Result};

use crate::speech::sanitizer::DEFAULT_ATTRIBUTION_MARKERS;
use crate::speech::style::StyleLimits;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_INPUT_BYTES: usize = 16 * 1024;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Line prefixes that mark an attribution line (`SPEECH_ATTRIBUTION_MARKERS`, comma-separated).
    pub attribution_markers: Vec<String>,
    /// Largest `text` accepted by the speech endpoints, in bytes.
    pub max_input_bytes: usize,
    pub style_limits: StyleLimits,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = StyleLimits::default();

        let attribution_markers = match lookup("SPEECH_ATTRIBUTION_MARKERS") {
            Some(raw) => raw
                .split(',')
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
            None => DEFAULT_ATTRIBUTION_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        };

        Ok(Config {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            attribution_markers,
            max_input_bytes: parse_or(&lookup, "SPEECH_MAX_INPUT_BYTES", DEFAULT_MAX_INPUT_BYTES)?,
            style_limits: StyleLimits {
                max_emoji: parse_or(&lookup, "SPEECH_MAX_EMOJI", defaults.max_emoji)?,
                max_sentence_words: parse_or(
                    &lookup,
                    "SPEECH_MAX_SENTENCE_WORDS",
                    defaults.max_sentence_words,
                )?,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
