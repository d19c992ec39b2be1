//! Axum route handlers for the Speech API.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::speech::normalize::prepare_for_speech;
use crate::speech::sanitizer::Removals;
use crate::speech::style::{check_answer, StyleReport};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SpeechTextRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SanitizeResponse {
    pub text: String,
    pub removals: Removals,
}

#[derive(Debug, Serialize)]
pub struct PrepareResponse {
    pub text: String,
    pub speakable: bool,
    pub removals: Removals,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/speech/sanitize
///
/// Strips links, anchors, URLs, citations, attribution lines and emoji.
/// Whitespace is left exactly as the rules leave it.
pub async fn handle_sanitize(
    State(state): State<AppState>,
    payload: Result<Json<SpeechTextRequest>, JsonRejection>,
) -> Result<Json<SanitizeResponse>, AppError> {
    let Json(request) = payload?;
    ensure_within_limit(&request.text, state.config.max_input_bytes)?;

    let sanitized = state.sanitizer.sanitize(&request.text);
    debug!(
        removed = sanitized.removals.total(),
        removals = ?sanitized.removals,
        "sanitized text"
    );

    Ok(Json(SanitizeResponse {
        text: sanitized.text,
        removals: sanitized.removals,
    }))
}

/// POST /api/v1/speech/prepare
///
/// Sanitized text with whitespace collapsed, ready for the TTS engine.
/// `speakable: false` means the caller should skip synthesis.
pub async fn handle_prepare(
    State(state): State<AppState>,
    payload: Result<Json<SpeechTextRequest>, JsonRejection>,
) -> Result<Json<PrepareResponse>, AppError> {
    let Json(request) = payload?;
    ensure_within_limit(&request.text, state.config.max_input_bytes)?;

    let speech = prepare_for_speech(&state.sanitizer, &request.text);
    let speakable = speech.is_speakable();
    debug!(
        removed = speech.removals.total(),
        speakable,
        "prepared text for speech"
    );

    Ok(Json(PrepareResponse {
        text: speech.text,
        speakable,
        removals: speech.removals,
    }))
}

/// POST /api/v1/speech/check
pub async fn handle_check(
    State(state): State<AppState>,
    payload: Result<Json<SpeechTextRequest>, JsonRejection>,
) -> Result<Json<StyleReport>, AppError> {
    let Json(request) = payload?;
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }
    ensure_within_limit(&request.text, state.config.max_input_bytes)?;

    let report = check_answer(&state.sanitizer, &request.text, &state.config.style_limits);
    if !report.passed {
        debug!(issues = report.issues.len(), "answer failed style check");
    }

    Ok(Json(report))
}

fn ensure_within_limit(text: &str, limit: usize) -> Result<(), AppError> {
    if text.len() > limit {
        return Err(AppError::PayloadTooLarge {
            limit,
            actual: text.len(),
        });
    }
    Ok(())
}
