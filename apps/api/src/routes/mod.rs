pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::speech::handlers;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Speech API
        .route("/api/v1/speech/sanitize", post(handlers::handle_sanitize))
        .route("/api/v1/speech/prepare", post(handlers::handle_prepare))
        .route("/api/v1/speech/check", post(handlers::handle_check))
        .fallback(not_found)
        .with_state(state)
}
