use std::sync::Arc;

use crate::config::Config;
use crate::speech::sanitizer::Sanitizer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Compiled once at startup from `config.attribution_markers`.
    pub sanitizer: Arc<Sanitizer>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let sanitizer = Sanitizer::new(config.attribution_markers.as_slice())?;
        Ok(Self {
            config,
            sanitizer: Arc::new(sanitizer),
        })
    }
}
