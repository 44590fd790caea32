//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use wisata_chat::ChatOrchestrator;
use wisata_core::config::WisataConfig;

/// Shared application state; cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<WisataConfig>,
    /// Session store and dialogue router.
    pub orchestrator: Arc<ChatOrchestrator>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: WisataConfig, orchestrator: ChatOrchestrator) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            start_time: Instant::now(),
        }
    }
}
