//! Shared request-handler state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use orbit_config::Settings;
use orbit_sim::EngineHandle;
use tokio::sync::watch;

/// State cloned into every handler: the engine front, runtime settings,
/// and the process-wide shutdown signal observed by streaming sessions.
#[derive(Clone)]
pub struct AppState {
    pub engine: EngineHandle,
    pub settings: Arc<Settings>,
    pub shutdown: watch::Receiver<bool>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        engine: EngineHandle,
        settings: Arc<Settings>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        AppState {
            engine,
            settings,
            shutdown,
            started_at: Utc::now(),
        }
    }
}
