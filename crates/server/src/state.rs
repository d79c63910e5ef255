//! Shared application state

use std::sync::Arc;

use afterhours_agent::CallEngine;
use afterhours_config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<CallEngine>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            engine: Arc::new(CallEngine::new(settings.agent.clone())),
            settings: Arc::new(settings),
        }
    }
}
