use std::sync::Arc;

use tickerdeck_core::{MarketService, Repository};

/// Shared handler state. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MarketService>,
    pub repository: Arc<dyn Repository>,
}

impl AppState {
    pub fn new(service: MarketService, repository: impl Repository + 'static) -> Self {
        Self {
            service: Arc::new(service),
            repository: Arc::new(repository),
        }
    }
}
