//! Provider implementations.

mod offline;
mod yahoo;

use std::sync::Arc;

pub use offline::OfflineProvider;
pub use yahoo::{YahooEndpoints, YahooProvider, YahooSession};

use crate::http_client::ReqwestHttpClient;
use crate::provider::MarketDataProvider;
use crate::ProviderId;

/// Builds the provider selected by configuration.
pub fn build_provider(id: ProviderId, timeout_ms: Option<u64>) -> Arc<dyn MarketDataProvider> {
    match id {
        ProviderId::Yahoo => Arc::new(
            YahooProvider::new(Arc::new(ReqwestHttpClient::new())).with_timeout_ms(timeout_ms),
        ),
        ProviderId::Offline => Arc::new(OfflineProvider::new()),
    }
}
