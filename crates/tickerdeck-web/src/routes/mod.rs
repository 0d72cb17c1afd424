pub mod market;
pub mod portfolio;
pub mod stocks;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tickerdeck_core::ProviderId;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub provider: ProviderId,
    pub version: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        provider: state.service.provider_id(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
