//! `/api/portfolio` and `/api/watchlist` handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;
use tickerdeck_core::dashboard::{self, PortfolioSummary, WatchlistQuote};
use tickerdeck_core::{Holding, NewHolding, Symbol, WatchlistEntry};

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/portfolio", get(portfolio).post(add_holding))
        .route("/api/portfolio/:id", delete(remove_holding))
        .route("/api/watchlist", get(watchlist).post(add_to_watchlist))
        .route("/api/watchlist/:id", delete(remove_from_watchlist))
}

#[derive(Debug, Deserialize)]
pub struct NewWatchlistEntry {
    pub symbol: Symbol,
}

async fn portfolio(State(state): State<AppState>) -> Json<PortfolioSummary> {
    let holdings = state.repository.holdings();
    Json(dashboard::portfolio_summary(&state.service, holdings).await)
}

async fn add_holding(
    State(state): State<AppState>,
    payload: Result<Json<NewHolding>, JsonRejection>,
) -> Result<(StatusCode, Json<Holding>), ApiError> {
    let Json(holding) = payload?;
    let created = state.repository.add_holding(holding)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn remove_holding(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Holding>, ApiError> {
    Ok(Json(state.repository.remove_holding(id)?))
}

async fn watchlist(State(state): State<AppState>) -> Json<Vec<WatchlistQuote>> {
    let entries = state.repository.watchlist();
    Json(dashboard::watchlist_quotes(&state.service, entries).await)
}

async fn add_to_watchlist(
    State(state): State<AppState>,
    payload: Result<Json<NewWatchlistEntry>, JsonRejection>,
) -> Result<(StatusCode, Json<WatchlistEntry>), ApiError> {
    let Json(entry) = payload?;
    let created = state.repository.add_to_watchlist(entry.symbol)?;
    tracing::debug!(id = created.id, symbol = %created.symbol, "watchlist entry added");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn remove_from_watchlist(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<WatchlistEntry>, ApiError> {
    Ok(Json(state.repository.remove_from_watchlist(id)?))
}
