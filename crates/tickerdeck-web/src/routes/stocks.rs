//! `/api/stocks` handlers.
//!
//! Series endpoints answer 200 with a well-formed payload for any upstream
//! outcome; only malformed path/query input is rejected.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tickerdeck_core::{
    ChartResponse, Granularity, QuoteResponse, SearchResponse, SeriesResponse, Symbol, Timeframe,
};

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", get(search))
        .route("/quote/:symbol", get(quote))
        .route("/intraday/:symbol", get(intraday))
        .route("/daily/:symbol", get(daily))
        .route("/weekly/:symbol", get(weekly))
        .route("/monthly/:symbol", get(monthly))
        .route("/chart/:symbol", get(chart))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct IntervalParams {
    pub interval: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartParams {
    pub timeframe: Option<String>,
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    Ok(Json(state.service.search(&params.q).await?))
}

async fn quote(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let symbol = Symbol::parse(&symbol)?;
    Ok(Json(state.service.quote(&symbol).await?))
}

async fn intraday(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<IntervalParams>,
) -> Result<Json<SeriesResponse>, ApiError> {
    let granularity = match params.interval.as_deref().map(str::trim) {
        None | Some("") => Granularity::FiveMinutes,
        Some(value) => Granularity::parse_intraday(value)?,
    };
    series(&state, &symbol, granularity).await
}

async fn daily(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<SeriesResponse>, ApiError> {
    series(&state, &symbol, Granularity::Daily).await
}

async fn weekly(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<SeriesResponse>, ApiError> {
    series(&state, &symbol, Granularity::Weekly).await
}

async fn monthly(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<SeriesResponse>, ApiError> {
    series(&state, &symbol, Granularity::Monthly).await
}

async fn series(
    state: &AppState,
    symbol: &str,
    granularity: Granularity,
) -> Result<Json<SeriesResponse>, ApiError> {
    let symbol = Symbol::parse(symbol)?;
    Ok(Json(state.service.series(&symbol, granularity).await))
}

async fn chart(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<ChartParams>,
) -> Result<Json<ChartResponse>, ApiError> {
    let symbol = Symbol::parse(&symbol)?;
    let timeframe = Timeframe::parse_or_default(params.timeframe.as_deref());
    Ok(Json(state.service.chart(&symbol, timeframe).await))
}
