use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tickerdeck_core::dashboard::{self, IndexQuote, TopMovers};
use tickerdeck_core::NewsFeed;

use crate::state::AppState;

const DEFAULT_MOVERS_LIMIT: usize = 5;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/news", get(news))
        .route("/indices", get(indices))
        .route("/movers", get(movers))
}

#[derive(Debug, Default, Deserialize)]
pub struct MoversParams {
    pub limit: Option<usize>,
}

async fn news(State(state): State<AppState>) -> Json<NewsFeed> {
    Json(state.service.news().await)
}

async fn indices(State(state): State<AppState>) -> Json<Vec<IndexQuote>> {
    let indices = state.repository.indices();
    Json(dashboard::index_quotes(&state.service, indices).await)
}

async fn movers(
    State(state): State<AppState>,
    Query(params): Query<MoversParams>,
) -> Json<TopMovers> {
    let limit = params.limit.unwrap_or(DEFAULT_MOVERS_LIMIT);
    let universe = state.repository.movers_universe();
    Json(dashboard::top_movers(&state.service, universe, limit).await)
}
