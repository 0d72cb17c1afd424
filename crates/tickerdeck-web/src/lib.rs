//! # TickerDeck Web
//!
//! Axum HTTP surface over [`tickerdeck_core::MarketService`].
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /api/stocks/search?q=` | `{ "bestMatches": [...] }` |
//! | `GET /api/stocks/quote/:symbol` | `{ "Global Quote": {...} }` |
//! | `GET /api/stocks/intraday/:symbol?interval=5min\|60min` | intraday series |
//! | `GET /api/stocks/{daily,weekly,monthly}/:symbol` | series |
//! | `GET /api/stocks/chart/:symbol?timeframe=` | chart points for the timeframe window |
//! | `GET /api/market/news` | `{ "feed": [...] }` |
//! | `GET /api/market/indices`, `GET /api/market/movers` | dashboard quotes |
//! | `GET\|POST /api/portfolio`, `DELETE /api/portfolio/:id` | holdings |
//! | `GET\|POST /api/watchlist`, `DELETE /api/watchlist/:id` | watchlist |
//! | `GET /health` | liveness and active provider |

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::http::Method;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::{ApiError, StartupError};
pub use state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .nest("/api/stocks", routes::stocks::router())
        .nest("/api/market", routes::market::router())
        .merge(routes::portfolio::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
