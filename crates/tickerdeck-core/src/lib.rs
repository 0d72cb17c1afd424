//! # TickerDeck Core
//!
//! Market-data normalization and fallback layer behind the TickerDeck
//! dashboard.
//!
//! ## Overview
//!
//! Upstream quote/search/chart/news responses are heterogeneous and often
//! incomplete. This crate turns them into one canonical, Alpha Vantage style
//! schema and guarantees that every series request answers with a well-formed
//! payload:
//!
//! 1. real bars from the provider, normalized;
//! 2. otherwise a synthetic series derived from the latest quote;
//! 3. otherwise an empty shell with the right container key.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo Finance and offline providers |
//! | [`circuit_breaker`] | Circuit breaker for upstream calls |
//! | [`dashboard`] | Portfolio valuation, watchlist, indices and movers |
//! | [`domain`] | Raw provider records and canonical response types |
//! | [`error`] | Core error types |
//! | [`fetch_policy`] | Concurrency and quota limits for batched quote loops |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`normalize`] | Raw-to-canonical mapping |
//! | [`provider`] | Provider trait, requests and errors |
//! | [`service`] | Fallback policy ([`MarketService`]) |
//! | [`source`] | Provider identifiers |
//! | [`store`] | In-memory repository |
//! | [`synthetic`] | Synthetic series generator |
//! | [`timeframe`] | Chart timeframe to granularity/window mapping |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickerdeck_core::{Clock, Granularity, MarketService, OfflineProvider, ServiceConfig, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = MarketService::new(
//!         Arc::new(OfflineProvider::new()),
//!         ServiceConfig::default(),
//!         Clock::System,
//!     );
//!
//!     let symbol = Symbol::parse("AAPL")?;
//!     let series = service.series(&symbol, Granularity::Daily).await;
//!     println!("{}", serde_json::to_string_pretty(&series)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Timeframe Router│────▶│  MarketService   │
//! └─────────────────┘     │ (fallback policy)│
//!                         └───┬─────────┬────┘
//!                             │         │
//!                             ▼         ▼
//! ┌─────────────────┐     ┌──────────┐ ┌───────────────────┐
//! │ Circuit Breaker │◀────│ Provider │ │ Synthetic Series  │
//! └─────────────────┘     └────┬─────┘ └───────────────────┘
//!                              │
//!                              ▼
//!                         ┌──────────┐     ┌──────────────────┐
//!                         │Normalizer│────▶│ Canonical schema │
//!                         └──────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Provider calls return [`ProviderError`], classified by
//! [`ProviderErrorKind`]:
//!
//! ```rust
//! use tickerdeck_core::{ProviderError, ProviderErrorKind};
//!
//! fn status_for(error: &ProviderError) -> u16 {
//!     match error.kind() {
//!         ProviderErrorKind::NotFound => 404,
//!         ProviderErrorKind::InvalidRequest => 400,
//!         ProviderErrorKind::Upstream | ProviderErrorKind::RateLimited => 502,
//!     }
//! }
//! ```

pub mod adapters;
pub mod circuit_breaker;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod fetch_policy;
pub mod http_client;
pub mod normalize;
pub mod provider;
pub mod service;
pub mod source;
pub mod store;
pub mod synthetic;
pub mod timeframe;

// Adapter implementations
pub use adapters::{build_provider, OfflineProvider, YahooEndpoints, YahooProvider};

// Circuit breaker
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};

// Dashboard views
pub use dashboard::{
    HoldingValuation, IndexQuote, PortfolioSummary, TopMovers, WatchlistQuote,
};

// Domain models
pub use domain::{
    Candle, Granularity, NewsFeed, NewsItem, NewsTopic, ProviderBar, ProviderNewsItem,
    ProviderQuote, ProviderSearchMatch, Quote, QuoteResponse, RawNumber, SearchMatch,
    SearchResponse, SeriesOrigin, SeriesResponse, Symbol, UtcDateTime,
};

// Error types
pub use error::{CoreError, ValidationError};

// Batch fetch policy
pub use fetch_policy::{BatchLimiter, FetchPolicy};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Provider contract
pub use provider::{
    HistoricalRequest, HistoryRange, MarketDataProvider, ProviderError, ProviderErrorKind,
    ProviderFuture, SearchRequest,
};

// Fallback policy
pub use service::{Clock, MarketService, ServiceConfig, DEFAULT_NEWS_SYMBOLS};

// Source identifiers
pub use source::ProviderId;

// Repository
pub use store::{
    Holding, InMemoryRepository, MarketIndex, NewHolding, Repository, StoreError, WatchlistEntry,
};

// Synthetic data
pub use synthetic::{QuoteSnapshot, SyntheticGenerator, WalkProfile};

// Timeframe routing
pub use timeframe::{
    apply_window, resolve_granularity, ChartPoint, ChartResponse, Lookback, Resolution, Timeframe,
};
