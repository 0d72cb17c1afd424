//! Fallback policy over the provider.
//!
//! | Call | Failure behaviour |
//! |------|-------------------|
//! | [`MarketService::series`] | real bars, else synthetic from a priced quote, else empty shell; never fails |
//! | [`MarketService::quote`] | `NotFound` / `Upstream` propagate |
//! | [`MarketService::search`] | short queries answer empty without a provider call; errors propagate |
//! | [`MarketService::news`] | per-symbol failures contribute nothing; all-failed yields a placeholder item |
//! | [`MarketService::chart`] | `series` filtered to the timeframe window |

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use time::OffsetDateTime;

use crate::domain::{
    format_news_stamp, NewsFeed, NewsItem, NewsTopic, Quote, QuoteResponse, SearchResponse,
    SeriesResponse,
};
use crate::fetch_policy::{BatchLimiter, FetchPolicy};
use crate::normalize::{normalize_news, normalize_quote, normalize_search, normalize_series};
use crate::provider::{HistoricalRequest, MarketDataProvider, ProviderError, SearchRequest};
use crate::synthetic::{QuoteSnapshot, SyntheticGenerator};
use crate::timeframe::{apply_window, ChartResponse, Timeframe};
use crate::{Granularity, ProviderId, Symbol};

pub const DEFAULT_NEWS_SYMBOLS: [&str; 5] = ["AAPL", "MSFT", "GOOGL", "AMZN", "TSLA"];

/// Source of "now" for synthetic series, chart windows and placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(OffsetDateTime),
}

impl Clock {
    pub fn now(self) -> OffsetDateTime {
        match self {
            Self::System => OffsetDateTime::now_utc(),
            Self::Fixed(now) => now,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub news_symbols: Vec<Symbol>,
    pub news_per_symbol: usize,
    pub news_limit: usize,
    pub search_limit: usize,
    /// Trimmed queries shorter than this never reach the provider.
    pub min_search_len: usize,
    /// Fixed seed for synthetic series; `None` draws from entropy per request.
    pub synthetic_seed: Option<u64>,
    pub fetch_policy: FetchPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            news_symbols: DEFAULT_NEWS_SYMBOLS
                .iter()
                .filter_map(|symbol| Symbol::parse(symbol).ok())
                .collect(),
            news_per_symbol: 5,
            news_limit: 20,
            search_limit: 10,
            min_search_len: 2,
            synthetic_seed: None,
            fetch_policy: FetchPolicy::default(),
        }
    }
}

pub struct MarketService {
    provider: Arc<dyn MarketDataProvider>,
    config: ServiceConfig,
    clock: Clock,
    limiter: BatchLimiter,
}

impl MarketService {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: ServiceConfig, clock: Clock) -> Self {
        let limiter = BatchLimiter::new(config.fetch_policy);
        Self {
            provider,
            config,
            clock,
            limiter,
        }
    }

    pub fn provider_id(&self) -> ProviderId {
        self.provider.id()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    pub async fn quote(&self, symbol: &Symbol) -> Result<QuoteResponse, ProviderError> {
        let quote = self.canonical_quote(symbol).await?;
        Ok(QuoteResponse { quote })
    }

    async fn canonical_quote(&self, symbol: &Symbol) -> Result<Quote, ProviderError> {
        let raw = self.provider.fetch_quote(symbol).await?;
        normalize_quote(&raw)
    }

    /// Quotes for many symbols under the batch fetch policy, in input order.
    pub async fn quotes(&self, symbols: Vec<Symbol>) -> Vec<(Symbol, Result<Quote, ProviderError>)> {
        self.limiter
            .run(symbols, |symbol| async move {
                let quote = self.canonical_quote(&symbol).await;
                (symbol, quote)
            })
            .await
    }

    /// Always returns a well-formed series for `granularity`.
    pub async fn series(&self, symbol: &Symbol, granularity: Granularity) -> SeriesResponse {
        let request = HistoricalRequest::new(symbol.clone(), granularity);
        let bars = match self.provider.fetch_historical(&request).await {
            Ok(bars) => bars,
            Err(error) => {
                tracing::warn!(
                    %symbol,
                    %granularity,
                    code = error.code(),
                    error = %error,
                    "historical fetch failed, serving empty series"
                );
                return empty_series(symbol, granularity);
            }
        };

        let series = normalize_series(symbol, granularity, &bars);
        if !series.is_empty() {
            tracing::debug!(%symbol, %granularity, points = series.len(), "serving provider series");
            return series;
        }

        match self.canonical_quote(symbol).await {
            Ok(quote) if quote.price > 0.0 => {
                tracing::warn!(
                    %symbol,
                    %granularity,
                    price = quote.price,
                    "provider returned no bars, serving synthetic series"
                );
                self.generator_for(symbol)
                    .generate(symbol, granularity, snapshot(&quote), self.clock.now())
            }
            Ok(_) => {
                tracing::warn!(%symbol, %granularity, "quote has no price, serving empty series");
                empty_series(symbol, granularity)
            }
            Err(error) => {
                tracing::warn!(
                    %symbol,
                    %granularity,
                    code = error.code(),
                    "no bars and no quote, serving empty series"
                );
                empty_series(symbol, granularity)
            }
        }
    }

    fn generator_for(&self, symbol: &Symbol) -> SyntheticGenerator {
        match self.config.synthetic_seed {
            Some(seed) => SyntheticGenerator::seeded(seed ^ symbol.seed()),
            None => SyntheticGenerator::new(),
        }
    }

    pub async fn search(&self, query: &str) -> Result<SearchResponse, ProviderError> {
        let trimmed = query.trim();
        if trimmed.chars().count() < self.config.min_search_len {
            return Ok(SearchResponse::default());
        }

        let request = SearchRequest::new(trimmed, self.config.search_limit)?;
        let matches = self.provider.fetch_search(&request).await?;
        Ok(normalize_search(&matches, self.config.search_limit))
    }

    /// Merged news across the configured symbols, newest first.
    pub async fn news(&self) -> NewsFeed {
        let per_symbol = self.config.news_per_symbol;
        let fetches = self
            .config
            .news_symbols
            .iter()
            .map(|symbol| self.provider.fetch_news(symbol, per_symbol));
        let results = join_all(fetches).await;

        let mut failures = 0_usize;
        let mut seen = HashSet::new();
        let mut feed = Vec::new();
        for (symbol, result) in self.config.news_symbols.iter().zip(results) {
            match result {
                Ok(items) => {
                    feed.extend(
                        normalize_news(items)
                            .into_iter()
                            .filter(|item| seen.insert(item.url.clone())),
                    );
                }
                Err(error) => {
                    failures += 1;
                    tracing::warn!(%symbol, code = error.code(), error = %error, "news fetch failed");
                }
            }
        }

        if feed.is_empty() && failures > 0 {
            tracing::warn!(failures, "no news available, serving placeholder item");
            return NewsFeed {
                feed: vec![placeholder_news(self.clock.now())],
            };
        }

        feed.sort_by(|left, right| right.time_published.cmp(&left.time_published));
        feed.truncate(self.config.news_limit);
        NewsFeed { feed }
    }

    pub async fn chart(&self, symbol: &Symbol, timeframe: Timeframe) -> ChartResponse {
        let resolution = timeframe.resolution();
        let series = self.series(symbol, resolution.granularity).await;
        let points = apply_window(&series, resolution.lookback, self.clock.now());

        ChartResponse {
            symbol: series.symbol.clone(),
            timeframe,
            granularity: resolution.granularity,
            origin: series.origin,
            points,
        }
    }
}

fn snapshot(quote: &Quote) -> QuoteSnapshot {
    QuoteSnapshot {
        price: quote.price,
        previous_close: quote.previous_close,
        day_high: quote.high,
        day_low: quote.low,
        volume: quote.volume,
    }
}

fn empty_series(symbol: &Symbol, granularity: Granularity) -> SeriesResponse {
    SeriesResponse::empty(
        symbol.as_str(),
        granularity,
        format!("{} (no data available)", granularity.description()),
    )
}

/// Single static item served when every news source failed.
pub fn placeholder_news(now: OffsetDateTime) -> NewsItem {
    NewsItem {
        title: String::from("Market news is temporarily unavailable"),
        url: String::from("https://finance.yahoo.com/news/"),
        time_published: format_news_stamp(now),
        summary: String::from(
            "Headlines could not be loaded from the market data provider. Check back shortly.",
        ),
        banner_image: None,
        source: String::from("TickerDeck"),
        topics: vec![NewsTopic {
            topic: String::from("Financial Markets"),
            relevance_score: String::from("1.0"),
        }],
        tickers: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::OfflineProvider;
    use crate::domain::SeriesOrigin;
    use time::macros::datetime;

    fn service() -> MarketService {
        let now = datetime!(2024-03-06 20:00 UTC);
        MarketService::new(
            Arc::new(OfflineProvider::new().with_as_of(now)),
            ServiceConfig {
                synthetic_seed: Some(11),
                ..ServiceConfig::default()
            },
            Clock::Fixed(now),
        )
    }

    #[tokio::test]
    async fn offline_series_falls_through_to_synthetic() {
        let symbol = Symbol::parse("MSFT").expect("symbol");
        let series = service().series(&symbol, Granularity::Weekly).await;
        assert_eq!(series.origin, SeriesOrigin::Synthetic);
        assert_eq!(series.len(), 52);
        assert!(series.information.contains("synthetic"));
    }

    #[tokio::test]
    async fn unknown_symbol_series_is_empty_shell() {
        let symbol = Symbol::parse("ZZZZ").expect("symbol");
        let series = service().series(&symbol, Granularity::Daily).await;
        assert_eq!(series.origin, SeriesOrigin::Empty);
        assert!(series.is_empty());
        assert_eq!(series.container_key(), "Time Series (Daily)");
    }

    #[tokio::test]
    async fn seeded_series_are_reproducible() {
        let symbol = Symbol::parse("AAPL").expect("symbol");
        let first = service().series(&symbol, Granularity::Daily).await;
        let second = service().series(&symbol, Granularity::Daily).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn news_is_deduplicated_and_sorted() {
        let feed = service().news().await;
        assert_eq!(feed.feed.len(), 15);
        let stamps = feed
            .feed
            .iter()
            .map(|item| item.time_published.as_str())
            .collect::<Vec<_>>();
        let mut sorted = stamps.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(stamps, sorted);
    }

    #[tokio::test]
    async fn chart_one_day_stays_on_one_date() {
        let symbol = Symbol::parse("AAPL").expect("symbol");
        let chart = service().chart(&symbol, Timeframe::OneDay).await;
        assert_eq!(chart.granularity, Granularity::FiveMinutes);
        assert!(!chart.points.is_empty());
        let first_day = chart.points[0].at.date();
        assert!(chart.points.iter().all(|point| point.at.date() == first_day));
    }
}
