//! Scripted provider shared by the behaviour suites.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tickerdeck_core::{
    Clock, HistoricalRequest, MarketDataProvider, MarketService, ProviderBar, ProviderError,
    ProviderFuture, ProviderId, ProviderNewsItem, ProviderQuote, ProviderSearchMatch, RawNumber,
    SearchRequest, ServiceConfig, Symbol,
};
use time::macros::datetime;
use time::OffsetDateTime;

/// Wednesday evening, after the US close.
pub const NOW: OffsetDateTime = datetime!(2024-03-06 21:00 UTC);

#[derive(Debug, Default)]
pub struct CallCounts {
    pub quote: AtomicUsize,
    pub search: AtomicUsize,
    pub historical: AtomicUsize,
    pub news: AtomicUsize,
}

impl CallCounts {
    pub fn quote(&self) -> usize {
        self.quote.load(Ordering::SeqCst)
    }

    pub fn search(&self) -> usize {
        self.search.load(Ordering::SeqCst)
    }

    pub fn historical(&self) -> usize {
        self.historical.load(Ordering::SeqCst)
    }

    pub fn news(&self) -> usize {
        self.news.load(Ordering::SeqCst)
    }
}

/// Provider whose answers are fixed up front.
///
/// Unscripted quotes and news answer `NotFound`; unscripted history and
/// search answer empty.
#[derive(Debug, Default)]
pub struct StubProvider {
    quotes: HashMap<String, Result<ProviderQuote, ProviderError>>,
    bars: Option<Result<Vec<ProviderBar>, ProviderError>>,
    search: Option<Result<Vec<ProviderSearchMatch>, ProviderError>>,
    news: HashMap<String, Result<Vec<ProviderNewsItem>, ProviderError>>,
    pub calls: Arc<CallCounts>,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(mut self, symbol: &str, quote: Result<ProviderQuote, ProviderError>) -> Self {
        self.quotes.insert(symbol.to_owned(), quote);
        self
    }

    pub fn with_bars(mut self, bars: Result<Vec<ProviderBar>, ProviderError>) -> Self {
        self.bars = Some(bars);
        self
    }

    pub fn with_search(mut self, matches: Result<Vec<ProviderSearchMatch>, ProviderError>) -> Self {
        self.search = Some(matches);
        self
    }

    pub fn with_news(
        mut self,
        symbol: &str,
        items: Result<Vec<ProviderNewsItem>, ProviderError>,
    ) -> Self {
        self.news.insert(symbol.to_owned(), items);
        self
    }

    pub fn call_counts(&self) -> Arc<CallCounts> {
        Arc::clone(&self.calls)
    }
}

impl MarketDataProvider for StubProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Offline
    }

    fn fetch_quote<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, ProviderQuote> {
        self.calls.quote.fetch_add(1, Ordering::SeqCst);
        let result = self
            .quotes
            .get(symbol.as_str())
            .cloned()
            .unwrap_or_else(|| Err(ProviderError::not_found(format!("no quote for {symbol}"))));
        Box::pin(async move { result })
    }

    fn fetch_search<'a>(
        &'a self,
        _request: &'a SearchRequest,
    ) -> ProviderFuture<'a, Vec<ProviderSearchMatch>> {
        self.calls.search.fetch_add(1, Ordering::SeqCst);
        let result = self.search.clone().unwrap_or_else(|| Ok(Vec::new()));
        Box::pin(async move { result })
    }

    fn fetch_historical<'a>(
        &'a self,
        _request: &'a HistoricalRequest,
    ) -> ProviderFuture<'a, Vec<ProviderBar>> {
        self.calls.historical.fetch_add(1, Ordering::SeqCst);
        let result = self.bars.clone().unwrap_or_else(|| Ok(Vec::new()));
        Box::pin(async move { result })
    }

    fn fetch_news<'a>(
        &'a self,
        symbol: &'a Symbol,
        _limit: usize,
    ) -> ProviderFuture<'a, Vec<ProviderNewsItem>> {
        self.calls.news.fetch_add(1, Ordering::SeqCst);
        let result = self
            .news
            .get(symbol.as_str())
            .cloned()
            .unwrap_or_else(|| Err(ProviderError::not_found(format!("no news for {symbol}"))));
        Box::pin(async move { result })
    }
}

pub fn symbol(value: &str) -> Symbol {
    Symbol::parse(value).expect("valid symbol")
}

/// Raw quote with the fields the normalizer reads.
pub fn raw_quote(symbol: &str, price: f64, previous_close: f64) -> ProviderQuote {
    ProviderQuote {
        symbol: symbol.to_owned(),
        regular_market_open: Some(RawNumber::from(previous_close)),
        regular_market_day_high: Some(RawNumber::from(price.max(previous_close) + 1.0)),
        regular_market_day_low: Some(RawNumber::from(price.min(previous_close) - 1.0)),
        regular_market_price: Some(RawNumber::from(price)),
        regular_market_volume: Some(RawNumber::from(52_000_000.0)),
        regular_market_previous_close: Some(RawNumber::from(previous_close)),
        regular_market_time: Some(RawNumber::from(NOW.unix_timestamp() as f64)),
        ..ProviderQuote::default()
    }
}

pub fn news_item(id: &str, title: &str, published: OffsetDateTime) -> ProviderNewsItem {
    ProviderNewsItem {
        uuid: id.to_owned(),
        title: title.to_owned(),
        summary: Some(format!("Summary for {title}")),
        link: format!("https://news.test/{id}"),
        publisher: Some(String::from("Test Wire")),
        provider_publish_time: Some(published.unix_timestamp()),
        kind: Some(String::from("STORY")),
        thumbnail: None,
        related_tickers: Vec::new(),
    }
}

pub fn service_with(provider: StubProvider, config: ServiceConfig) -> MarketService {
    MarketService::new(Arc::new(provider), config, Clock::Fixed(NOW))
}

pub fn service(provider: StubProvider) -> MarketService {
    service_with(
        provider,
        ServiceConfig {
            synthetic_seed: Some(7),
            ..ServiceConfig::default()
        },
    )
}
