use time::{Duration, OffsetDateTime};

use crate::domain::{
    ProviderBar, ProviderImage, ProviderNewsItem, ProviderQuote, ProviderSearchMatch,
    ProviderThumbnail, RawNumber,
};
use crate::provider::{
    HistoricalRequest, MarketDataProvider, ProviderError, ProviderFuture, SearchRequest,
};
use crate::{ProviderId, Symbol};

/// Instruments the offline provider knows: symbol, name, type, reference price.
const CATALOG: &[(&str, &str, &str, f64)] = &[
    ("AAPL", "Apple Inc.", "Equity", 189.5),
    ("MSFT", "Microsoft Corporation", "Equity", 415.2),
    ("GOOGL", "Alphabet Inc.", "Equity", 152.8),
    ("AMZN", "Amazon.com, Inc.", "Equity", 178.1),
    ("NVDA", "NVIDIA Corporation", "Equity", 875.3),
    ("META", "Meta Platforms, Inc.", "Equity", 497.6),
    ("TSLA", "Tesla, Inc.", "Equity", 175.4),
    ("JPM", "JPMorgan Chase & Co.", "Equity", 196.9),
    ("V", "Visa Inc.", "Equity", 281.7),
    ("NFLX", "Netflix, Inc.", "Equity", 612.0),
    ("AMD", "Advanced Micro Devices, Inc.", "Equity", 178.6),
    ("INTC", "Intel Corporation", "Equity", 42.3),
    ("SPY", "SPDR S&P 500 ETF Trust", "ETF", 512.4),
    ("QQQ", "Invesco QQQ Trust", "ETF", 441.9),
    ("^GSPC", "S&P 500", "Index", 5_137.1),
    ("^DJI", "Dow Jones Industrial Average", "Index", 38_989.8),
    ("^IXIC", "NASDAQ Composite", "Index", 16_091.9),
];

const HEADLINES: &[&str] = &[
    "{name} shares move as traders weigh the latest guidance",
    "What analysts are watching in {name} this quarter",
    "{name} draws fresh attention after a busy session",
];

/// Deterministic provider for demo mode and local development.
///
/// Quotes are derived from a per-symbol hash so they are stable across runs.
/// It never returns historical bars, so every series is served by the
/// synthetic tier.
#[derive(Debug, Clone, Default)]
pub struct OfflineProvider {
    as_of: Option<OffsetDateTime>,
}

impl OfflineProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the quote/news timestamps instead of reading the wall clock.
    pub fn with_as_of(mut self, as_of: OffsetDateTime) -> Self {
        self.as_of = Some(as_of);
        self
    }

    fn now(&self) -> OffsetDateTime {
        self.as_of.unwrap_or_else(OffsetDateTime::now_utc)
    }

    fn lookup(symbol: &Symbol) -> Option<&'static (&'static str, &'static str, &'static str, f64)> {
        CATALOG.iter().find(|entry| entry.0 == symbol.as_str())
    }

    fn quote_for(&self, symbol: &Symbol, reference: f64, kind: &str) -> ProviderQuote {
        let seed = symbol.seed();
        // Daily move between -3.5% and +3.5%.
        let move_pct = ((seed % 701) as f64 - 350.0) / 100.0;
        let previous_close = reference;
        let price = round_cents(previous_close * (1.0 + move_pct / 100.0));
        let open = round_cents(previous_close * (1.0 + ((seed % 41) as f64 - 20.0) / 10_000.0));
        let high = round_cents(price.max(open) * 1.006);
        let low = round_cents(price.min(open) * 0.994);
        let volume = if kind == "Index" {
            0.0
        } else {
            (5_000_000 + seed % 45_000_000) as f64
        };

        ProviderQuote {
            symbol: symbol.as_str().to_owned(),
            currency: Some(String::from("USD")),
            regular_market_open: Some(RawNumber::from(open)),
            regular_market_day_high: Some(RawNumber::from(high)),
            regular_market_day_low: Some(RawNumber::from(low)),
            regular_market_price: Some(RawNumber::from(price)),
            regular_market_volume: Some(RawNumber::from(volume)),
            regular_market_previous_close: Some(RawNumber::from(previous_close)),
            regular_market_time: Some(RawNumber::from(self.now().unix_timestamp() as f64)),
            ..ProviderQuote::default()
        }
    }
}

impl MarketDataProvider for OfflineProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Offline
    }

    fn fetch_quote<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, ProviderQuote> {
        Box::pin(async move {
            let (_, name, kind, reference) = Self::lookup(symbol).ok_or_else(|| {
                ProviderError::not_found(format!("offline catalog has no symbol '{symbol}'"))
            })?;
            let mut quote = self.quote_for(symbol, *reference, kind);
            quote.short_name = Some((*name).to_owned());
            Ok(quote)
        })
    }

    fn fetch_search<'a>(
        &'a self,
        request: &'a SearchRequest,
    ) -> ProviderFuture<'a, Vec<ProviderSearchMatch>> {
        Box::pin(async move {
            let needle = request.query.to_ascii_lowercase();
            Ok(CATALOG
                .iter()
                .filter(|(symbol, name, _, _)| {
                    symbol.to_ascii_lowercase().contains(&needle)
                        || name.to_ascii_lowercase().contains(&needle)
                })
                .take(request.limit)
                .map(|(symbol, name, kind, _)| ProviderSearchMatch {
                    symbol: (*symbol).to_owned(),
                    short_name: Some((*name).to_owned()),
                    long_name: Some((*name).to_owned()),
                    quote_type: Some(kind.to_ascii_uppercase()),
                    type_display: Some((*kind).to_owned()),
                    exchange: Some(String::from("NMS")),
                    score: None,
                })
                .collect())
        })
    }

    fn fetch_historical<'a>(
        &'a self,
        request: &'a HistoricalRequest,
    ) -> ProviderFuture<'a, Vec<ProviderBar>> {
        Box::pin(async move {
            tracing::trace!(symbol = %request.symbol, "offline provider has no history");
            Ok(Vec::new())
        })
    }

    fn fetch_news<'a>(
        &'a self,
        symbol: &'a Symbol,
        limit: usize,
    ) -> ProviderFuture<'a, Vec<ProviderNewsItem>> {
        Box::pin(async move {
            let (ticker, name, _, _) = Self::lookup(symbol).ok_or_else(|| {
                ProviderError::not_found(format!("offline catalog has no symbol '{symbol}'"))
            })?;
            let now = self.now();
            let slug = ticker.trim_start_matches('^').to_ascii_lowercase();

            Ok(HEADLINES
                .iter()
                .enumerate()
                .take(limit)
                .map(|(index, headline)| ProviderNewsItem {
                    uuid: format!("{slug}-{index}"),
                    title: headline.replace("{name}", name),
                    summary: Some(format!(
                        "A roundup of the session for {name} ({ticker}), covering price action and volume."
                    )),
                    link: format!("https://example.com/news/{slug}/{index}"),
                    publisher: Some(String::from("TickerDeck Wire")),
                    provider_publish_time: Some(
                        (now - Duration::hours(3 * index as i64 + 1)).unix_timestamp(),
                    ),
                    kind: Some(String::from("STORY")),
                    thumbnail: Some(ProviderThumbnail {
                        resolutions: vec![ProviderImage {
                            url: format!("https://example.com/images/{slug}.png"),
                            width: Some(640),
                        }],
                    }),
                    related_tickers: vec![(*ticker).to_owned()],
                })
                .collect())
        })
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
