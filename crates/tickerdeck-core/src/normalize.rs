//! Reshapes raw provider records into the canonical schema.
//!
//! Every function here is pure: same input, same output, no clock reads.

use time::OffsetDateTime;

use crate::domain::{
    coerce, format_date_key, format_intraday_key, format_news_stamp, Candle, NewsItem, NewsTopic,
    ProviderBar, ProviderNewsItem, ProviderQuote, ProviderSearchMatch, Quote, SearchMatch,
    SearchResponse, SeriesOrigin, SeriesResponse,
};
use crate::provider::ProviderError;
use crate::{Granularity, Symbol};

const DEFAULT_REGION: &str = "United States";
const DEFAULT_MARKET_OPEN: &str = "09:30";
const DEFAULT_MARKET_CLOSE: &str = "16:00";
const DEFAULT_TIMEZONE: &str = "UTC-04";
const DEFAULT_CURRENCY: &str = "USD";

/// Maps a raw quote to the canonical `Global Quote`.
///
/// A blank symbol is how the upstream says "no such instrument", so it maps to
/// `NotFound` rather than to a zero-filled quote.
pub fn normalize_quote(raw: &ProviderQuote) -> Result<Quote, ProviderError> {
    let symbol = raw.symbol.trim();
    if symbol.is_empty() {
        return Err(ProviderError::not_found("provider returned an empty quote"));
    }

    let price = coerce(raw.regular_market_price.as_ref());
    let previous_close = coerce(raw.regular_market_previous_close.as_ref());
    let change = raw
        .regular_market_change
        .as_ref()
        .and_then(|value| value.value())
        .unwrap_or(price - previous_close);
    let change_percent = if previous_close == 0.0 {
        0.0
    } else {
        change / previous_close * 100.0
    };

    let latest_trading_day = raw
        .regular_market_time
        .as_ref()
        .and_then(|value| value.value())
        .and_then(|seconds| OffsetDateTime::from_unix_timestamp(seconds as i64).ok())
        .map(|ts| format_date_key(ts.date()))
        .unwrap_or_default();

    Ok(Quote {
        symbol: symbol.to_ascii_uppercase(),
        open: coerce(raw.regular_market_open.as_ref()),
        high: coerce(raw.regular_market_day_high.as_ref()),
        low: coerce(raw.regular_market_day_low.as_ref()),
        price,
        volume: to_volume(coerce(raw.regular_market_volume.as_ref())),
        latest_trading_day,
        previous_close,
        change,
        change_percent,
    })
}

/// Builds a canonical series from provider bars.
///
/// Bars missing any OHLC value (the provider pads non-trading slots with
/// nulls) are dropped; a missing volume counts as zero.
pub fn normalize_series(
    symbol: &Symbol,
    granularity: Granularity,
    bars: &[ProviderBar],
) -> SeriesResponse {
    let mut series = SeriesResponse::empty(symbol.as_str(), granularity, granularity.description());
    series.origin = SeriesOrigin::Provider;

    for bar in bars {
        let (Some(open), Some(high), Some(low), Some(close)) = (bar.open, bar.high, bar.low, bar.close)
        else {
            continue;
        };
        let Ok(ts) = OffsetDateTime::from_unix_timestamp(bar.timestamp) else {
            continue;
        };
        let key = series_key(granularity, ts);
        let candle = Candle {
            open,
            high,
            low,
            close,
            volume: to_volume(bar.volume.unwrap_or(0.0)),
        };
        series.entries.insert(key, candle);
    }

    series.last_refreshed = series.entries.keys().next_back().cloned().unwrap_or_default();
    series
}

/// Formats the map key for a bucket starting at `ts`.
pub fn series_key(granularity: Granularity, ts: OffsetDateTime) -> String {
    if granularity.is_intraday() {
        format_intraday_key(ts)
    } else {
        format_date_key(ts.date())
    }
}

/// Keeps provider relevance order and truncates to `limit`. Fields the
/// provider doesn't carry get fixed US-market placeholders.
pub fn normalize_search(matches: &[ProviderSearchMatch], limit: usize) -> SearchResponse {
    let kept = matches.len().min(limit);
    let best_matches = matches
        .iter()
        .take(limit)
        .enumerate()
        .map(|(rank, raw)| SearchMatch {
            symbol: raw.symbol.clone(),
            name: raw
                .long_name
                .clone()
                .or_else(|| raw.short_name.clone())
                .unwrap_or_else(|| raw.symbol.clone()),
            kind: raw
                .type_display
                .clone()
                .or_else(|| raw.quote_type.clone())
                .unwrap_or_else(|| String::from("Equity")),
            region: String::from(DEFAULT_REGION),
            market_open: String::from(DEFAULT_MARKET_OPEN),
            market_close: String::from(DEFAULT_MARKET_CLOSE),
            timezone: String::from(DEFAULT_TIMEZONE),
            currency: String::from(DEFAULT_CURRENCY),
            match_score: format!("{:.4}", 1.0 - rank as f64 / kept as f64),
        })
        .collect();

    SearchResponse { best_matches }
}

/// Maps raw news items; items without a title or link are dropped.
/// Summaries are passed through untruncated.
pub fn normalize_news(items: Vec<ProviderNewsItem>) -> Vec<NewsItem> {
    items
        .into_iter()
        .filter(|item| !item.title.trim().is_empty() && !item.link.trim().is_empty())
        .map(|item| {
            let banner_image = item.banner_url().map(str::to_owned);
            let time_published = item
                .provider_publish_time
                .and_then(|seconds| OffsetDateTime::from_unix_timestamp(seconds).ok())
                .map(format_news_stamp)
                .unwrap_or_default();
            let topics = item
                .kind
                .as_deref()
                .map(|kind| NewsTopic {
                    topic: topic_label(kind),
                    relevance_score: String::from("1.0"),
                })
                .into_iter()
                .collect();

            NewsItem {
                title: item.title,
                url: item.link,
                time_published,
                summary: item.summary.unwrap_or_default(),
                banner_image,
                source: item.publisher.unwrap_or_else(|| String::from("Unknown")),
                topics,
                tickers: item.related_tickers,
            }
        })
        .collect()
}

fn topic_label(kind: &str) -> String {
    let lower = kind.trim().to_ascii_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::from("General"),
    }
}

fn to_volume(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}
