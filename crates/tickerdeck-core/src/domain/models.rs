use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::Granularity;

/// Canonical quote, serialized under `"Global Quote"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    #[serde(rename = "01. symbol")]
    pub symbol: String,
    #[serde(rename = "02. open", serialize_with = "price_string")]
    pub open: f64,
    #[serde(rename = "03. high", serialize_with = "price_string")]
    pub high: f64,
    #[serde(rename = "04. low", serialize_with = "price_string")]
    pub low: f64,
    #[serde(rename = "05. price", serialize_with = "price_string")]
    pub price: f64,
    #[serde(rename = "06. volume", serialize_with = "volume_string")]
    pub volume: u64,
    #[serde(rename = "07. latest trading day")]
    pub latest_trading_day: String,
    #[serde(rename = "08. previous close", serialize_with = "price_string")]
    pub previous_close: f64,
    #[serde(rename = "09. change", serialize_with = "price_string")]
    pub change: f64,
    /// Already scaled to percent (1.5 means 1.5%).
    #[serde(rename = "10. change percent", serialize_with = "percent_string")]
    pub change_percent: f64,
}

/// `GET /quote` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteResponse {
    #[serde(rename = "Global Quote")]
    pub quote: Quote,
}

/// One OHLCV bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candle {
    #[serde(rename = "1. open", serialize_with = "price_string")]
    pub open: f64,
    #[serde(rename = "2. high", serialize_with = "price_string")]
    pub high: f64,
    #[serde(rename = "3. low", serialize_with = "price_string")]
    pub low: f64,
    #[serde(rename = "4. close", serialize_with = "price_string")]
    pub close: f64,
    #[serde(rename = "5. volume", serialize_with = "volume_string")]
    pub volume: u64,
}

impl Candle {
    /// Builds a candle whose high/low are widened to contain open and close.
    pub fn enclosing(open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            open,
            high: high.max(open).max(close),
            low: low.min(open).min(close),
            close,
            volume,
        }
    }

    pub fn is_well_ordered(&self) -> bool {
        self.low <= self.open.min(self.close) && self.open.max(self.close) <= self.high
    }
}

/// Where a series' candles came from. Not part of the canonical series
/// payload, where the origin only shows through `Meta Data."1. Information"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesOrigin {
    Provider,
    Synthetic,
    Empty,
}

/// Canonical time series: `Meta Data` plus exactly one granularity container.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesResponse {
    pub symbol: String,
    pub granularity: Granularity,
    pub origin: SeriesOrigin,
    pub information: String,
    pub last_refreshed: String,
    pub entries: BTreeMap<String, Candle>,
}

impl SeriesResponse {
    /// Well-formed shell with an empty container.
    pub fn empty(symbol: impl Into<String>, granularity: Granularity, information: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            granularity,
            origin: SeriesOrigin::Empty,
            information: information.into(),
            last_refreshed: String::new(),
            entries: BTreeMap::new(),
        }
    }

    pub fn container_key(&self) -> &'static str {
        self.granularity.container_key()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn meta_data(&self) -> BTreeMap<&'static str, String> {
        let mut meta = BTreeMap::new();
        meta.insert("1. Information", self.information.clone());
        meta.insert("2. Symbol", self.symbol.clone());
        meta.insert("3. Last Refreshed", self.last_refreshed.clone());
        if self.granularity.is_intraday() {
            meta.insert("4. Interval", self.granularity.as_str().to_owned());
            meta.insert("5. Time Zone", String::from("UTC"));
        } else {
            meta.insert("4. Time Zone", String::from("UTC"));
        }
        meta
    }
}

impl Serialize for SeriesResponse {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("Meta Data", &self.meta_data())?;
        map.serialize_entry(self.container_key(), &self.entries)?;
        map.end()
    }
}

/// Canonical search match (`bestMatches` item).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchMatch {
    #[serde(rename = "1. symbol")]
    pub symbol: String,
    #[serde(rename = "2. name")]
    pub name: String,
    #[serde(rename = "3. type")]
    pub kind: String,
    #[serde(rename = "4. region")]
    pub region: String,
    #[serde(rename = "5. marketOpen")]
    pub market_open: String,
    #[serde(rename = "6. marketClose")]
    pub market_close: String,
    #[serde(rename = "7. timezone")]
    pub timezone: String,
    #[serde(rename = "8. currency")]
    pub currency: String,
    #[serde(rename = "9. matchScore")]
    pub match_score: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResponse {
    #[serde(rename = "bestMatches")]
    pub best_matches: Vec<SearchMatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsTopic {
    pub topic: String,
    pub relevance_score: String,
}

/// Canonical news item (`feed` item).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    pub time_published: String,
    pub summary: String,
    pub banner_image: Option<String>,
    pub source: String,
    pub topics: Vec<NewsTopic>,
    pub tickers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewsFeed {
    pub feed: Vec<NewsItem>,
}

/// Rounds to four decimals and prints the shortest decimal form (`2`, not `2.0`).
pub fn format_decimal(value: f64) -> String {
    if !value.is_finite() {
        return String::from("0");
    }
    let rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded == 0.0 {
        return String::from("0");
    }
    rounded.to_string()
}

pub fn format_percent(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{value:.4}%")
}

fn price_string<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_decimal(*value))
}

fn volume_string<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(value)
}

fn percent_string<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_percent(*value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_decimals_without_trailing_zeroes() {
        assert_eq!(format_decimal(2.0), "2");
        assert_eq!(format_decimal(150.123456), "150.1235");
        assert_eq!(format_decimal(-0.00001), "0");
        assert_eq!(format_decimal(f64::NAN), "0");
        assert_eq!(format_percent(1.351351), "1.3514%");
    }

    #[test]
    fn enclosing_candle_is_well_ordered() {
        let candle = Candle::enclosing(10.0, 9.5, 10.5, 11.0, 100);
        assert_eq!(candle.high, 11.0);
        assert_eq!(candle.low, 10.0);
        assert!(candle.is_well_ordered());
    }

    #[test]
    fn series_serializes_exactly_one_container() {
        let mut series = SeriesResponse::empty("AAPL", Granularity::Weekly, "none");
        series
            .entries
            .insert(String::from("2024-03-01"), Candle::enclosing(1.0, 2.0, 0.5, 1.5, 7));

        let json = serde_json::to_value(&series).expect("serialize");
        let object = json.as_object().expect("object");
        assert_eq!(object.len(), 2);
        assert_eq!(json["Meta Data"]["2. Symbol"], "AAPL");
        assert_eq!(json["Weekly Time Series"]["2024-03-01"]["5. volume"], "7");
        assert_eq!(json["Weekly Time Series"]["2024-03-01"]["2. high"], "2");
    }

    #[test]
    fn intraday_meta_data_names_the_interval() {
        let series = SeriesResponse::empty("MSFT", Granularity::FiveMinutes, "none");
        let json = serde_json::to_value(&series).expect("serialize");
        assert_eq!(json["Meta Data"]["4. Interval"], "5min");
        assert!(json["Time Series (5min)"].as_object().expect("container").is_empty());
    }
}
