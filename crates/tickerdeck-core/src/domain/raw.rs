//! Provider-shaped records as they arrive from the upstream API.
//!
//! Field lists are exhaustive for what the normalizer reads. Numeric fields
//! stay loosely typed ([`RawNumber`]) until [`coerce`] pins them to `f64`.

use serde::Deserialize;

/// A numeric field that may arrive as a JSON number, a numeric string, or a
/// `{ "raw": 1.23, "fmt": "1.23" }` wrapper.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
    Wrapped {
        #[serde(default)]
        raw: Option<f64>,
    },
}

impl RawNumber {
    /// Finite value carried by this field, if any.
    pub fn value(&self) -> Option<f64> {
        let value = match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text
                .trim()
                .trim_end_matches('%')
                .replace(',', "")
                .parse::<f64>()
                .ok(),
            Self::Wrapped { raw } => *raw,
        };
        value.filter(|value| value.is_finite())
    }
}

impl From<f64> for RawNumber {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawNumber {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Coerces an optional provider number; absent or unparseable input is `0.0`.
pub fn coerce(value: Option<&RawNumber>) -> f64 {
    value.and_then(RawNumber::value).unwrap_or(0.0)
}

/// Raw quote record (`/v7/finance/quote` result item).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderQuote {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub regular_market_open: Option<RawNumber>,
    #[serde(default)]
    pub regular_market_day_high: Option<RawNumber>,
    #[serde(default)]
    pub regular_market_day_low: Option<RawNumber>,
    #[serde(default)]
    pub regular_market_price: Option<RawNumber>,
    #[serde(default)]
    pub regular_market_volume: Option<RawNumber>,
    #[serde(default)]
    pub regular_market_previous_close: Option<RawNumber>,
    #[serde(default)]
    pub regular_market_change: Option<RawNumber>,
    #[serde(default)]
    pub regular_market_change_percent: Option<RawNumber>,
    /// Unix seconds of the last trade.
    #[serde(default)]
    pub regular_market_time: Option<RawNumber>,
}

/// One historical bar, already unzipped from the provider's columnar layout.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProviderBar {
    /// Unix seconds at bucket start.
    pub timestamp: i64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// Raw search match (`/v1/finance/search` `quotes[]`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderSearchMatch {
    #[serde(default)]
    pub symbol: String,
    #[serde(rename = "shortname", default)]
    pub short_name: Option<String>,
    #[serde(rename = "longname", default)]
    pub long_name: Option<String>,
    #[serde(rename = "quoteType", default)]
    pub quote_type: Option<String>,
    #[serde(rename = "typeDisp", default)]
    pub type_display: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub score: Option<RawNumber>,
}

/// Raw news item (`/v1/finance/search` `news[]`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderNewsItem {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub provider_publish_time: Option<i64>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<ProviderThumbnail>,
    #[serde(default)]
    pub related_tickers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderThumbnail {
    #[serde(default)]
    pub resolutions: Vec<ProviderImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderImage {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
}

impl ProviderNewsItem {
    /// Widest thumbnail offered, used as the banner image.
    pub fn banner_url(&self) -> Option<&str> {
        self.thumbnail
            .as_ref()?
            .resolutions
            .iter()
            .max_by_key(|image| image.width.unwrap_or(0))
            .map(|image| image.url.as_str())
    }
}
