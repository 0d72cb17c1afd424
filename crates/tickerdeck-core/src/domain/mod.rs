//! # Domain Models
//!
//! Two families of types live here:
//!
//! | Family | Types | Shape |
//! |--------|-------|-------|
//! | Raw | [`ProviderQuote`], [`ProviderBar`], [`ProviderSearchMatch`], [`ProviderNewsItem`] | As the upstream provider sends them, numbers loosely typed |
//! | Canonical | [`Quote`], [`Candle`], [`SeriesResponse`], [`SearchMatch`], [`NewsItem`] | The fixed schema every consumer reads |
//!
//! Canonical numbers are serialized as decimal strings (`"150.25"`), and
//! series containers are keyed by [`Granularity::container_key`].

mod granularity;
mod models;
mod raw;
mod symbol;
mod timestamp;

pub use granularity::Granularity;
pub use models::{
    format_decimal, format_percent, Candle, NewsFeed, NewsItem, NewsTopic, Quote, QuoteResponse,
    SearchMatch, SearchResponse, SeriesOrigin, SeriesResponse,
};
pub use raw::{
    coerce, ProviderBar, ProviderImage, ProviderNewsItem, ProviderQuote, ProviderSearchMatch,
    ProviderThumbnail, RawNumber,
};
pub use symbol::Symbol;
pub use timestamp::{
    format_date_key, format_intraday_key, format_news_stamp, parse_series_key, UtcDateTime,
};
