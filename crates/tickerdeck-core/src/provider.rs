//! Upstream provider contract and request/error types.
//!
//! | Call | Request | Raw result |
//! |------|---------|------------|
//! | [`fetch_quote`](MarketDataProvider::fetch_quote) | [`Symbol`] | [`ProviderQuote`] |
//! | [`fetch_search`](MarketDataProvider::fetch_search) | [`SearchRequest`] | [`ProviderSearchMatch`] list |
//! | [`fetch_historical`](MarketDataProvider::fetch_historical) | [`HistoricalRequest`] | [`ProviderBar`] list, possibly empty |
//! | [`fetch_news`](MarketDataProvider::fetch_news) | [`Symbol`] + limit | [`ProviderNewsItem`] list |
//!
//! Providers never retry; a failed call surfaces immediately and the
//! service layer decides how to degrade.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::domain::{ProviderBar, ProviderNewsItem, ProviderQuote, ProviderSearchMatch};
use crate::{Granularity, ProviderId, Symbol};

/// Boxed future returned by every provider call.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// Provider failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    NotFound,
    Upstream,
    RateLimited,
    InvalidRequest,
}

/// Structured provider error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
}

impl ProviderError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::NotFound, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Upstream, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::RateLimited, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidRequest, message)
    }

    fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self.kind, ProviderErrorKind::NotFound)
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ProviderErrorKind::NotFound => "provider.not_found",
            ProviderErrorKind::Upstream => "provider.upstream",
            ProviderErrorKind::RateLimited => "provider.rate_limited",
            ProviderErrorKind::InvalidRequest => "provider.invalid_request",
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ProviderError {}

/// Search request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub limit: usize,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, limit: usize) -> Result<Self, ProviderError> {
        let query = query.into().trim().to_owned();
        if query.is_empty() {
            return Err(ProviderError::invalid_request("search query must not be empty"));
        }
        if limit == 0 {
            return Err(ProviderError::invalid_request(
                "search limit must be greater than zero",
            ));
        }
        Ok(Self { query, limit })
    }
}

/// How far back a historical request reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRange {
    OneDay,
    FiveDays,
    OneMonth,
    ThreeMonths,
    OneYear,
    FiveYears,
    Max,
}

impl HistoryRange {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneDay => "1d",
            Self::FiveDays => "5d",
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::OneYear => "1y",
            Self::FiveYears => "5y",
            Self::Max => "max",
        }
    }

    /// Range wide enough to fill a full canonical series of `granularity`.
    pub const fn default_for(granularity: Granularity) -> Self {
        match granularity {
            Granularity::FiveMinutes => Self::OneDay,
            Granularity::SixtyMinutes => Self::OneMonth,
            Granularity::Daily => Self::ThreeMonths,
            Granularity::Weekly => Self::FiveYears,
            Granularity::Monthly => Self::Max,
        }
    }
}

/// Historical bars request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalRequest {
    pub symbol: Symbol,
    pub granularity: Granularity,
    pub range: HistoryRange,
}

impl HistoricalRequest {
    pub fn new(symbol: Symbol, granularity: Granularity) -> Self {
        Self {
            symbol,
            granularity,
            range: HistoryRange::default_for(granularity),
        }
    }

    pub fn with_range(mut self, range: HistoryRange) -> Self {
        self.range = range;
        self
    }
}

/// Upstream market-data provider.
///
/// Implementations must be `Send + Sync`; one instance is shared by every
/// request handler.
pub trait MarketDataProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Fetches the latest quote. An unknown symbol is
    /// [`ProviderErrorKind::NotFound`].
    fn fetch_quote<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, ProviderQuote>;

    /// Fetches matches in provider relevance order.
    fn fetch_search<'a>(
        &'a self,
        request: &'a SearchRequest,
    ) -> ProviderFuture<'a, Vec<ProviderSearchMatch>>;

    /// Fetches bars ordered by timestamp; an empty list is a valid answer.
    fn fetch_historical<'a>(
        &'a self,
        request: &'a HistoricalRequest,
    ) -> ProviderFuture<'a, Vec<ProviderBar>>;

    fn fetch_news<'a>(
        &'a self,
        symbol: &'a Symbol,
        limit: usize,
    ) -> ProviderFuture<'a, Vec<ProviderNewsItem>>;
}
