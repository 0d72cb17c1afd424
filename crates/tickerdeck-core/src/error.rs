use thiserror::Error;

use crate::provider::ProviderError;
use crate::store::StoreError;

/// Validation errors raised while parsing inbound identifiers and selectors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter or '^': '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid timeframe '{value}', expected one of 1D, 1W, 1M, 3M, 1Y, 5Y, Max")]
    InvalidTimeframe { value: String },
    #[error("invalid interval '{value}', expected one of 5min, 60min")]
    InvalidInterval { value: String },
    #[error("invalid provider '{value}', expected one of yahoo, offline")]
    InvalidProvider { value: String },

    #[error("series timestamp '{value}' is not in YYYY-MM-DD[ HH:MM:SS] form")]
    InvalidSeriesTimestamp { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be greater than zero")]
    NonPositiveValue { field: &'static str },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
