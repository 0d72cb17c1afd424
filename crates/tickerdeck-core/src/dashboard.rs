//! Dashboard views assembled from repository rows and batched quotes.
//!
//! Quote loops go through [`MarketService::quotes`], so they respect the
//! configured fetch policy (sequential by default). A failed quote never fails
//! the view: holdings are flagged, list entries are dropped.

use std::cmp::Ordering;

use serde::Serialize;

use crate::domain::Quote;
use crate::service::MarketService;
use crate::store::{Holding, MarketIndex, WatchlistEntry};
use crate::Symbol;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingValuation {
    #[serde(flatten)]
    pub holding: Holding,
    pub quote_available: bool,
    pub last_price: f64,
    pub market_value: f64,
    pub cost_basis: f64,
    pub gain: f64,
    pub gain_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub holdings: Vec<HoldingValuation>,
    pub total_value: f64,
    pub total_cost: f64,
    pub total_gain: f64,
    pub total_gain_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchlistQuote {
    pub id: u64,
    pub symbol: Symbol,
    #[serde(rename = "Global Quote")]
    pub quote: Quote,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexQuote {
    pub symbol: Symbol,
    pub name: String,
    #[serde(rename = "Global Quote")]
    pub quote: Quote,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopMovers {
    pub gainers: Vec<Quote>,
    pub losers: Vec<Quote>,
}

pub async fn portfolio_summary(service: &MarketService, holdings: Vec<Holding>) -> PortfolioSummary {
    let symbols = holdings.iter().map(|holding| holding.symbol.clone()).collect();
    let quotes = service.quotes(symbols).await;

    let valuations = holdings
        .into_iter()
        .zip(quotes)
        .map(|(holding, (_, quote))| {
            let last_price = match quote {
                Ok(quote) => Some(quote.price),
                Err(error) => {
                    tracing::warn!(symbol = %holding.symbol, code = error.code(), "holding quote unavailable");
                    None
                }
            };
            value_holding(holding, last_price)
        })
        .collect::<Vec<_>>();

    let total_value = valuations.iter().map(|v| v.market_value).sum::<f64>();
    let total_cost = valuations.iter().map(|v| v.cost_basis).sum::<f64>();
    let total_gain = valuations.iter().map(|v| v.gain).sum::<f64>();

    PortfolioSummary {
        holdings: valuations,
        total_value,
        total_cost,
        total_gain,
        total_gain_percent: percent_of(total_gain, total_cost),
    }
}

fn value_holding(holding: Holding, last_price: Option<f64>) -> HoldingValuation {
    let cost_basis = holding.shares * holding.average_cost;
    let price = last_price.unwrap_or(0.0);
    let market_value = holding.shares * price;
    // Unpriced holdings report no gain rather than a total loss.
    let gain = if last_price.is_some() {
        market_value - cost_basis
    } else {
        0.0
    };

    HoldingValuation {
        holding,
        quote_available: last_price.is_some(),
        last_price: price,
        market_value,
        cost_basis,
        gain,
        gain_percent: percent_of(gain, cost_basis),
    }
}

pub async fn watchlist_quotes(
    service: &MarketService,
    entries: Vec<WatchlistEntry>,
) -> Vec<WatchlistQuote> {
    let symbols = entries.iter().map(|entry| entry.symbol.clone()).collect();
    let quotes = service.quotes(symbols).await;

    entries
        .into_iter()
        .zip(quotes)
        .filter_map(|(entry, (symbol, quote))| match quote {
            Ok(quote) => Some(WatchlistQuote {
                id: entry.id,
                symbol,
                quote,
            }),
            Err(error) => {
                tracing::warn!(%symbol, code = error.code(), "dropping watchlist entry without quote");
                None
            }
        })
        .collect()
}

pub async fn index_quotes(service: &MarketService, indices: Vec<MarketIndex>) -> Vec<IndexQuote> {
    let symbols = indices.iter().map(|index| index.symbol.clone()).collect();
    let quotes = service.quotes(symbols).await;

    indices
        .into_iter()
        .zip(quotes)
        .filter_map(|(index, (_, quote))| match quote {
            Ok(quote) => Some(IndexQuote {
                symbol: index.symbol,
                name: index.name,
                quote,
            }),
            Err(error) => {
                tracing::warn!(symbol = %index.symbol, code = error.code(), "index quote unavailable");
                None
            }
        })
        .collect()
}

/// Best and worst `limit` performers of `universe` by change percent.
pub async fn top_movers(service: &MarketService, universe: Vec<Symbol>, limit: usize) -> TopMovers {
    let mut quotes = service
        .quotes(universe)
        .await
        .into_iter()
        .filter_map(|(_, quote)| quote.ok())
        .collect::<Vec<_>>();
    quotes.sort_by(|left, right| {
        right
            .change_percent
            .partial_cmp(&left.change_percent)
            .unwrap_or(Ordering::Equal)
    });

    let gainers = quotes
        .iter()
        .filter(|quote| quote.change_percent > 0.0)
        .take(limit)
        .cloned()
        .collect();
    let losers = quotes
        .iter()
        .rev()
        .filter(|quote| quote.change_percent < 0.0)
        .take(limit)
        .cloned()
        .collect();

    TopMovers { gainers, losers }
}

fn percent_of(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}
