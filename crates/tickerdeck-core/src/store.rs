//! In-memory storage for portfolio holdings, the watchlist and market indices.
//!
//! State is process-local and lost on restart.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Symbol, UtcDateTime, ValidationError};

const SEEDED_INDICES: [(&str, &str); 3] = [
    ("^GSPC", "S&P 500"),
    ("^DJI", "Dow Jones Industrial Average"),
    ("^IXIC", "NASDAQ Composite"),
];

const SEEDED_MOVERS: [&str; 12] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "META", "TSLA", "JPM", "V", "NFLX", "AMD", "INTC",
];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("{table} entry {id} does not exist")]
    NotFound { table: &'static str, id: u64 },
    #[error("symbol '{symbol}' is already on the watchlist")]
    DuplicateSymbol { symbol: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub id: u64,
    pub symbol: Symbol,
    pub shares: f64,
    pub average_cost: f64,
    pub added_at: UtcDateTime,
}

/// Holding as submitted by a client, before it gets an id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewHolding {
    pub symbol: Symbol,
    pub shares: f64,
    pub average_cost: f64,
}

impl NewHolding {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [("shares", self.shares), ("average_cost", self.average_cost)] {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteValue { field });
            }
            if value <= 0.0 {
                return Err(ValidationError::NonPositiveValue { field });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchlistEntry {
    pub id: u64,
    pub symbol: Symbol,
    pub added_at: UtcDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketIndex {
    pub symbol: Symbol,
    pub name: String,
}

/// Storage seam for dashboard state.
pub trait Repository: Send + Sync {
    fn holdings(&self) -> Vec<Holding>;
    fn add_holding(&self, holding: NewHolding) -> Result<Holding, StoreError>;
    fn remove_holding(&self, id: u64) -> Result<Holding, StoreError>;

    fn watchlist(&self) -> Vec<WatchlistEntry>;
    /// Rejects a symbol that is already listed.
    fn add_to_watchlist(&self, symbol: Symbol) -> Result<WatchlistEntry, StoreError>;
    fn remove_from_watchlist(&self, id: u64) -> Result<WatchlistEntry, StoreError>;

    fn indices(&self) -> Vec<MarketIndex>;
    /// Symbols scanned for top gainers/losers.
    fn movers_universe(&self) -> Vec<Symbol>;
}

/// Arena of rows keyed by a monotonically increasing id. Ids are never reused.
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<u64, T>,
    next_id: u64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T: Clone> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(u64) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }

    fn remove(&mut self, table: &'static str, id: u64) -> Result<T, StoreError> {
        self.rows.remove(&id).ok_or(StoreError::NotFound { table, id })
    }

    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }
}

#[derive(Debug, Default)]
struct Tables {
    holdings: Table<Holding>,
    watchlist: Table<WatchlistEntry>,
    indices: Vec<MarketIndex>,
    movers: Vec<Symbol>,
}

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    /// Empty portfolio and watchlist; indices and the movers universe seeded.
    pub fn new() -> Self {
        let tables = Tables {
            indices: SEEDED_INDICES
                .iter()
                .filter_map(|(symbol, name)| {
                    Some(MarketIndex {
                        symbol: Symbol::parse(symbol).ok()?,
                        name: (*name).to_owned(),
                    })
                })
                .collect(),
            movers: SEEDED_MOVERS
                .iter()
                .filter_map(|symbol| Symbol::parse(symbol).ok())
                .collect(),
            ..Tables::default()
        };
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// [`new`](Self::new) plus a small demo portfolio and watchlist.
    pub fn with_demo_data() -> Result<Self, StoreError> {
        let repository = Self::new();
        for (symbol, shares, average_cost) in [("AAPL", 10.0, 150.0), ("MSFT", 5.0, 380.0)] {
            repository.add_holding(NewHolding {
                symbol: Symbol::parse(symbol)?,
                shares,
                average_cost,
            })?;
        }
        for symbol in ["NVDA", "TSLA", "AMZN"] {
            repository.add_to_watchlist(Symbol::parse(symbol)?)?;
        }
        Ok(repository)
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Repository for InMemoryRepository {
    fn holdings(&self) -> Vec<Holding> {
        self.read().holdings.all()
    }

    fn add_holding(&self, holding: NewHolding) -> Result<Holding, StoreError> {
        holding.validate()?;
        let added_at = UtcDateTime::now();
        let created = self.write().holdings.insert_with(|id| Holding {
            id,
            symbol: holding.symbol,
            shares: holding.shares,
            average_cost: holding.average_cost,
            added_at,
        });
        tracing::debug!(id = created.id, symbol = %created.symbol, "holding added");
        Ok(created)
    }

    fn remove_holding(&self, id: u64) -> Result<Holding, StoreError> {
        self.write().holdings.remove("holding", id)
    }

    fn watchlist(&self) -> Vec<WatchlistEntry> {
        self.read().watchlist.all()
    }

    fn add_to_watchlist(&self, symbol: Symbol) -> Result<WatchlistEntry, StoreError> {
        let mut tables = self.write();
        if tables.watchlist.rows.values().any(|entry| entry.symbol == symbol) {
            return Err(StoreError::DuplicateSymbol {
                symbol: symbol.to_string(),
            });
        }
        let added_at = UtcDateTime::now();
        Ok(tables.watchlist.insert_with(|id| WatchlistEntry {
            id,
            symbol,
            added_at,
        }))
    }

    fn remove_from_watchlist(&self, id: u64) -> Result<WatchlistEntry, StoreError> {
        self.write().watchlist.remove("watchlist", id)
    }

    fn indices(&self) -> Vec<MarketIndex> {
        self.read().indices.clone()
    }

    fn movers_universe(&self) -> Vec<Symbol> {
        self.read().movers.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(value: &str) -> Symbol {
        Symbol::parse(value).expect("symbol")
    }

    #[test]
    fn ids_increase_and_are_not_reused() {
        let repository = InMemoryRepository::new();
        let first = repository
            .add_holding(NewHolding {
                symbol: symbol("AAPL"),
                shares: 1.0,
                average_cost: 100.0,
            })
            .expect("insert");
        repository.remove_holding(first.id).expect("remove");
        let second = repository
            .add_holding(NewHolding {
                symbol: symbol("AAPL"),
                shares: 2.0,
                average_cost: 100.0,
            })
            .expect("insert");

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repository.holdings().len(), 1);
    }

    #[test]
    fn rejects_duplicate_watchlist_symbol() {
        let repository = InMemoryRepository::new();
        repository.add_to_watchlist(symbol("NVDA")).expect("first add");
        let err = repository
            .add_to_watchlist(symbol("nvda"))
            .expect_err("duplicate");
        assert!(matches!(err, StoreError::DuplicateSymbol { .. }));
    }

    #[test]
    fn removing_missing_row_is_not_found() {
        let repository = InMemoryRepository::new();
        let err = repository.remove_from_watchlist(42).expect_err("missing");
        assert_eq!(err, StoreError::NotFound { table: "watchlist", id: 42 });
    }

    #[test]
    fn validates_new_holdings() {
        let repository = InMemoryRepository::new();
        let err = repository
            .add_holding(NewHolding {
                symbol: symbol("AAPL"),
                shares: 0.0,
                average_cost: 10.0,
            })
            .expect_err("zero shares");
        assert_eq!(
            err,
            StoreError::Validation(ValidationError::NonPositiveValue { field: "shares" })
        );
    }

    #[test]
    fn seeds_indices_and_demo_data() {
        let repository = InMemoryRepository::with_demo_data().expect("demo data");
        let indices = repository
            .indices()
            .into_iter()
            .map(|index| index.symbol.to_string())
            .collect::<Vec<_>>();
        assert_eq!(indices, vec!["^GSPC", "^DJI", "^IXIC"]);
        assert_eq!(repository.holdings().len(), 2);
        assert_eq!(repository.watchlist().len(), 3);
        assert_eq!(repository.movers_universe().len(), 12);
    }
}
