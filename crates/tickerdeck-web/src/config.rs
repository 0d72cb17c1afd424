//! Server configuration from command-line flags with environment fallbacks.
//!
//! | Flag | Environment | Default |
//! |------|-------------|---------|
//! | `--bind` | `TICKERDECK_BIND` | `127.0.0.1:8080` |
//! | `--provider` | `TICKERDECK_PROVIDER` | `yahoo` |
//! | `--synthetic-seed` | `TICKERDECK_SYNTHETIC_SEED` | entropy |
//! | `--news-symbols` | `TICKERDECK_NEWS_SYMBOLS` | `AAPL,MSFT,GOOGL,AMZN,TSLA` |
//! | `--max-concurrency` | `TICKERDECK_MAX_CONCURRENCY` | `1` |
//! | `--quota-per-minute` | `TICKERDECK_QUOTA_PER_MINUTE` | unlimited |
//! | `--upstream-timeout-ms` | `TICKERDECK_UPSTREAM_TIMEOUT_MS` | transport default |
//! | `--demo-data` | `TICKERDECK_DEMO_DATA` | `false` |

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use tickerdeck_core::{CoreError, FetchPolicy, ProviderId, ServiceConfig, Symbol};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "tickerdeck",
    version,
    about = "Market dashboard backend with canonical quotes and synthetic series fallback"
)]
pub struct Config {
    /// Address the HTTP server listens on.
    #[arg(long, env = "TICKERDECK_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Upstream provider: yahoo, or offline (alias mock) for deterministic demo data.
    #[arg(long, env = "TICKERDECK_PROVIDER", default_value = "yahoo")]
    pub provider: ProviderId,

    /// Fixed seed for synthetic series. Unset draws a fresh seed per request.
    #[arg(long, env = "TICKERDECK_SYNTHETIC_SEED")]
    pub synthetic_seed: Option<u64>,

    /// Comma-separated symbols merged into the market news feed.
    #[arg(long, env = "TICKERDECK_NEWS_SYMBOLS", value_delimiter = ',')]
    pub news_symbols: Vec<String>,

    /// Quote calls in flight at once for watchlist, portfolio, indices and movers.
    #[arg(long, env = "TICKERDECK_MAX_CONCURRENCY", default_value_t = 1)]
    pub max_concurrency: usize,

    /// Upper bound on batched quote calls per minute.
    #[arg(long, env = "TICKERDECK_QUOTA_PER_MINUTE")]
    pub quota_per_minute: Option<u32>,

    /// Timeout for each upstream request in milliseconds.
    #[arg(long, env = "TICKERDECK_UPSTREAM_TIMEOUT_MS")]
    pub upstream_timeout_ms: Option<u64>,

    /// Seed the portfolio and watchlist with a few demo rows.
    #[arg(long, env = "TICKERDECK_DEMO_DATA", default_value_t = false)]
    pub demo_data: bool,
}

impl Config {
    pub fn fetch_policy(&self) -> FetchPolicy {
        let policy = FetchPolicy::sequential().with_max_concurrency(self.max_concurrency);
        match self.quota_per_minute {
            Some(limit) if limit > 0 => policy.with_quota(Duration::from_secs(60), limit),
            _ => policy,
        }
    }

    pub fn service_config(&self) -> Result<ServiceConfig, CoreError> {
        let mut config = ServiceConfig {
            synthetic_seed: self.synthetic_seed,
            fetch_policy: self.fetch_policy(),
            ..ServiceConfig::default()
        };

        let news_symbols = self
            .news_symbols
            .iter()
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(Symbol::parse)
            .collect::<Result<Vec<_>, _>>()?;
        if !news_symbols.is_empty() {
            config.news_symbols = news_symbols;
        }

        Ok(config)
    }
}
