use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::circuit_breaker::CircuitBreaker;
use crate::domain::{ProviderBar, ProviderNewsItem, ProviderQuote, ProviderSearchMatch};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::provider::{
    HistoricalRequest, MarketDataProvider, ProviderError, ProviderFuture, SearchRequest,
};
use crate::{Granularity, ProviderId, Symbol};

const CRUMB_TTL: Duration = Duration::from_secs(60 * 60);
const MAX_CRUMB_LEN: usize = 100;

/// Hosts the adapter talks to. Overridable so tests can point at fixtures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YahooEndpoints {
    /// Visited once per session to obtain the consent cookie.
    pub cookie_url: String,
    pub api_base: String,
}

impl Default for YahooEndpoints {
    fn default() -> Self {
        Self {
            cookie_url: String::from("https://fc.yahoo.com"),
            api_base: String::from("https://query1.finance.yahoo.com"),
        }
    }
}

/// Cookie + crumb session. The cookie lives in the transport's jar; the crumb
/// is cached here and appended to every data URL.
#[derive(Debug, Default)]
pub struct YahooSession {
    crumb: Mutex<Option<(String, Instant)>>,
}

impl YahooSession {
    async fn crumb(
        &self,
        http_client: &dyn HttpClient,
        endpoints: &YahooEndpoints,
        timeout_ms: Option<u64>,
    ) -> Result<String, ProviderError> {
        let mut cached = self.crumb.lock().await;
        if let Some((crumb, fetched_at)) = cached.as_ref() {
            if fetched_at.elapsed() < CRUMB_TTL {
                return Ok(crumb.clone());
            }
        }

        // Only the Set-Cookie side effect matters here.
        let cookie_request = HttpRequest::get(&endpoints.cookie_url)
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout_ms(timeout_ms);
        if let Err(error) = http_client.execute(cookie_request).await {
            tracing::debug!(error = %error, "yahoo cookie request failed");
        }

        let crumb_request = HttpRequest::get(format!("{}/v1/test/getcrumb", endpoints.api_base))
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout_ms(timeout_ms);
        let response = http_client.execute(crumb_request).await.map_err(|error| {
            ProviderError::upstream(format!("yahoo crumb request failed: {}", error.message()))
        })?;

        if response.status == 429 {
            return Err(ProviderError::rate_limited("yahoo rate limited the crumb request"));
        }
        let crumb = response.body.trim();
        let looks_valid = response.is_success()
            && !crumb.is_empty()
            && crumb.len() < MAX_CRUMB_LEN
            && !crumb.contains(char::is_whitespace)
            && !crumb.contains('<');
        if !looks_valid {
            return Err(ProviderError::upstream(format!(
                "yahoo returned no usable crumb (status {})",
                response.status
            )));
        }

        tracing::debug!("refreshed yahoo crumb");
        *cached = Some((crumb.to_owned(), Instant::now()));
        Ok(crumb.to_owned())
    }

    async fn invalidate(&self) {
        *self.crumb.lock().await = None;
    }
}

/// Yahoo Finance provider: v7 quote, v1 search (matches and news) and v8 chart.
pub struct YahooProvider {
    http_client: Arc<dyn HttpClient>,
    circuit_breaker: Arc<CircuitBreaker>,
    session: YahooSession,
    endpoints: YahooEndpoints,
    timeout_ms: Option<u64>,
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new()))
    }
}

impl YahooProvider {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            circuit_breaker: Arc::new(CircuitBreaker::default()),
            session: YahooSession::default(),
            endpoints: YahooEndpoints::default(),
            timeout_ms: None,
        }
    }

    pub fn with_endpoints(mut self, endpoints: YahooEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_circuit_breaker(mut self, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    /// GETs `path_and_query` under the API base with the session crumb and
    /// decodes the JSON body. A 401/403 refreshes the crumb and retries once.
    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, ProviderError> {
        if !self.circuit_breaker.allow_request() {
            return Err(ProviderError::upstream(
                "yahoo circuit breaker is open; skipping upstream call",
            ));
        }

        let mut body = self.get_once(path_and_query).await;
        if let Err(AuthRejected) = body {
            tracing::debug!("yahoo rejected crumb, refreshing session");
            self.session.invalidate().await;
            body = self.get_once(path_and_query).await;
        }

        let body = match body {
            Ok(body) => body?,
            Err(AuthRejected) => {
                self.circuit_breaker.record_failure();
                return Err(ProviderError::upstream("yahoo rejected the session after refresh"));
            }
        };

        serde_json::from_str(&body).map_err(|error| {
            ProviderError::upstream(format!("failed to parse yahoo response: {error}"))
        })
    }

    async fn get_once(
        &self,
        path_and_query: &str,
    ) -> Result<Result<String, ProviderError>, AuthRejected> {
        let crumb = match self
            .session
            .crumb(self.http_client.as_ref(), &self.endpoints, self.timeout_ms)
            .await
        {
            Ok(crumb) => crumb,
            Err(error) => {
                self.circuit_breaker.record_failure();
                return Ok(Err(error));
            }
        };

        let separator = if path_and_query.contains('?') { '&' } else { '?' };
        let url = format!(
            "{}{}{}crumb={}",
            self.endpoints.api_base,
            path_and_query,
            separator,
            urlencoding::encode(&crumb)
        );
        let request = HttpRequest::get(url)
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout_ms(self.timeout_ms);

        let response = match self.http_client.execute(request).await {
            Ok(response) => response,
            Err(error) => {
                self.circuit_breaker.record_failure();
                let reason = if error.timed_out() { "timed out" } else { "failed" };
                tracing::warn!(timed_out = error.timed_out(), "yahoo request {reason}");
                return Ok(Err(ProviderError::upstream(format!(
                    "yahoo request {reason}: {}",
                    error.message()
                ))));
            }
        };

        match response.status {
            401 | 403 => Err(AuthRejected),
            404 => {
                self.circuit_breaker.record_success();
                Ok(Err(ProviderError::not_found("yahoo returned 404")))
            }
            429 => {
                self.circuit_breaker.record_failure();
                Ok(Err(ProviderError::rate_limited("yahoo returned 429")))
            }
            _ if !response.is_success() => {
                self.circuit_breaker.record_failure();
                Ok(Err(ProviderError::upstream(format!(
                    "yahoo returned status {}",
                    response.status
                ))))
            }
            _ => {
                self.circuit_breaker.record_success();
                Ok(Ok(response.body))
            }
        }
    }
}

/// 401/403 from a data endpoint: the crumb is stale.
struct AuthRejected;

impl MarketDataProvider for YahooProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn fetch_quote<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, ProviderQuote> {
        Box::pin(async move {
            let path = format!(
                "/v7/finance/quote?symbols={}",
                urlencoding::encode(symbol.as_str())
            );
            let envelope: QuoteEnvelope = self.get_json(&path).await?;
            if let Some(error) = envelope.quote_response.error.filter(|e| !e.is_null()) {
                return Err(ProviderError::upstream(format!("yahoo quote error: {error}")));
            }

            let mut results = envelope.quote_response.result;
            let position = results
                .iter()
                .position(|quote| quote.symbol.eq_ignore_ascii_case(symbol.as_str()));
            match position {
                Some(index) => Ok(results.swap_remove(index)),
                None => Err(ProviderError::not_found(format!(
                    "yahoo has no quote for '{symbol}'"
                ))),
            }
        })
    }

    fn fetch_search<'a>(
        &'a self,
        request: &'a SearchRequest,
    ) -> ProviderFuture<'a, Vec<ProviderSearchMatch>> {
        Box::pin(async move {
            let path = format!(
                "/v1/finance/search?q={}&quotesCount={}&newsCount=0",
                urlencoding::encode(&request.query),
                request.limit
            );
            let envelope: SearchEnvelope = self.get_json(&path).await?;
            Ok(envelope
                .quotes
                .into_iter()
                .filter(|quote| !quote.symbol.is_empty())
                .collect())
        })
    }

    fn fetch_historical<'a>(
        &'a self,
        request: &'a HistoricalRequest,
    ) -> ProviderFuture<'a, Vec<ProviderBar>> {
        Box::pin(async move {
            let path = format!(
                "/v8/finance/chart/{}?range={}&interval={}",
                urlencoding::encode(request.symbol.as_str()),
                request.range.as_str(),
                chart_interval(request.granularity)
            );
            let envelope: ChartEnvelope = self.get_json(&path).await?;
            if let Some(error) = envelope.chart.error.filter(|e| !e.is_null()) {
                return Err(ProviderError::upstream(format!("yahoo chart error: {error}")));
            }

            let Some(result) = envelope.chart.result.into_iter().flatten().next() else {
                return Ok(Vec::new());
            };
            Ok(unzip_bars(result))
        })
    }

    fn fetch_news<'a>(
        &'a self,
        symbol: &'a Symbol,
        limit: usize,
    ) -> ProviderFuture<'a, Vec<ProviderNewsItem>> {
        Box::pin(async move {
            let path = format!(
                "/v1/finance/search?q={}&quotesCount=0&newsCount={}",
                urlencoding::encode(symbol.as_str()),
                limit
            );
            let envelope: SearchEnvelope = self.get_json(&path).await?;
            let mut news = envelope.news;
            news.truncate(limit);
            Ok(news)
        })
    }
}

fn chart_interval(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::FiveMinutes => "5m",
        Granularity::SixtyMinutes => "60m",
        Granularity::Daily => "1d",
        Granularity::Weekly => "1wk",
        Granularity::Monthly => "1mo",
    }
}

/// Turns the chart's parallel columns into rows. Short columns read as `None`.
fn unzip_bars(result: ChartResult) -> Vec<ProviderBar> {
    let columns = result.indicators.quote.into_iter().next().unwrap_or_default();
    let column = |values: &[Option<f64>], index: usize| values.get(index).copied().flatten();

    result
        .timestamp
        .iter()
        .enumerate()
        .map(|(index, &timestamp)| ProviderBar {
            timestamp,
            open: column(&columns.open, index),
            high: column(&columns.high, index),
            low: column(&columns.low, index),
            close: column(&columns.close, index),
            volume: column(&columns.volume, index),
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct QuoteEnvelope {
    #[serde(rename = "quoteResponse")]
    quote_response: QuoteResponseData,
}

#[derive(Debug, Deserialize)]
struct QuoteResponseData {
    #[serde(default)]
    result: Vec<ProviderQuote>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    quotes: Vec<ProviderSearchMatch>,
    #[serde(default)]
    news: Vec<ProviderNewsItem>,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartColumns>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}
