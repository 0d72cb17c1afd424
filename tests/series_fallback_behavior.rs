//! Behaviour tests for the fallback policy.
//!
//! Series requests degrade from real bars to a synthetic series to an empty
//! shell; news degrades to a placeholder item; search short-circuits short
//! queries.

mod support;

use tickerdeck_core::{
    Granularity, ProviderBar, ProviderError, ProviderSearchMatch, SeriesOrigin, ServiceConfig,
    Timeframe,
};
use time::macros::datetime;
use time::{Date, Duration, Weekday};

use support::{news_item, raw_quote, service, service_with, symbol, StubProvider, NOW};

// =============================================================================
// Series: tier selection
// =============================================================================

#[tokio::test]
async fn when_daily_history_transport_fails_an_empty_daily_shell_is_served() {
    // Given: A provider whose history call fails at the transport level
    let provider = StubProvider::new()
        .with_bars(Err(ProviderError::upstream("connection reset")))
        .with_quote("AAPL", Ok(raw_quote("AAPL", 150.0, 148.0)));
    let calls = provider.call_counts();
    let service = service(provider);

    // When: The daily series is requested
    let series = service.series(&symbol("AAPL"), Granularity::Daily).await;

    // Then: The shell keeps the daily container and no quote is fetched
    assert_eq!(series.origin, SeriesOrigin::Empty);
    assert!(series.is_empty());
    let body = serde_json::to_value(&series).expect("json");
    assert!(body["Time Series (Daily)"].as_object().expect("container").is_empty());
    assert_eq!(body["Meta Data"]["2. Symbol"], "AAPL");
    assert_eq!(calls.historical(), 1);
    assert_eq!(calls.quote(), 0);
}

#[tokio::test]
async fn when_provider_has_no_daily_bars_a_synthetic_series_follows_the_quote() {
    // Given: No history, but a live AAPL quote at 150
    let provider = StubProvider::new()
        .with_bars(Ok(Vec::new()))
        .with_quote("AAPL", Ok(raw_quote("AAPL", 150.0, 148.0)));
    let service = service(provider);

    // When: The daily series is requested
    let series = service.series(&symbol("AAPL"), Granularity::Daily).await;

    // Then: It covers the last 30 calendar days on weekdays only
    assert_eq!(series.origin, SeriesOrigin::Synthetic);
    assert_eq!(series.len(), 22);
    for key in series.entries.keys() {
        let date = Date::parse(key, time::macros::format_description!("[year]-[month]-[day]"))
            .expect("date key");
        assert!(
            !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday),
            "{key} falls on a weekend"
        );
        assert!(date > NOW.date() - Duration::days(30));
    }

    // And: The most recent close sits within 1% of the quote
    let (latest_key, latest) = series.entries.iter().next_back().expect("latest");
    assert_eq!(latest_key, "2024-03-06");
    assert!(
        (latest.close - 150.0).abs() / 150.0 <= 0.01 + f64::EPSILON,
        "latest close {} drifted too far",
        latest.close
    );
    for candle in series.entries.values() {
        assert!(candle.is_well_ordered());
    }
}

#[tokio::test]
async fn when_provider_has_bars_they_are_served_without_a_quote_call() {
    // Given: Real bars from the provider
    let bars = vec![ProviderBar {
        timestamp: datetime!(2024-03-06 14:30 UTC).unix_timestamp(),
        open: Some(170.0),
        high: Some(172.0),
        low: Some(169.0),
        close: Some(171.0),
        volume: Some(1_000.0),
    }];
    let provider = StubProvider::new().with_bars(Ok(bars));
    let calls = provider.call_counts();
    let service = service(provider);

    // When: The daily series is requested
    let series = service.series(&symbol("AAPL"), Granularity::Daily).await;

    // Then: Provider data wins
    assert_eq!(series.origin, SeriesOrigin::Provider);
    assert_eq!(series.len(), 1);
    assert_eq!(series.entries["2024-03-06"].close, 171.0);
    assert_eq!(calls.quote(), 0);
}

#[tokio::test]
async fn when_neither_bars_nor_quote_exist_the_shell_is_empty() {
    // Given: No history and no quote for the symbol
    let service = service(StubProvider::new());

    // When: Every granularity is requested
    for granularity in Granularity::ALL {
        let series = service.series(&symbol("ZZZZ"), granularity).await;

        // Then: Each answer is an empty, correctly keyed shell
        assert_eq!(series.origin, SeriesOrigin::Empty, "{granularity}");
        assert!(series.is_empty(), "{granularity}");
        assert_eq!(series.container_key(), granularity.container_key());
        assert!(series.information.contains("no data available"));
    }
}

#[tokio::test]
async fn when_quote_has_no_price_no_series_is_fabricated() {
    // Given: No history and a quote without a price
    let provider = StubProvider::new().with_quote("DELIST", Ok(raw_quote("DELIST", 0.0, 0.0)));
    let service = service(provider);

    // When: The weekly series is requested
    let series = service.series(&symbol("DELIST"), Granularity::Weekly).await;

    // Then: The empty shell is served
    assert_eq!(series.origin, SeriesOrigin::Empty);
    assert!(series.is_empty());
}

#[tokio::test]
async fn synthetic_lengths_match_each_granularity() {
    // Given: No history and a priced quote
    let provider = StubProvider::new().with_quote("MSFT", Ok(raw_quote("MSFT", 410.0, 405.0)));
    let service = service(provider);

    // When/Then: Each granularity has its fixed synthetic length
    let expected = [
        (Granularity::FiveMinutes, 96),
        (Granularity::SixtyMinutes, 96),
        (Granularity::Daily, 22),
        (Granularity::Weekly, 52),
        (Granularity::Monthly, 60),
    ];
    for (granularity, len) in expected {
        let series = service.series(&symbol("MSFT"), granularity).await;
        assert_eq!(series.origin, SeriesOrigin::Synthetic, "{granularity}");
        assert_eq!(series.len(), len, "{granularity}");
    }
}

// =============================================================================
// Quote
// =============================================================================

#[tokio::test]
async fn unknown_quote_propagates_not_found() {
    // Given: A provider without the symbol
    let service = service(StubProvider::new());

    // When: The quote is requested
    let error = service.quote(&symbol("NOPE")).await.expect_err("not found");

    // Then: NotFound surfaces to the caller
    assert!(error.is_not_found());
    assert_eq!(error.code(), "provider.not_found");
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn short_search_queries_never_reach_the_provider() {
    // Given: A provider that would answer any search
    let provider = StubProvider::new().with_search(Ok(vec![ProviderSearchMatch {
        symbol: String::from("A"),
        ..ProviderSearchMatch::default()
    }]));
    let calls = provider.call_counts();
    let service = service(provider);

    // When: Queries shorter than two characters are issued
    for query in ["", " ", "a", "  b  "] {
        let response = service.search(query).await.expect("search");

        // Then: The answer is empty
        assert!(response.best_matches.is_empty(), "query {query:?}");
    }

    // And: The provider was never called
    assert_eq!(calls.search(), 0);

    // When: A two-character query is issued
    let response = service.search("ab").await.expect("search");

    // Then: It reaches the provider
    assert_eq!(response.best_matches.len(), 1);
    assert_eq!(calls.search(), 1);
}

#[tokio::test]
async fn search_failures_propagate() {
    let provider = StubProvider::new().with_search(Err(ProviderError::rate_limited("429")));
    let service = service(provider);

    let error = service.search("apple").await.expect_err("rate limited");
    assert_eq!(error.code(), "provider.rate_limited");
}

// =============================================================================
// News
// =============================================================================

#[tokio::test]
async fn when_every_news_source_fails_a_placeholder_is_served() {
    // Given: News fails for every configured symbol
    let provider = StubProvider::new();
    let calls = provider.call_counts();
    let service = service(provider);

    // When: The market feed is requested
    let feed = service.news().await;

    // Then: Exactly one placeholder item is returned
    assert_eq!(calls.news(), 5);
    assert_eq!(feed.feed.len(), 1);
    let placeholder = &feed.feed[0];
    assert_eq!(placeholder.time_published, "20240306T210000");
    assert!(!placeholder.title.is_empty());
    assert!(!placeholder.url.is_empty());
}

#[tokio::test]
async fn partial_news_failures_contribute_nothing() {
    // Given: Two symbols with overlapping stories and one failing symbol
    let shared = news_item("shared", "Megacaps lift the index", datetime!(2024-03-06 18:00 UTC));
    let provider = StubProvider::new()
        .with_news(
            "AAPL",
            Ok(vec![
                news_item("a1", "Apple event", datetime!(2024-03-06 16:00 UTC)),
                shared.clone(),
            ]),
        )
        .with_news(
            "MSFT",
            Ok(vec![
                shared,
                news_item("m1", "Cloud growth", datetime!(2024-03-06 19:30 UTC)),
            ]),
        )
        .with_news("GOOGL", Err(ProviderError::upstream("timeout")));
    let config = ServiceConfig {
        news_symbols: vec![symbol("AAPL"), symbol("MSFT"), symbol("GOOGL")],
        ..ServiceConfig::default()
    };
    let service = service_with(provider, config);

    // When: The market feed is requested
    let feed = service.news().await;

    // Then: Stories are de-duplicated by url and sorted newest first
    let titles = feed
        .feed
        .iter()
        .map(|item| item.title.as_str())
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["Cloud growth", "Megacaps lift the index", "Apple event"]);
}

#[tokio::test]
async fn quiet_news_day_is_not_a_failure() {
    // Given: Every source answers with no stories
    let mut provider = StubProvider::new();
    for ticker in tickerdeck_core::DEFAULT_NEWS_SYMBOLS {
        provider = provider.with_news(ticker, Ok(Vec::new()));
    }
    let service = service(provider);

    // When: The market feed is requested
    let feed = service.news().await;

    // Then: The feed is empty rather than a placeholder
    assert!(feed.feed.is_empty());
}

#[tokio::test]
async fn news_feed_is_truncated_to_the_configured_limit() {
    let items = (0..8)
        .map(|index| {
            news_item(
                &format!("n{index}"),
                &format!("Story {index}"),
                NOW - Duration::minutes(index),
            )
        })
        .collect::<Vec<_>>();
    let provider = StubProvider::new().with_news("AAPL", Ok(items));
    let config = ServiceConfig {
        news_symbols: vec![symbol("AAPL")],
        news_limit: 3,
        ..ServiceConfig::default()
    };

    let feed = service_with(provider, config).news().await;

    assert_eq!(feed.feed.len(), 3);
    assert_eq!(feed.feed[0].title, "Story 0");
}

// =============================================================================
// Chart
// =============================================================================

#[tokio::test]
async fn chart_timeframes_route_to_their_granularity() {
    // Given: No history and a priced quote
    let provider = StubProvider::new().with_quote("AAPL", Ok(raw_quote("AAPL", 150.0, 148.0)));
    let service = service(provider);

    // When: The one-year chart is requested
    let chart = service.chart(&symbol("AAPL"), Timeframe::OneYear).await;

    // Then: It is built from weekly candles inside the last year, oldest first
    assert_eq!(chart.granularity, Granularity::Weekly);
    assert_eq!(chart.origin, SeriesOrigin::Synthetic);
    assert_eq!(chart.points.len(), 52);
    assert!(chart
        .points
        .windows(2)
        .all(|pair| pair[0].timestamp < pair[1].timestamp));

    // When: The one-month chart is requested
    let chart = service.chart(&symbol("AAPL"), Timeframe::OneMonth).await;

    // Then: Only daily candles since 2024-02-06 remain
    assert_eq!(chart.granularity, Granularity::Daily);
    let cutoff = datetime!(2024-02-06 00:00 UTC).unix_timestamp();
    assert!(!chart.points.is_empty());
    assert!(chart.points.iter().all(|point| point.timestamp >= cutoff));
}
