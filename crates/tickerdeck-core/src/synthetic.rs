//! Plausible placeholder series derived from a single quote.
//!
//! Used when the provider has no history for a symbol. Intraday series follow
//! a smooth sine around the last price; daily, weekly and monthly series walk
//! backwards with a linear drift plus bounded uniform noise. Every candle is
//! built through [`Candle::enclosing`], so `low <= open, close <= high` holds
//! whatever the noise draws.

use time::{Date, Duration, OffsetDateTime, Weekday};

use crate::domain::{Candle, SeriesOrigin, SeriesResponse};
use crate::normalize::series_key;
use crate::timeframe::months_before;
use crate::{Granularity, Symbol};

/// Buckets in a synthetic intraday series.
pub const INTRADAY_POINTS: usize = 96;
/// Calendar days covered by a synthetic daily series (weekends are skipped).
pub const DAILY_CALENDAR_DAYS: i64 = 30;
pub const WEEKLY_POINTS: i64 = 52;
pub const MONTHLY_POINTS: i64 = 60;

/// Quote fields the generator anchors on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteSnapshot {
    pub price: f64,
    pub previous_close: f64,
    pub day_high: f64,
    pub day_low: f64,
    pub volume: u64,
}

/// Drift/noise coefficients for one end-of-day granularity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkProfile {
    /// Fractional price decline per bucket going back in time.
    pub drift: f64,
    /// Half-width of the uniform close noise.
    pub noise: f64,
    /// Fixed high/low offset around the bucket price.
    pub band: f64,
    pub base_volume: f64,
    /// Half-width of the uniform volume spread.
    pub volume_spread: f64,
}

impl WalkProfile {
    pub const DAILY: Self = Self {
        drift: 0.002,
        noise: 0.01,
        band: 0.01,
        base_volume: 1_000_000.0,
        volume_spread: 0.3,
    };
    pub const WEEKLY: Self = Self {
        drift: 0.001,
        noise: 0.015,
        band: 0.02,
        base_volume: 5_000_000.0,
        volume_spread: 0.4,
    };
    pub const MONTHLY: Self = Self {
        drift: 0.004,
        noise: 0.025,
        band: 0.04,
        base_volume: 20_000_000.0,
        volume_spread: 0.5,
    };
}

/// Fabricates candle series. Owns its RNG so tests can pin the sequence.
#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    rng: fastrand::Rng,
}

impl SyntheticGenerator {
    /// Entropy-seeded; output differs between calls.
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Builds a non-empty series for `granularity` ending at `now`.
    pub fn generate(
        &mut self,
        symbol: &Symbol,
        granularity: Granularity,
        snapshot: QuoteSnapshot,
        now: OffsetDateTime,
    ) -> SeriesResponse {
        let candles = match granularity {
            Granularity::FiveMinutes | Granularity::SixtyMinutes => {
                intraday(granularity, snapshot, now)
            }
            Granularity::Daily => self.daily(snapshot, now.date()),
            Granularity::Weekly => self.walk(
                snapshot,
                WalkProfile::WEEKLY,
                (0..WEEKLY_POINTS).map(|weeks| (weeks, now.date() - Duration::weeks(weeks))),
            ),
            Granularity::Monthly => self.walk(
                snapshot,
                WalkProfile::MONTHLY,
                (0..MONTHLY_POINTS).filter_map(|months| {
                    months_before(now.date(), months)
                        .and_then(|date| date.replace_day(1).ok())
                        .map(|date| (months, date))
                }),
            ),
        };

        let mut series = SeriesResponse::empty(
            symbol.as_str(),
            granularity,
            format!("{} (synthetic, derived from latest quote)", granularity.description()),
        );
        series.origin = SeriesOrigin::Synthetic;
        for (ts, candle) in candles {
            series.entries.insert(series_key(granularity, ts), candle);
        }
        series.last_refreshed = series.entries.keys().next_back().cloned().unwrap_or_default();
        series
    }

    fn daily(&mut self, snapshot: QuoteSnapshot, today: Date) -> Vec<(OffsetDateTime, Candle)> {
        let dates = (0..DAILY_CALENDAR_DAYS)
            .map(|days_ago| (days_ago, today - Duration::days(days_ago)))
            .filter(|(_, date)| !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday));
        self.walk(snapshot, WalkProfile::DAILY, dates)
    }

    /// Walks backwards over `(steps_back, date)` pairs; each date drifts
    /// `steps_back * drift` below the anchor price. `steps_back` counts
    /// calendar buckets, so skipped dates still advance the drift.
    fn walk(
        &mut self,
        snapshot: QuoteSnapshot,
        profile: WalkProfile,
        dates: impl Iterator<Item = (i64, Date)>,
    ) -> Vec<(OffsetDateTime, Candle)> {
        let anchor = snapshot.price;
        dates
            .map(|(steps_back, date)| {
                let drifted = anchor * (1.0 - profile.drift * steps_back as f64);
                let price = drifted * (1.0 + self.uniform(-profile.noise, profile.noise));
                let half_noise = profile.noise / 2.0;
                let open = price * (1.0 + self.uniform(-half_noise, half_noise));
                let high = price * (1.0 + profile.band);
                let low = price * (1.0 - profile.band);
                let volume = profile.base_volume
                    * (1.0 + self.uniform(-profile.volume_spread, profile.volume_spread));

                let candle = Candle::enclosing(open, high, low, price, volume.round() as u64);
                (date.midnight().assume_utc(), candle)
            })
            .collect()
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.rng.f64()
    }
}

impl Default for SyntheticGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Sine wave around the last price, one bucket per interval step walking back
/// from `now` aligned down to the interval. No randomness.
fn intraday(
    granularity: Granularity,
    snapshot: QuoteSnapshot,
    now: OffsetDateTime,
) -> Vec<(OffsetDateTime, Candle)> {
    let step = granularity.intraday_step().unwrap_or(Duration::minutes(5));
    let step_seconds = step.whole_seconds().max(1);
    let aligned = now - Duration::seconds(now.unix_timestamp().rem_euclid(step_seconds));
    let aligned = aligned.replace_nanosecond(0).unwrap_or(aligned);
    let price = snapshot.price;
    let volume = snapshot.volume / INTRADAY_POINTS as u64;

    (0..INTRADAY_POINTS)
        .map(|index| {
            let ts = aligned - step * index as i32;
            let point = price + (index as f64 / 10.0).sin() * 0.01 * price;
            let candle = Candle::enclosing(point - 0.1, point + 0.2, point - 0.2, point, volume);
            (ts, candle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn snapshot(price: f64) -> QuoteSnapshot {
        QuoteSnapshot {
            price,
            previous_close: price - 2.0,
            day_high: price + 1.0,
            day_low: price - 1.0,
            volume: 9_600_000,
        }
    }

    fn symbol() -> Symbol {
        Symbol::parse("AAPL").expect("symbol")
    }

    #[test]
    fn intraday_has_96_aligned_buckets() {
        let mut generator = SyntheticGenerator::seeded(7);
        let now = datetime!(2024-03-06 14:37:12 UTC);
        let series = generator.generate(&symbol(), Granularity::FiveMinutes, snapshot(150.0), now);

        assert_eq!(series.len(), INTRADAY_POINTS);
        assert_eq!(series.last_refreshed, "2024-03-06 14:35:00");
        let latest = series.entries["2024-03-06 14:35:00"];
        assert_eq!(latest.close, 150.0);
        assert_eq!(latest.volume, 100_000);
    }

    #[test]
    fn sixty_minute_series_steps_by_the_hour() {
        let mut generator = SyntheticGenerator::seeded(7);
        let now = datetime!(2024-03-06 14:37:12 UTC);
        let series = generator.generate(&symbol(), Granularity::SixtyMinutes, snapshot(150.0), now);

        assert_eq!(series.len(), INTRADAY_POINTS);
        assert!(series.entries.contains_key("2024-03-06 13:00:00"));
        assert!(series.entries.contains_key("2024-03-02 15:00:00"));
    }

    #[test]
    fn every_synthetic_candle_is_well_ordered() {
        let mut generator = SyntheticGenerator::seeded(42);
        let now = datetime!(2024-03-06 14:37:12 UTC);
        for granularity in Granularity::ALL {
            let series = generator.generate(&symbol(), granularity, snapshot(0.5), now);
            assert!(!series.is_empty());
            for candle in series.entries.values() {
                assert!(candle.is_well_ordered(), "{granularity}: {candle:?}");
            }
        }
    }

    #[test]
    fn daily_skips_weekends() {
        let mut generator = SyntheticGenerator::seeded(1);
        let now = datetime!(2024-03-06 20:00:00 UTC);
        let series = generator.generate(&symbol(), Granularity::Daily, snapshot(150.0), now);

        assert_eq!(series.len(), 22);
        assert!(!series.entries.contains_key("2024-03-03"));
        assert!(!series.entries.contains_key("2024-03-02"));
        let latest = series.entries["2024-03-06"];
        assert!((latest.close - 150.0).abs() <= 1.5);
    }

    #[test]
    fn daily_drift_counts_calendar_days() {
        let now = datetime!(2024-03-06 20:00:00 UTC);
        for seed in 0..20 {
            let mut generator = SyntheticGenerator::seeded(seed);
            let series = generator.generate(&symbol(), Granularity::Daily, snapshot(150.0), now);

            // 2024-02-06 is 29 calendar days back but only 21 weekdays back.
            let expected = 150.0 * (1.0 - 0.002 * 29.0);
            let close = series.entries["2024-02-06"].close;
            assert!(
                (close - expected).abs() <= expected * 0.01 + 1e-9,
                "seed {seed}: close {close} not near {expected}"
            );
        }
    }

    #[test]
    fn high_low_band_is_fixed_per_granularity() {
        let now = datetime!(2024-03-06 20:00:00 UTC);
        let cases = [
            (Granularity::Daily, WalkProfile::DAILY),
            (Granularity::Weekly, WalkProfile::WEEKLY),
            (Granularity::Monthly, WalkProfile::MONTHLY),
        ];
        let mut generator = SyntheticGenerator::seeded(5);
        for (granularity, profile) in cases {
            let series = generator.generate(&symbol(), granularity, snapshot(150.0), now);
            for candle in series.entries.values() {
                let high = candle.close * (1.0 + profile.band);
                let low = candle.close * (1.0 - profile.band);
                assert!((candle.high - high).abs() < 1e-9, "{granularity}: {candle:?}");
                assert!((candle.low - low).abs() < 1e-9, "{granularity}: {candle:?}");
            }
        }
    }

    #[test]
    fn weekly_and_monthly_lengths() {
        let mut generator = SyntheticGenerator::seeded(3);
        let now = datetime!(2024-03-06 20:00:00 UTC);
        let weekly = generator.generate(&symbol(), Granularity::Weekly, snapshot(150.0), now);
        let monthly = generator.generate(&symbol(), Granularity::Monthly, snapshot(150.0), now);

        assert_eq!(weekly.len(), 52);
        assert_eq!(monthly.len(), 60);
        assert!(monthly.entries.contains_key("2024-03-01"));
        assert!(monthly.entries.contains_key("2019-04-01"));
    }

    #[test]
    fn same_seed_same_series() {
        let now = datetime!(2024-03-06 20:00:00 UTC);
        let first = SyntheticGenerator::seeded(9).generate(&symbol(), Granularity::Daily, snapshot(150.0), now);
        let second = SyntheticGenerator::seeded(9).generate(&symbol(), Granularity::Daily, snapshot(150.0), now);
        assert_eq!(first, second);
    }
}
