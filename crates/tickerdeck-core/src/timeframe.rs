//! Chart timeframe selection.
//!
//! | Timeframe | Granularity | Window |
//! |-----------|-------------|--------|
//! | `1D` | 5min | calendar day of the most recent entry |
//! | `1W` | 60min | last 7 days |
//! | `1M` | daily | last month |
//! | `3M` | daily | last 3 months |
//! | `1Y` | weekly | last year |
//! | `5Y` | weekly | last 5 years |
//! | `Max` | monthly | everything |

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime};

use crate::domain::{parse_series_key, Candle, SeriesOrigin, SeriesResponse};
use crate::{Granularity, ValidationError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[default]
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "5Y")]
    FiveYears,
    #[serde(rename = "Max")]
    Max,
}

impl Timeframe {
    pub const ALL: [Self; 7] = [
        Self::OneDay,
        Self::OneWeek,
        Self::OneMonth,
        Self::ThreeMonths,
        Self::OneYear,
        Self::FiveYears,
        Self::Max,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneDay => "1D",
            Self::OneWeek => "1W",
            Self::OneMonth => "1M",
            Self::ThreeMonths => "3M",
            Self::OneYear => "1Y",
            Self::FiveYears => "5Y",
            Self::Max => "Max",
        }
    }

    /// Lenient parse used by the chart endpoint: missing or unknown input is `1D`.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    pub const fn resolution(self) -> Resolution {
        resolve_granularity(self)
    }
}

impl Display for Timeframe {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|timeframe| timeframe.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::InvalidTimeframe {
                value: trimmed.to_owned(),
            })
    }
}

/// Window applied to a series before charting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookback {
    /// Entries on the same calendar day as the most recent entry.
    SameDay,
    Days(i64),
    Months(u32),
    Years(u32),
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub granularity: Granularity,
    pub lookback: Lookback,
}

pub const fn resolve_granularity(timeframe: Timeframe) -> Resolution {
    let (granularity, lookback) = match timeframe {
        Timeframe::OneDay => (Granularity::FiveMinutes, Lookback::SameDay),
        Timeframe::OneWeek => (Granularity::SixtyMinutes, Lookback::Days(7)),
        Timeframe::OneMonth => (Granularity::Daily, Lookback::Months(1)),
        Timeframe::ThreeMonths => (Granularity::Daily, Lookback::Months(3)),
        Timeframe::OneYear => (Granularity::Weekly, Lookback::Years(1)),
        Timeframe::FiveYears => (Granularity::Weekly, Lookback::Years(5)),
        Timeframe::Max => (Granularity::Monthly, Lookback::All),
    };
    Resolution {
        granularity,
        lookback,
    }
}

/// One chart sample with plain JSON numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    #[serde(skip)]
    pub at: PrimitiveDateTime,
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl ChartPoint {
    fn new(at: PrimitiveDateTime, candle: &Candle) -> Self {
        Self {
            at,
            timestamp: at.assume_utc().unix_timestamp(),
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            volume: candle.volume,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartResponse {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub granularity: Granularity,
    pub origin: SeriesOrigin,
    pub points: Vec<ChartPoint>,
}

/// Filters `series` to `lookback` relative to `now`, sorted ascending.
/// Keys that don't parse as series timestamps are skipped.
pub fn apply_window(
    series: &SeriesResponse,
    lookback: Lookback,
    now: OffsetDateTime,
) -> Vec<ChartPoint> {
    let mut points = series
        .entries
        .iter()
        .filter_map(|(key, candle)| {
            parse_series_key(key)
                .ok()
                .map(|at| ChartPoint::new(at, candle))
        })
        .collect::<Vec<_>>();
    points.sort_by_key(|point| point.at);

    let today = now.date();
    let cutoff = match lookback {
        Lookback::All => return points,
        Lookback::SameDay => {
            let Some(latest) = points.last().map(|point| point.at.date()) else {
                return points;
            };
            points.retain(|point| point.at.date() == latest);
            return points;
        }
        Lookback::Days(days) => {
            let now = PrimitiveDateTime::new(today, now.time());
            now - Duration::days(days)
        }
        Lookback::Months(months) => months_before(today, i64::from(months))
            .unwrap_or(Date::MIN)
            .midnight(),
        Lookback::Years(years) => months_before(today, i64::from(years) * 12)
            .unwrap_or(Date::MIN)
            .midnight(),
    };

    points.retain(|point| point.at >= cutoff);
    points
}

/// Same day-of-month `months` months earlier, clamped to the target month's length.
pub(crate) fn months_before(date: Date, months: i64) -> Option<Date> {
    let index = i64::from(date.year()) * 12 + i64::from(u8::from(date.month())) - 1 - months;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = Month::try_from(u8::try_from(index.rem_euclid(12) + 1).ok()?).ok()?;
    let day = date.day().min(time::util::days_in_year_month(year, month));
    Date::from_calendar_date(year, month, day).ok()
}
