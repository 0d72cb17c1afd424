use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Duration;

use crate::ValidationError;

/// Sampling period of a time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    #[serde(rename = "5min")]
    FiveMinutes,
    #[serde(rename = "60min")]
    SixtyMinutes,
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "monthly")]
    Monthly,
}

impl Granularity {
    pub const ALL: [Self; 5] = [
        Self::FiveMinutes,
        Self::SixtyMinutes,
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FiveMinutes => "5min",
            Self::SixtyMinutes => "60min",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Name of the canonical container holding this granularity's candles.
    pub const fn container_key(self) -> &'static str {
        match self {
            Self::FiveMinutes => "Time Series (5min)",
            Self::SixtyMinutes => "Time Series (60min)",
            Self::Daily => "Time Series (Daily)",
            Self::Weekly => "Weekly Time Series",
            Self::Monthly => "Monthly Time Series",
        }
    }

    pub const fn is_intraday(self) -> bool {
        matches!(self, Self::FiveMinutes | Self::SixtyMinutes)
    }

    /// Bucket width for intraday granularities.
    pub fn intraday_step(self) -> Option<Duration> {
        match self {
            Self::FiveMinutes => Some(Duration::minutes(5)),
            Self::SixtyMinutes => Some(Duration::minutes(60)),
            Self::Daily | Self::Weekly | Self::Monthly => None,
        }
    }

    pub(crate) const fn description(self) -> &'static str {
        match self {
            Self::FiveMinutes => "Intraday (5min) open, high, low, close prices and volume",
            Self::SixtyMinutes => "Intraday (60min) open, high, low, close prices and volume",
            Self::Daily => "Daily Prices (open, high, low, close) and Volumes",
            Self::Weekly => "Weekly Prices (open, high, low, close) and Volumes",
            Self::Monthly => "Monthly Prices (open, high, low, close) and Volumes",
        }
    }

    /// Parses the `interval` query parameter of the intraday endpoint.
    pub fn parse_intraday(value: &str) -> Result<Self, ValidationError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "5min" => Ok(Self::FiveMinutes),
            "60min" => Ok(Self::SixtyMinutes),
            other => Err(ValidationError::InvalidInterval {
                value: other.to_owned(),
            }),
        }
    }
}

impl Display for Granularity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Self::parse_intraday(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_keys_are_distinct_per_granularity() {
        let keys = Granularity::ALL.map(Granularity::container_key);
        for (index, key) in keys.iter().enumerate() {
            assert!(!keys[index + 1..].contains(key), "duplicate key {key}");
        }
        assert_eq!(Granularity::Daily.container_key(), "Time Series (Daily)");
        assert_eq!(Granularity::Weekly.container_key(), "Weekly Time Series");
    }

    #[test]
    fn parses_intraday_interval() {
        assert_eq!(
            Granularity::parse_intraday("60MIN").expect("must parse"),
            Granularity::SixtyMinutes
        );
        let err = Granularity::parse_intraday("15min").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidInterval { .. }));
    }

    #[test]
    fn round_trips_through_display() {
        for granularity in Granularity::ALL {
            let parsed = Granularity::from_str(&granularity.to_string()).expect("must parse");
            assert_eq!(parsed, granularity);
        }
    }
}
