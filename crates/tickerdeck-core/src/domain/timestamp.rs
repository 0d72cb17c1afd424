use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

use crate::ValidationError;

const INTRADAY_KEY: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const DATE_KEY: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const NEWS_STAMP: &[FormatItem<'static>] =
    format_description!("[year][month][day]T[hour][minute][second]");

/// UTC instant serialized as RFC3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    pub fn from_unix(seconds: i64) -> Option<Self> {
        OffsetDateTime::from_unix_timestamp(seconds).ok().map(Self)
    }

    pub fn from_offset_datetime(value: OffsetDateTime) -> Self {
        Self(value.to_offset(time::UtcOffset::UTC))
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    pub fn format_rfc3339(self) -> String {
        self.0
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.0.unix_timestamp().to_string())
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_rfc3339())
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_rfc3339())
    }
}

/// Formats an intraday series key (`YYYY-MM-DD HH:MM:SS`, UTC).
pub fn format_intraday_key(value: OffsetDateTime) -> String {
    let utc = value.to_offset(time::UtcOffset::UTC);
    utc.format(INTRADAY_KEY)
        .unwrap_or_else(|_| utc.unix_timestamp().to_string())
}

/// Formats a daily/weekly/monthly series key (`YYYY-MM-DD`).
pub fn format_date_key(value: Date) -> String {
    value
        .format(DATE_KEY)
        .unwrap_or_else(|_| value.to_julian_day().to_string())
}

/// Formats a news publish stamp (`YYYYMMDDTHHMMSS`, UTC).
pub fn format_news_stamp(value: OffsetDateTime) -> String {
    let utc = value.to_offset(time::UtcOffset::UTC);
    utc.format(NEWS_STAMP)
        .unwrap_or_else(|_| utc.unix_timestamp().to_string())
}

/// Parses either series key form back into a primitive date-time.
/// Date-only keys resolve to midnight.
pub fn parse_series_key(value: &str) -> Result<PrimitiveDateTime, ValidationError> {
    let trimmed = value.trim();
    if let Ok(parsed) = PrimitiveDateTime::parse(trimmed, INTRADAY_KEY) {
        return Ok(parsed);
    }

    Date::parse(trimmed, DATE_KEY)
        .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT))
        .map_err(|_| ValidationError::InvalidSeriesTimestamp {
            value: value.to_owned(),
        })
}
