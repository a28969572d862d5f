//! Comparable integer timestamps and date ranges
//!
//! Record dates are stored as a single integer of the form `yyyyMMddHHmm`
//! (e.g. `202501151230`), so ordering and range checks are integer
//! comparisons and the stored value stays human-readable.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A minute-precision timestamp encoded as `yyyyMMddHHmm`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct DateStamp(i64);

impl DateStamp {
    /// Wrap an already encoded value
    pub const fn from_raw(value: i64) -> Self {
        Self(value)
    }

    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        let value = i64::from(dt.year()) * 100_000_000
            + i64::from(dt.month()) * 1_000_000
            + i64::from(dt.day()) * 10_000
            + i64::from(dt.hour()) * 100
            + i64::from(dt.minute());
        Self(value)
    }

    /// The first minute of a day
    pub fn start_of_day(date: NaiveDate) -> Self {
        Self::from_datetime(date.and_time(NaiveTime::MIN))
    }

    /// The last minute of a day
    pub fn end_of_day(date: NaiveDate) -> Self {
        Self::start_of_day(date).with_minutes(23 * 60 + 59)
    }

    /// Current local time
    pub fn now() -> Self {
        Self::from_datetime(Local::now().naive_local())
    }

    pub const fn value(&self) -> i64 {
        self.0
    }

    fn with_minutes(self, minutes_of_day: i64) -> Self {
        let day = self.0 / 10_000 * 10_000;
        Self(day + (minutes_of_day / 60) * 100 + minutes_of_day % 60)
    }

    /// Decode back into a datetime, `None` when the encoded value is not a valid date
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        let year = i32::try_from(self.0 / 100_000_000).ok()?;
        let month = u32::try_from(self.0 / 1_000_000 % 100).ok()?;
        let day = u32::try_from(self.0 / 10_000 % 100).ok()?;
        let hour = u32::try_from(self.0 / 100 % 100).ok()?;
        let minute = u32::try_from(self.0 % 100).ok()?;
        NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.to_datetime().map(|dt| dt.date())
    }

    /// Parse "YYYY-MM-DD" (start of day) or "YYYY-MM-DD HH:MM"
    pub fn parse(s: &str) -> Result<Self, DateParseError> {
        let s = s.trim();
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
            return Ok(Self::from_datetime(dt));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self::start_of_day)
            .map_err(|_| DateParseError(s.to_string()))
    }
}

impl From<NaiveDateTime> for DateStamp {
    fn from(dt: NaiveDateTime) -> Self {
        Self::from_datetime(dt)
    }
}

impl fmt::Display for DateStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M")),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Inclusive range of timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct DateRange {
    pub from: DateStamp,
    pub to: DateStamp,
}

impl DateRange {
    pub fn new(from: DateStamp, to: DateStamp) -> Self {
        Self { from, to }
    }

    /// Range covering whole days from `first` to `last`
    pub fn from_dates(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            from: DateStamp::start_of_day(first),
            to: DateStamp::end_of_day(last),
        }
    }

    pub fn contains(&self, date: DateStamp) -> bool {
        date >= self.from && date <= self.to
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.from.date(), self.to.date()) {
            (Some(from), Some(to)) if from == to => write!(f, "{}", from.format("%Y-%m-%d")),
            (Some(from), Some(to)) => write!(
                f,
                "{}..{}",
                from.format("%Y-%m-%d"),
                to.format("%Y-%m-%d")
            ),
            _ => write!(f, "{}..{}", self.from, self.to),
        }
    }
}

/// Error type for date parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParseError(pub String);

impl fmt::Display for DateParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid date (expected YYYY-MM-DD [HH:MM]): {}", self.0)
    }
}

impl std::error::Error for DateParseError {}
