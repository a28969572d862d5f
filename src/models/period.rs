//! Repeating budget periods
//!
//! A budget repeats daily, weekly (ISO weeks, Monday first), monthly, or
//! yearly. The active date range is derived from the period and a reference
//! instant; nothing about the range is stored.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::date::DateRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatingPeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RepeatingPeriod {
    /// Every period from the widest range to the narrowest
    pub const COARSE_TO_FINE: [RepeatingPeriod; 4] =
        [Self::Yearly, Self::Monthly, Self::Weekly, Self::Daily];

    /// The range of this period that contains `reference`
    pub fn range_containing(&self, reference: NaiveDateTime) -> DateRange {
        let (first, last) = self.bounds(reference.date());
        DateRange::from_dates(first, last)
    }

    /// The range immediately before `range`
    pub fn previous_range(&self, range: &DateRange) -> DateRange {
        let first = match range.from.date() {
            Some(date) => date,
            None => return *range,
        };
        let (first, last) = self.bounds(first - Duration::days(1));
        DateRange::from_dates(first, last)
    }

    /// The last `count` ranges ending with the one containing `reference`, oldest first
    pub fn ranges_ending_at(&self, reference: NaiveDateTime, count: usize) -> Vec<DateRange> {
        let mut ranges = Vec::with_capacity(count);
        if count == 0 {
            return ranges;
        }
        let mut range = self.range_containing(reference);
        ranges.push(range);
        while ranges.len() < count {
            range = self.previous_range(&range);
            ranges.push(range);
        }
        ranges.reverse();
        ranges
    }

    fn bounds(&self, date: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Self::Daily => (date, date),
            Self::Weekly => {
                let offset = i64::from(date.weekday().num_days_from_monday());
                let monday = date - Duration::days(offset);
                (monday, monday + Duration::days(6))
            }
            Self::Monthly => {
                let first = date.with_day(1).unwrap_or(date);
                let next_month = if first.month() == 12 {
                    NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
                };
                let last = next_month
                    .map(|next| next - Duration::days(1))
                    .unwrap_or(first);
                (first, last)
            }
            Self::Yearly => {
                let first = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
                let last = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);
                (first, last)
            }
        }
    }

    /// Parse a period from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "d" => Some(Self::Daily),
            "weekly" | "week" | "w" => Some(Self::Weekly),
            "monthly" | "month" | "m" => Some(Self::Monthly),
            "yearly" | "year" | "y" => Some(Self::Yearly),
            _ => None,
        }
    }
}

impl fmt::Display for RepeatingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "Daily"),
            Self::Weekly => write!(f, "Weekly"),
            Self::Monthly => write!(f, "Monthly"),
            Self::Yearly => write!(f, "Yearly"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DateStamp;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_range() {
        let range = RepeatingPeriod::Daily.range_containing(at(2025, 3, 14));
        assert_eq!(range, DateRange::from_dates(day(2025, 3, 14), day(2025, 3, 14)));
    }

    #[test]
    fn test_weekly_range_starts_monday() {
        // 2025-01-01 is a Wednesday
        let range = RepeatingPeriod::Weekly.range_containing(at(2025, 1, 1));
        assert_eq!(range, DateRange::from_dates(day(2024, 12, 30), day(2025, 1, 5)));
    }

    #[test]
    fn test_monthly_range_handles_december_and_leap_years() {
        let dec = RepeatingPeriod::Monthly.range_containing(at(2024, 12, 10));
        assert_eq!(dec, DateRange::from_dates(day(2024, 12, 1), day(2024, 12, 31)));

        let feb = RepeatingPeriod::Monthly.range_containing(at(2024, 2, 10));
        assert_eq!(feb.to, DateStamp::end_of_day(day(2024, 2, 29)));
    }

    #[test]
    fn test_yearly_range() {
        let range = RepeatingPeriod::Yearly.range_containing(at(2025, 6, 1));
        assert_eq!(range, DateRange::from_dates(day(2025, 1, 1), day(2025, 12, 31)));
    }

    #[test]
    fn test_previous_range() {
        let march = RepeatingPeriod::Monthly.range_containing(at(2025, 3, 14));
        let feb = RepeatingPeriod::Monthly.previous_range(&march);
        assert_eq!(feb, DateRange::from_dates(day(2025, 2, 1), day(2025, 2, 28)));
    }

    #[test]
    fn test_ranges_ending_at_oldest_first() {
        let ranges = RepeatingPeriod::Monthly.ranges_ending_at(at(2025, 2, 10), 3);
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0], DateRange::from_dates(day(2024, 12, 1), day(2024, 12, 31)));
        assert_eq!(ranges[2], DateRange::from_dates(day(2025, 2, 1), day(2025, 2, 28)));
        assert!(RepeatingPeriod::Daily.ranges_ending_at(at(2025, 2, 10), 0).is_empty());
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(RepeatingPeriod::parse("Monthly"), Some(RepeatingPeriod::Monthly));
        assert_eq!(RepeatingPeriod::parse("w"), Some(RepeatingPeriod::Weekly));
        assert_eq!(RepeatingPeriod::parse("hourly"), None);
        assert_eq!(RepeatingPeriod::Yearly.to_string(), "Yearly");
    }
}
