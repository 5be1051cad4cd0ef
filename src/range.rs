//! Named time-range profiles and date-range resolution.
//!
//! Each dashboard time range carries a fetch budget: how many items it is
//! worth pulling from the paginated listing endpoints and how many page
//! requests may be spent doing so. Wider ranges get larger budgets.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use std::str::FromStr;

use crate::error::Error;

/// Fetch budget for a named time range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeProfile {
    /// Upper bound on items returned by a batched fetch.
    pub max_items: usize,
    /// Upper bound on page requests spent by a batched fetch.
    pub max_requests: usize,
}

/// A named dashboard time range, keyed by its day count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeRange {
    /// Today.
    Day1,
    /// Yesterday through today.
    Day2,
    /// This week.
    Day7,
    /// Last two weeks.
    Day14,
    /// Last three weeks.
    Day21,
    /// This month.
    Day30,
    /// Last two months.
    Day60,
    /// Last quarter.
    Day90,
}

impl TimeRange {
    pub const ALL: [TimeRange; 8] = [
        TimeRange::Day1,
        TimeRange::Day2,
        TimeRange::Day7,
        TimeRange::Day14,
        TimeRange::Day21,
        TimeRange::Day30,
        TimeRange::Day60,
        TimeRange::Day90,
    ];

    /// Number of days the range spans.
    pub fn days(self) -> i64 {
        match self {
            TimeRange::Day1 => 1,
            TimeRange::Day2 => 2,
            TimeRange::Day7 => 7,
            TimeRange::Day14 => 14,
            TimeRange::Day21 => 21,
            TimeRange::Day30 => 30,
            TimeRange::Day60 => 60,
            TimeRange::Day90 => 90,
        }
    }

    /// The fetch budget for this range. Budgets scale with the window so a
    /// quarter view spends more quota than a single day.
    pub fn profile(self) -> RangeProfile {
        let (max_items, max_requests) = match self {
            TimeRange::Day1 | TimeRange::Day2 => (300, 3),
            TimeRange::Day7 => (500, 5),
            TimeRange::Day14 => (700, 7),
            TimeRange::Day21 => (1000, 10),
            TimeRange::Day30 => (1500, 15),
            TimeRange::Day60 => (2000, 20),
            TimeRange::Day90 => (2500, 25),
        };
        RangeProfile {
            max_items,
            max_requests,
        }
    }

    /// Human label matching the dashboard's range selector.
    pub fn label(self) -> &'static str {
        match self {
            TimeRange::Day1 => "Today",
            TimeRange::Day2 => "Yesterday",
            TimeRange::Day7 => "This Week",
            TimeRange::Day14 => "Last 2 Weeks",
            TimeRange::Day21 => "Last 3 Weeks",
            TimeRange::Day30 => "This Month",
            TimeRange::Day60 => "Last 2 Months",
            TimeRange::Day90 => "Last Quarter",
        }
    }

    /// Resolves the range to concrete UTC timestamps relative to `now`.
    ///
    /// The end is always `now` at end of day. "Today" starts at the
    /// beginning of today, "Yesterday" at the beginning of yesterday, and
    /// every other range N days before `now`, at start of day.
    pub fn resolve(self, now: DateTime<Utc>) -> DateRange {
        let end = end_of_day(now.date_naive());
        let start_day = match self {
            TimeRange::Day1 => now.date_naive(),
            TimeRange::Day2 => now.date_naive() - Duration::days(1),
            other => (now - Duration::days(other.days())).date_naive(),
        };
        DateRange {
            start: start_of_day(start_day),
            end,
        }
    }

    /// Start timestamp actually used for `since` query parameters: the
    /// resolved start clamped to at most N days before the end, so the
    /// fetch window never exceeds the day count the profile was sized for.
    pub fn clamped_fetch_start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let range = self.resolve(now);
        range.start.max(range.end - Duration::days(self.days()))
    }
}

impl FromStr for TimeRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(TimeRange::Day1),
            "2" => Ok(TimeRange::Day2),
            "7" => Ok(TimeRange::Day7),
            "14" => Ok(TimeRange::Day14),
            "21" => Ok(TimeRange::Day21),
            "30" => Ok(TimeRange::Day30),
            "60" => Ok(TimeRange::Day60),
            "90" => Ok(TimeRange::Day90),
            other => Err(Error::UnknownTimeRange(other.to_string())),
        }
    }
}

/// Concrete UTC bounds for a resolved time range, both inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Iterates every calendar day in `[start, end]`, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start.date_naive();
        let end = self.end.date_naive();
        start
            .iter_days()
            .take_while(move |d| *d <= end)
    }

    /// Inclusive day count between start and end.
    pub fn day_count(&self) -> i64 {
        (self.end.date_naive() - self.start.date_naive()).num_days() + 1
    }
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).unwrap_or_default())
}

fn end_of_day(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_hms_milli_opt(23, 59, 59, 999).unwrap_or_default())
}
