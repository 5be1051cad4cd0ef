//! Time-bucketed activity series.
//!
//! The aggregators reduce raw paginated items to one bucket per calendar
//! day across the resolved range, zero-filled so charts never see missing
//! days. Bucketing is pure; the fetch orchestration lives on the client.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::range::DateRange;

/// One day of single-count activity (commits).
///
/// `total` is the item count for the whole range, denormalized onto every
/// bucket for the convenience of chart tooltips.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    /// UTC calendar day, `YYYY-MM-DD`.
    pub date: String,
    pub count: u64,
    pub total: u64,
}

/// One day of opened/closed activity (issues, pull requests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DailyFlow {
    /// UTC calendar day, `YYYY-MM-DD`.
    pub date: String,
    pub opened: u64,
    pub closed: u64,
    pub total: u64,
}

fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Buckets items by the UTC calendar day of their timestamp.
///
/// Items whose timestamp accessor yields `None` are skipped and logged
/// rather than corrupting the date keying. The emitted sequence covers
/// every day in the range, ascending, zero-filled; `total` counts every
/// fetched item, including any that fall outside the range.
pub fn bucket_daily_counts<T>(
    items: &[T],
    timestamp: impl Fn(&T) -> Option<DateTime<Utc>>,
    range: &DateRange,
) -> Vec<DailyCount> {
    let mut by_day: HashMap<NaiveDate, u64> = HashMap::new();
    for item in items {
        match timestamp(item) {
            Some(ts) => *by_day.entry(ts.date_naive()).or_insert(0) += 1,
            None => tracing::debug!("skipping item with missing timestamp"),
        }
    }

    let total = items.len() as u64;
    range
        .days()
        .map(|day| DailyCount {
            date: day_key(day),
            count: by_day.get(&day).copied().unwrap_or(0),
            total,
        })
        .collect()
}

/// Buckets two item sets into an opened/closed series.
///
/// `opened` items are keyed by creation date, `closed` items by closure
/// date; either side skips items with a missing timestamp. `total` is the
/// combined size of both fetches.
pub fn bucket_daily_flow<A, B>(
    opened: &[A],
    closed: &[B],
    created_at: impl Fn(&A) -> Option<DateTime<Utc>>,
    closed_at: impl Fn(&B) -> Option<DateTime<Utc>>,
    range: &DateRange,
) -> Vec<DailyFlow> {
    let mut opened_by_day: HashMap<NaiveDate, u64> = HashMap::new();
    for item in opened {
        match created_at(item) {
            Some(ts) => *opened_by_day.entry(ts.date_naive()).or_insert(0) += 1,
            None => tracing::debug!("skipping opened item with missing creation date"),
        }
    }

    let mut closed_by_day: HashMap<NaiveDate, u64> = HashMap::new();
    for item in closed {
        match closed_at(item) {
            Some(ts) => *closed_by_day.entry(ts.date_naive()).or_insert(0) += 1,
            None => tracing::debug!("skipping closed item with missing closure date"),
        }
    }

    let total = (opened.len() + closed.len()) as u64;
    range
        .days()
        .map(|day| DailyFlow {
            date: day_key(day),
            opened: opened_by_day.get(&day).copied().unwrap_or(0),
            closed: closed_by_day.get(&day).copied().unwrap_or(0),
            total,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, Commit, GitCommit, GitSignature, Issue};
    use crate::range::TimeRange;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn commit(date: Option<DateTime<Utc>>, author: Option<&str>) -> Commit {
        Commit {
            sha: "abc123".to_string(),
            html_url: None,
            commit: GitCommit {
                message: "change something".to_string(),
                author: Some(GitSignature {
                    name: Some("Dev".to_string()),
                    date,
                }),
            },
            author: author.map(|login| Account {
                login: login.to_string(),
                avatar_url: format!("https://avatars.example/{login}"),
            }),
        }
    }

    fn issue(created: Option<DateTime<Utc>>, closed: Option<DateTime<Utc>>) -> Issue {
        Issue {
            id: 1,
            number: 1,
            title: "a bug".to_string(),
            state: "open".to_string(),
            html_url: "https://github.com/o/r/issues/1".to_string(),
            created_at: created,
            updated_at: created,
            closed_at: closed,
            labels: vec![],
            user: None,
            pull_request: None,
        }
    }

    #[test]
    fn series_covers_every_day_zero_filled() {
        let range = TimeRange::Day7.resolve(at(2024, 3, 15, 12));
        let commits = vec![commit(Some(at(2024, 3, 10, 9)), Some("alice"))];

        let series = bucket_daily_counts(&commits, |c| c.commit.author.as_ref()?.date, &range);

        assert_eq!(series.len() as i64, range.day_count());
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(series.iter().map(|d| d.count).sum::<u64>(), 1);
        let hit = series.iter().find(|d| d.date == "2024-03-10").unwrap();
        assert_eq!(hit.count, 1);
    }

    #[test]
    fn authorless_commit_still_counts_toward_activity() {
        let range = TimeRange::Day1.resolve(at(2024, 3, 15, 12));
        let commits = vec![commit(Some(at(2024, 3, 15, 8)), None)];

        let series = bucket_daily_counts(&commits, |c| c.commit.author.as_ref()?.date, &range);

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].count, 1);
        assert_eq!(series[0].total, 1);
    }

    #[test]
    fn commit_with_missing_date_is_skipped() {
        let range = TimeRange::Day2.resolve(at(2024, 3, 15, 12));
        let commits = vec![
            commit(Some(at(2024, 3, 15, 8)), Some("alice")),
            commit(None, Some("bob")),
        ];

        let series = bucket_daily_counts(&commits, |c| c.commit.author.as_ref()?.date, &range);

        assert_eq!(series.iter().map(|d| d.count).sum::<u64>(), 1);
        // The skipped item still contributes to the denormalized total.
        assert_eq!(series[0].total, 2);
    }

    #[test]
    fn flow_buckets_opened_and_closed_independently() {
        let now = at(2024, 3, 15, 12);
        let range = TimeRange::Day7.resolve(now);

        let opened = vec![
            issue(Some(at(2024, 3, 12, 9)), None),
            issue(Some(at(2024, 3, 12, 15)), None),
        ];
        let closed = vec![issue(Some(at(2024, 3, 10, 9)), Some(at(2024, 3, 13, 17)))];

        let series = bucket_daily_flow(
            &opened,
            &closed,
            |i| i.created_at,
            |i| i.closed_at,
            &range,
        );

        assert_eq!(series.len() as i64, range.day_count());
        let d12 = series.iter().find(|d| d.date == "2024-03-12").unwrap();
        assert_eq!((d12.opened, d12.closed), (2, 0));
        let d13 = series.iter().find(|d| d.date == "2024-03-13").unwrap();
        assert_eq!((d13.opened, d13.closed), (0, 1));
        assert!(series.iter().all(|d| d.total == 3));
    }

    #[test]
    fn closed_item_without_closure_date_is_skipped() {
        let now = at(2024, 3, 15, 12);
        let range = TimeRange::Day7.resolve(now);
        let closed = vec![issue(Some(at(2024, 3, 10, 9)), None)];

        let series = bucket_daily_flow(
            &[] as &[Issue],
            &closed,
            |i: &Issue| i.created_at,
            |i| i.closed_at,
            &range,
        );

        assert_eq!(series.iter().map(|d| d.closed).sum::<u64>(), 0);
    }

    #[test]
    fn activity_outside_range_is_not_emitted_but_counts_in_total() {
        let now = at(2024, 3, 15, 12);
        let range = TimeRange::Day1.resolve(now);
        let commits = vec![
            commit(Some(at(2024, 3, 15, 8)), Some("alice")),
            commit(Some(at(2024, 1, 1, 8)), Some("alice")),
        ];

        let series = bucket_daily_counts(&commits, |c| c.commit.author.as_ref()?.date, &range);

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].count, 1);
        assert_eq!(series[0].total, 2);
    }
}
