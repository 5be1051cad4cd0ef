//! Caller-initiated JSON export of computed analytics.
//!
//! The export blob is the only artifact this crate ever persists, and only
//! on demand: repository name, range label, summary totals plus the full
//! detailed series, serialized to pretty JSON for download.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::client::AnalyticsData;
use crate::range::TimeRange;
use crate::stats::{LanguageShare, RankedContributor};

const ACTIVITY_COMMIT_WEIGHT: f64 = 0.4;
const ACTIVITY_PR_WEIGHT: f64 = 0.3;
const ACTIVITY_ISSUE_WEIGHT: f64 = 0.3;

#[derive(Clone, Debug, Serialize)]
pub struct IssueSummary {
    pub opened: u64,
    pub closed: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnalyticsSummary {
    pub commits: u64,
    pub issues: IssueSummary,
    pub pull_requests: IssueSummary,
    pub languages: Vec<LanguageShare>,
    pub top_contributors: Vec<RankedContributor>,
    /// Weighted blend of commit pace, PR close rate and issue close rate.
    pub activity_score: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnalyticsExport {
    pub repository: String,
    pub time_range: String,
    pub export_date: DateTime<Utc>,
    pub summary: AnalyticsSummary,
    pub detailed: AnalyticsData,
}

impl AnalyticsExport {
    /// Assembles the export blob from an analytics bundle.
    pub fn build(
        repository_full_name: &str,
        range: TimeRange,
        data: AnalyticsData,
        now: DateTime<Utc>,
    ) -> Self {
        let commits: u64 = data.commits.iter().map(|d| d.count).sum();
        let issues = IssueSummary {
            opened: data.issues.iter().map(|d| d.opened).sum(),
            closed: data.issues.iter().map(|d| d.closed).sum(),
        };
        let pull_requests = IssueSummary {
            opened: data.pull_requests.iter().map(|d| d.opened).sum(),
            closed: data.pull_requests.iter().map(|d| d.closed).sum(),
        };

        let activity_score = activity_score(
            commits,
            issues.closed,
            issues.opened,
            pull_requests.closed,
            pull_requests.opened,
            range.days(),
        );

        let summary = AnalyticsSummary {
            commits,
            issues,
            pull_requests,
            languages: data.languages.clone(),
            top_contributors: data.contributors.iter().take(10).cloned().collect(),
            activity_score,
        };

        Self {
            repository: repository_full_name.to_string(),
            time_range: format!("{} days", range.days()),
            export_date: now,
            summary,
            detailed: data,
        }
    }

    /// The downloadable artifact, pretty-printed.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn activity_score(
    commits: u64,
    issues_closed: u64,
    issues_opened: u64,
    prs_closed: u64,
    prs_opened: u64,
    days: i64,
) -> i64 {
    let commits_per_day = commits as f64 / days.max(1) as f64;
    let pr_close_rate = prs_closed as f64 / (prs_opened.max(1)) as f64 * 100.0;
    let issue_close_rate = issues_closed as f64 / (issues_opened.max(1)) as f64 * 100.0;

    (commits_per_day * 10.0 * ACTIVITY_COMMIT_WEIGHT
        + pr_close_rate * ACTIVITY_PR_WEIGHT
        + issue_close_rate * ACTIVITY_ISSUE_WEIGHT)
        .round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{DailyCount, DailyFlow};
    use crate::health::{score_repository, ActivityRates};
    use crate::models::{Account, ContentEntry, Repository};
    use chrono::TimeZone;

    fn repo() -> Repository {
        Repository {
            id: 9,
            name: "widget".to_string(),
            full_name: "acme/widget".to_string(),
            description: None,
            html_url: "https://github.com/acme/widget".to_string(),
            homepage: None,
            stargazers_count: 1,
            watchers_count: 1,
            forks_count: 0,
            open_issues_count: 0,
            language: None,
            created_at: None,
            updated_at: None,
            pushed_at: None,
            archived: false,
            has_wiki: false,
            has_issues: true,
            has_projects: false,
            default_branch: "main".to_string(),
            is_private: false,
            topics: vec![],
            owner: Account {
                login: "acme".to_string(),
                avatar_url: "https://avatars.example/acme".to_string(),
            },
            license: None,
        }
    }

    fn bundle() -> AnalyticsData {
        let commits = vec![
            DailyCount { date: "2024-03-14".into(), count: 3, total: 7 },
            DailyCount { date: "2024-03-15".into(), count: 4, total: 7 },
        ];
        let issues = vec![DailyFlow { date: "2024-03-15".into(), opened: 4, closed: 2, total: 6 }];
        let pull_requests =
            vec![DailyFlow { date: "2024-03-15".into(), opened: 2, closed: 2, total: 4 }];
        let contributors: Vec<RankedContributor> = (0..12)
            .map(|i| RankedContributor {
                login: format!("user{i:02}"),
                avatar_url: format!("https://avatars.example/user{i:02}"),
                contributions: 20 - i,
            })
            .collect();
        let health = score_repository(
            &repo(),
            &[ContentEntry {
                name: "README.md".to_string(),
                path: "README.md".to_string(),
                entry_type: "file".to_string(),
            }],
            &[],
            ActivityRates::default(),
        );

        AnalyticsData {
            commits,
            issues,
            pull_requests,
            contributors,
            all_time_contributors: vec![],
            languages: vec![LanguageShare { name: "Rust".to_string(), percentage: 100.0 }],
            health,
        }
    }

    #[test]
    fn summary_totals_sum_the_series() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 18, 0, 0).unwrap();
        let export = AnalyticsExport::build("acme/widget", TimeRange::Day7, bundle(), now);

        assert_eq!(export.repository, "acme/widget");
        assert_eq!(export.time_range, "7 days");
        assert_eq!(export.summary.commits, 7);
        assert_eq!(export.summary.issues.opened, 4);
        assert_eq!(export.summary.issues.closed, 2);
        assert_eq!(export.summary.pull_requests.opened, 2);
        assert_eq!(export.summary.pull_requests.closed, 2);
        assert_eq!(export.summary.top_contributors.len(), 10);
    }

    #[test]
    fn activity_score_blends_weighted_rates() {
        // 7 commits over 7 days = 1/day; PRs 2/2 closed; issues 2/4 closed.
        // round(1*10*0.4 + 100*0.3 + 50*0.3) = round(4 + 30 + 15) = 49.
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 18, 0, 0).unwrap();
        let export = AnalyticsExport::build("acme/widget", TimeRange::Day7, bundle(), now);
        assert_eq!(export.summary.activity_score, 49);
    }

    #[test]
    fn export_serializes_to_json() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 18, 0, 0).unwrap();
        let export = AnalyticsExport::build("acme/widget", TimeRange::Day7, bundle(), now);

        let json = export.to_pretty_json().expect("serializable");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["commits"], 7);
        assert_eq!(value["detailed"]["commits"][0]["count"], 3);
    }
}
