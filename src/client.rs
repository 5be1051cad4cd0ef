//! The main entry point for retrieving repository data and analytics.
//!
//! `GitHubClient` owns the cached fetcher and exposes every operation the
//! dashboard renders from: listings, activity series, contributor and
//! language rankings, the health report and the combined analytics bundle.
//! All fetching funnels through the TTL cache; aggregation is delegated to
//! the pure functions in [`activity`](crate::activity),
//! [`health`](crate::health) and [`stats`](crate::stats).

use chrono::{DateTime, Utc};
use futures::future;
use serde::Serialize;
use std::collections::HashMap;

use crate::activity::{bucket_daily_counts, bucket_daily_flow, DailyCount, DailyFlow};
use crate::batch::fetch_batch;
use crate::config::{ClientConfig, RepoId};
use crate::error::Result;
use crate::fetch::{CachedFetcher, Fetch, RestFetcher};
use crate::health::{score_repository, ActivityRates, RepositoryHealth};
use crate::models::{
    Branch, Commit, ContentEntry, ContributorStat, Issue, Paged, PullRequest, Release, Repository,
    SearchResults,
};
use crate::range::TimeRange;
use crate::stats::{language_breakdown, rank_contributors, LanguageShare, RankedContributor};

/// Everything the analytics view renders, fetched in one fan-out.
#[derive(Clone, Debug, Serialize)]
pub struct AnalyticsData {
    pub commits: Vec<DailyCount>,
    pub issues: Vec<DailyFlow>,
    pub pull_requests: Vec<DailyFlow>,
    /// Contributors ranked by commits within the selected range.
    pub contributors: Vec<RankedContributor>,
    pub all_time_contributors: Vec<ContributorStat>,
    pub languages: Vec<LanguageShare>,
    pub health: RepositoryHealth,
}

pub struct GitHubClient<F: Fetch = RestFetcher> {
    fetcher: CachedFetcher<F>,
    config: ClientConfig,
}

impl GitHubClient<RestFetcher> {
    /// Builds a client for the given bearer token with default settings.
    pub fn new(token: &str) -> Result<Self> {
        Self::with_config(token, ClientConfig::default())
    }

    /// Builds a client with explicit settings. An empty token falls back
    /// to `config.github_token`.
    pub fn with_config(token: &str, config: ClientConfig) -> Result<Self> {
        let token = if token.is_empty() {
            config.github_token.clone().unwrap_or_default()
        } else {
            token.to_string()
        };
        let fetcher = RestFetcher::new(&token, &config.base_url)?;
        Ok(Self {
            fetcher: CachedFetcher::new(fetcher, &config),
            config,
        })
    }
}

impl<F: Fetch> GitHubClient<F> {
    /// Builds a client over an arbitrary fetcher. This is the seam used by
    /// tests to run the full pipeline against an in-memory upstream.
    pub fn with_fetcher(fetcher: F, config: ClientConfig) -> Self {
        Self {
            fetcher: CachedFetcher::new(fetcher, &config),
            config,
        }
    }

    /// Searches repositories, most-starred first.
    pub async fn search_repositories(&self, query: &str) -> Result<Vec<Repository>> {
        let results: SearchResults<Repository> = self
            .fetcher
            .get(
                "/search/repositories",
                &params(&[("q", query), ("sort", "stars"), ("order", "desc")]),
            )
            .await?;
        Ok(results.items)
    }

    /// Fetches the repository metadata snapshot.
    pub async fn repository(&self, id: &RepoId) -> Result<Repository> {
        self.fetcher
            .get(&format!("/repos/{}/{}", id.owner, id.repo), &[])
            .await
    }

    /// One page of issues in the given state.
    pub async fn issues(
        &self,
        id: &RepoId,
        page: usize,
        per_page: usize,
        state: &str,
    ) -> Result<Paged<Issue>> {
        let items: Vec<Issue> = self
            .fetcher
            .get(
                &format!("/repos/{}/{}/issues", id.owner, id.repo),
                &params(&[
                    ("state", state),
                    ("page", &page.to_string()),
                    ("per_page", &per_page.to_string()),
                ]),
            )
            .await?;
        Ok(paged(items, per_page))
    }

    /// One page of pull requests across all states.
    pub async fn pull_requests(
        &self,
        id: &RepoId,
        page: usize,
        per_page: usize,
    ) -> Result<Paged<PullRequest>> {
        let items: Vec<PullRequest> = self
            .fetcher
            .get(
                &format!("/repos/{}/{}/pulls", id.owner, id.repo),
                &params(&[
                    ("state", "all"),
                    ("page", &page.to_string()),
                    ("per_page", &per_page.to_string()),
                ]),
            )
            .await?;
        Ok(paged(items, per_page))
    }

    /// One page of releases.
    pub async fn releases(
        &self,
        id: &RepoId,
        page: usize,
        per_page: usize,
    ) -> Result<Paged<Release>> {
        let items: Vec<Release> = self
            .fetcher
            .get(
                &format!("/repos/{}/{}/releases", id.owner, id.repo),
                &params(&[
                    ("page", &page.to_string()),
                    ("per_page", &per_page.to_string()),
                ]),
            )
            .await?;
        Ok(paged(items, per_page))
    }

    /// One page of commits on the default branch.
    pub async fn commits(
        &self,
        id: &RepoId,
        page: usize,
        per_page: usize,
    ) -> Result<Paged<Commit>> {
        let items: Vec<Commit> = self
            .fetcher
            .get(
                &format!("/repos/{}/{}/commits", id.owner, id.repo),
                &params(&[
                    ("page", &page.to_string()),
                    ("per_page", &per_page.to_string()),
                ]),
            )
            .await?;
        Ok(paged(items, per_page))
    }

    /// All-time contributor statistics.
    pub async fn contributors(&self, id: &RepoId) -> Result<Vec<ContributorStat>> {
        self.fetcher
            .get(&format!("/repos/{}/{}/contributors", id.owner, id.repo), &[])
            .await
    }

    /// Language share of the repository, by bytes, descending.
    pub async fn languages(&self, id: &RepoId) -> Result<Vec<LanguageShare>> {
        let bytes: HashMap<String, u64> = self
            .fetcher
            .get(&format!("/repos/{}/{}/languages", id.owner, id.repo), &[])
            .await?;
        Ok(language_breakdown(&bytes))
    }

    /// Daily commit counts across the resolved range, zero-filled.
    pub async fn commit_activity(&self, id: &RepoId, range: TimeRange) -> Result<Vec<DailyCount>> {
        let now = Utc::now();
        let commits = self.commits_in_window(id, range, now).await?;
        let resolved = range.resolve(now);
        Ok(bucket_daily_counts(
            &commits,
            |c| c.commit.author.as_ref()?.date,
            &resolved,
        ))
    }

    /// Daily opened/closed issue counts across the resolved range.
    ///
    /// The listing endpoint filters by state rather than by event date, so
    /// opened and closed sides come from two parallel batched fetches.
    pub async fn issue_activity(&self, id: &RepoId, range: TimeRange) -> Result<Vec<DailyFlow>> {
        let now = Utc::now();
        let since = range.clamped_fetch_start(now).to_rfc3339();
        let endpoint = format!("/repos/{}/{}/issues", id.owner, id.repo);

        let all_params = params(&[("state", "all"), ("since", &since)]);
        let closed_params = params(&[("state", "closed"), ("since", &since)]);
        let all = fetch_batch::<Issue, _>(
            &self.fetcher,
            &endpoint,
            range,
            &all_params,
            &self.config,
        );
        let closed = fetch_batch::<Issue, _>(
            &self.fetcher,
            &endpoint,
            range,
            &closed_params,
            &self.config,
        );
        let (all, closed) = futures::try_join!(all, closed)?;

        let resolved = range.resolve(now);
        Ok(bucket_daily_flow(
            &all,
            &closed,
            |issue| issue.created_at,
            |issue| issue.closed_at,
            &resolved,
        ))
    }

    /// Daily opened/closed pull request counts across the resolved range.
    pub async fn pull_request_activity(
        &self,
        id: &RepoId,
        range: TimeRange,
    ) -> Result<Vec<DailyFlow>> {
        let now = Utc::now();
        let since = range.clamped_fetch_start(now).to_rfc3339();
        let endpoint = format!("/repos/{}/{}/pulls", id.owner, id.repo);

        let all_params = params(&[("state", "all"), ("since", &since)]);
        let closed_params = params(&[("state", "closed"), ("since", &since)]);
        let all = fetch_batch::<PullRequest, _>(
            &self.fetcher,
            &endpoint,
            range,
            &all_params,
            &self.config,
        );
        let closed = fetch_batch::<PullRequest, _>(
            &self.fetcher,
            &endpoint,
            range,
            &closed_params,
            &self.config,
        );
        let (all, closed) = futures::try_join!(all, closed)?;

        let resolved = range.resolve(now);
        Ok(bucket_daily_flow(
            &all,
            &closed,
            |pr| pr.created_at,
            |pr| pr.closed_at,
            &resolved,
        ))
    }

    /// Contributors ranked by commit count within the resolved range.
    ///
    /// Commits with no linked account are excluded; they have no login to
    /// rank under.
    pub async fn contributors_in_range(
        &self,
        id: &RepoId,
        range: TimeRange,
    ) -> Result<Vec<RankedContributor>> {
        let commits = self.commits_in_window(id, range, Utc::now()).await?;
        Ok(rank_contributors(&commits))
    }

    /// The composite health report.
    ///
    /// `rates` come from already-computed activity series; requiring them
    /// here keeps the two-phase composition honest. A missing
    /// `.github/workflows` directory counts as "no workflows", not an
    /// error.
    pub async fn repository_health(
        &self,
        id: &RepoId,
        rates: ActivityRates,
    ) -> Result<RepositoryHealth> {
        let repo = self.repository(id);
        let contents_endpoint = format!("/repos/{}/{}/contents", id.owner, id.repo);
        let contents = self.fetcher.get::<Vec<ContentEntry>>(&contents_endpoint, &[]);
        let workflows = async {
            match self
                .fetcher
                .get::<Vec<ContentEntry>>(
                    &format!("/repos/{}/{}/contents/.github/workflows", id.owner, id.repo),
                    &[],
                )
                .await
            {
                Ok(entries) => Ok(entries),
                Err(e) if e.is_status(404) => Ok(Vec::new()),
                Err(e) => Err(e),
            }
        };

        let (repo, contents, workflows) = futures::try_join!(repo, contents, workflows)?;
        Ok(score_repository(&repo, &contents, &workflows, rates))
    }

    /// Branches with a best-effort last-activity date.
    ///
    /// Availability wins over completeness here: a failing branch list
    /// degrades to an empty result, and a failing per-branch commit lookup
    /// degrades to a branch without activity data.
    pub async fn branches(&self, id: &RepoId) -> Result<Vec<Branch>> {
        let listed: Vec<Branch> = match self
            .fetcher
            .get(&format!("/repos/{}/{}/branches", id.owner, id.repo), &[])
            .await
        {
            Ok(branches) => branches,
            Err(e) => {
                tracing::warn!(repo = %id, error = %e, "branch listing failed, returning none");
                return Ok(Vec::new());
            }
        };

        let with_activity = listed.into_iter().map(|mut branch| async move {
            let activity = self.branch_last_activity(id, &branch.name).await;
            branch.last_activity = activity;
            branch
        });
        Ok(future::join_all(with_activity).await)
    }

    async fn branch_last_activity(&self, id: &RepoId, branch: &str) -> Option<DateTime<Utc>> {
        let result: Result<Vec<Commit>> = self
            .fetcher
            .get(
                &format!("/repos/{}/{}/commits", id.owner, id.repo),
                &params(&[("sha", branch), ("per_page", "1")]),
            )
            .await;

        match result {
            Ok(commits) => commits.first().and_then(|c| c.commit.author.as_ref()?.date),
            Err(e) => {
                tracing::warn!(repo = %id, branch, error = %e, "branch activity lookup failed");
                None
            }
        }
    }

    /// The full dashboard fan-out: activity series, contributors, languages
    /// and health in one concurrent join. Health rates are derived from the
    /// series computed in the same call.
    pub async fn analytics(&self, id: &RepoId, range: TimeRange) -> Result<AnalyticsData> {
        let (commits, issues, pull_requests, contributors, all_time_contributors, languages) =
            futures::try_join!(
                self.commit_activity(id, range),
                self.issue_activity(id, range),
                self.pull_request_activity(id, range),
                self.contributors_in_range(id, range),
                self.contributors(id),
                self.languages(id),
            )?;

        let rates = ActivityRates::from_series(&commits, &issues, &pull_requests, range.days());
        let health = self.repository_health(id, rates).await?;

        Ok(AnalyticsData {
            commits,
            issues,
            pull_requests,
            contributors,
            all_time_contributors,
            languages,
            health,
        })
    }

    /// Batched commit fetch over the clamped window shared by the commit
    /// aggregator and the ranged contributor ranking.
    async fn commits_in_window(
        &self,
        id: &RepoId,
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> Result<Vec<Commit>> {
        let resolved = range.resolve(now);
        let since = range.clamped_fetch_start(now).to_rfc3339();
        let until = resolved.end.to_rfc3339();

        fetch_batch(
            &self.fetcher,
            &format!("/repos/{}/{}/commits", id.owner, id.repo),
            range,
            &params(&[("since", &since), ("until", &until)]),
            &self.config,
        )
        .await
    }
}

fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn paged<T>(items: Vec<T>, per_page: usize) -> Paged<T> {
    let has_next_page = items.len() == per_page;
    Paged {
        items,
        has_next_page,
    }
}
