//! Typed schemas for the GitHub endpoints the dashboard consumes.
//!
//! Payloads are decoded into these types at the fetch boundary so the
//! aggregators operate on guaranteed shapes instead of an untyped JSON
//! graph. Fields GitHub may omit or null are `Option`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repository metadata snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub homepage: Option<String>,
    pub stargazers_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    pub forks_count: u64,
    pub open_issues_count: u64,
    pub language: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub has_wiki: bool,
    #[serde(default)]
    pub has_issues: bool,
    #[serde(default)]
    pub has_projects: bool,
    pub default_branch: String,
    #[serde(rename = "private")]
    pub is_private: bool,
    #[serde(default)]
    pub topics: Vec<String>,
    pub owner: Account,
    pub license: Option<License>,
}

/// A user or organization account, as embedded in other payloads.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
    pub avatar_url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct License {
    pub key: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    #[serde(default)]
    pub color: String,
}

/// An issue from the issues listing. GitHub also surfaces pull requests on
/// this endpoint; `pull_request` is present on those entries.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub state: String,
    pub html_url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Vec<Label>,
    pub user: Option<Account>,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub state: String,
    pub html_url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Vec<Label>,
    pub user: Option<Account>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    pub name: Option<String>,
    pub html_url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub author: Option<Account>,
}

/// A commit from the commits listing. The linked `author` account is null
/// for bot commits and deleted accounts; the embedded git signature is the
/// fallback identity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub html_url: Option<String>,
    pub commit: GitCommit,
    pub author: Option<Account>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GitCommit {
    pub message: String,
    pub author: Option<GitSignature>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GitSignature {
    pub name: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub commit: BranchTip,
    #[serde(default)]
    pub protected: bool,
    /// Date of the branch's most recent commit, attached best-effort by the
    /// branch lister. Absent when the per-branch lookup failed.
    #[serde(skip_deserializing)]
    pub last_activity: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BranchTip {
    pub sha: String,
    pub url: String,
}

/// One entry of a directory listing from the contents endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: String,
}

impl ContentEntry {
    pub fn is_file(&self) -> bool {
        self.entry_type == "file"
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type == "dir"
    }
}

/// All-time contributor statistics from the contributors endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContributorStat {
    pub login: String,
    pub avatar_url: String,
    pub contributions: u64,
}

/// Envelope returned by the search endpoints.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResults<T> {
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    pub items: Vec<T>,
}

/// One page of a simple listing, with a page-full heuristic for "more".
#[derive(Clone, Debug, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub has_next_page: bool,
}
