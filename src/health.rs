//! Repository health scoring.
//!
//! Health is derived from repository metadata, the root directory listing
//! and the `.github/workflows` listing: weighted documentation presence,
//! code-quality flags and security flags roll up into three 0-100
//! sub-scores and one weighted overall score. Activity-derived rates are a
//! required input so callers cannot forget to compute them first.

use serde::Serialize;
use std::collections::HashSet;

use crate::activity::{DailyCount, DailyFlow};
use crate::models::{ContentEntry, License, Repository};

/// Documentation files checked at the repository root, with their score
/// weights. Weights sum to 1.0.
const DOCUMENTATION_FILES: [(&str, f64); 6] = [
    ("README.md", 0.40),
    ("CONTRIBUTING.md", 0.15),
    ("LICENSE", 0.15),
    ("CODE_OF_CONDUCT.md", 0.10),
    ("SECURITY.md", 0.10),
    ("CHANGELOG.md", 0.10),
];

const TEST_DIRS: [&str; 5] = ["test", "tests", "__tests__", "spec", "specs"];

const TEST_RUNNER_CONFIGS: [&str; 2] = ["jest.config.js", "karma.conf.js"];

const DEPENDENCY_MANIFESTS: [&str; 7] = [
    "package.json",
    "requirements.txt",
    "gemfile",
    "build.gradle",
    "pom.xml",
    "composer.json",
    "cargo.toml",
];

const LINT_CONFIGS: [&str; 7] = [
    ".eslintrc",
    ".eslintrc.js",
    ".eslintrc.json",
    ".pylintrc",
    ".rubocop.yml",
    "tslint.json",
    ".stylelintrc",
];

const SECURITY_POLICY_FILES: [&str; 3] = ["security.md", "security.txt", ".github/security.md"];

const DEPENDABOT_CONFIGS: [&str; 2] = [".github/dependabot.yml", ".github/dependabot.yaml"];

/// Presence of one documentation file at the repository root.
#[derive(Clone, Debug, Serialize)]
pub struct DocumentationStatus {
    pub name: String,
    pub present: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct CodeQualityFlags {
    pub has_workflows: bool,
    pub has_tests: bool,
    pub has_dependency_management: bool,
    pub has_linting: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct SecurityFlags {
    pub has_security_policy: bool,
    pub has_vulnerability_checks: bool,
    pub has_code_scanning: bool,
}

/// Activity rates derived from the aggregated series.
///
/// Passing these into [`score_repository`] is what enforces the two-phase
/// contract: health cannot be assembled before activity has been computed.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct ActivityRates {
    /// Average commits per day across the range.
    pub commit_frequency: f64,
    /// Closed issues as a percentage of opened issues.
    pub issue_resolution_rate: f64,
    /// Closed pull requests as a percentage of opened pull requests.
    pub pr_merge_rate: f64,
}

impl ActivityRates {
    /// Derives rates from aggregator output over `days` calendar days.
    pub fn from_series(
        commits: &[DailyCount],
        issues: &[DailyFlow],
        pull_requests: &[DailyFlow],
        days: i64,
    ) -> Self {
        let commit_total: u64 = commits.iter().map(|d| d.count).sum();
        let issues_opened: u64 = issues.iter().map(|d| d.opened).sum();
        let issues_closed: u64 = issues.iter().map(|d| d.closed).sum();
        let prs_opened: u64 = pull_requests.iter().map(|d| d.opened).sum();
        let prs_closed: u64 = pull_requests.iter().map(|d| d.closed).sum();

        Self {
            commit_frequency: commit_total as f64 / days.max(1) as f64,
            issue_resolution_rate: rate(issues_closed, issues_opened),
            pr_merge_rate: rate(prs_closed, prs_opened),
        }
    }
}

fn rate(closed: u64, opened: u64) -> f64 {
    if opened == 0 {
        0.0
    } else {
        closed as f64 / opened as f64 * 100.0
    }
}

/// The composite health report for one repository.
#[derive(Clone, Debug, Serialize)]
pub struct RepositoryHealth {
    pub documentation_status: Vec<DocumentationStatus>,
    pub has_wiki: bool,
    pub has_issues: bool,
    pub has_projects: bool,
    pub default_branch: String,
    pub license: Option<License>,
    pub code_quality: CodeQualityFlags,
    pub security_status: SecurityFlags,
    pub activity: ActivityRates,
    /// Weighted documentation presence, 0-100.
    pub documentation_score: u32,
    /// Workflows + tests + dependency manifest + lint config, 0-100.
    pub code_quality_score: u32,
    /// Security policy + vulnerability checks + code scanning, 0-100.
    pub security_score: u32,
    /// round(0.30 doc + 0.40 quality + 0.30 security).
    pub overall_health_score: u32,
}

/// Scores a repository from its metadata, root contents and workflow
/// directory listing. All filename matching is case-insensitive.
pub fn score_repository(
    repo: &Repository,
    contents: &[ContentEntry],
    workflows: &[ContentEntry],
    activity: ActivityRates,
) -> RepositoryHealth {
    let file_names: HashSet<String> = contents
        .iter()
        .map(|entry| entry.name.to_lowercase())
        .collect();
    let file_paths: HashSet<String> = contents
        .iter()
        .filter(|entry| entry.is_file())
        .map(|entry| entry.path.to_lowercase())
        .collect();

    let documentation_status: Vec<DocumentationStatus> = DOCUMENTATION_FILES
        .iter()
        .map(|(name, _)| DocumentationStatus {
            name: name.to_string(),
            present: file_names.contains(&name.to_lowercase()),
        })
        .collect();

    let documentation_score = DOCUMENTATION_FILES
        .iter()
        .filter(|(name, _)| file_names.contains(&name.to_lowercase()))
        .map(|(_, weight)| weight)
        .sum::<f64>()
        * 100.0;

    let has_test_dir = contents
        .iter()
        .any(|entry| entry.is_dir() && TEST_DIRS.contains(&entry.name.to_lowercase().as_str()));
    let has_runner_config = TEST_RUNNER_CONFIGS
        .iter()
        .any(|file| file_names.contains(*file));

    let code_quality = CodeQualityFlags {
        has_workflows: !workflows.is_empty(),
        has_tests: has_test_dir || has_runner_config,
        has_dependency_management: DEPENDENCY_MANIFESTS
            .iter()
            .any(|file| file_names.contains(*file)),
        has_linting: LINT_CONFIGS
            .iter()
            .any(|file| file_names.contains(*file) || file_paths.contains(*file)),
    };

    let security_status = SecurityFlags {
        has_security_policy: SECURITY_POLICY_FILES
            .iter()
            .any(|file| file_names.contains(*file) || file_paths.contains(*file)),
        has_vulnerability_checks: DEPENDABOT_CONFIGS
            .iter()
            .any(|file| file_paths.contains(*file)),
        has_code_scanning: workflows.iter().any(|entry| {
            let name = entry.name.to_lowercase();
            name.contains("codeql") || name.contains("scan")
        }),
    };

    let code_quality_score = [
        (code_quality.has_workflows, 25u32),
        (code_quality.has_tests, 30),
        (code_quality.has_dependency_management, 25),
        (code_quality.has_linting, 20),
    ]
    .iter()
    .filter(|(flag, _)| *flag)
    .map(|(_, points)| points)
    .sum::<u32>();

    let security_score = [
        (security_status.has_security_policy, 40u32),
        (security_status.has_vulnerability_checks, 30),
        (security_status.has_code_scanning, 30),
    ]
    .iter()
    .filter(|(flag, _)| *flag)
    .map(|(_, points)| points)
    .sum::<u32>();

    let overall_health_score = (documentation_score * 0.30
        + code_quality_score as f64 * 0.40
        + security_score as f64 * 0.30)
        .round() as u32;

    RepositoryHealth {
        documentation_status,
        has_wiki: repo.has_wiki,
        has_issues: repo.has_issues,
        has_projects: repo.has_projects,
        default_branch: repo.default_branch.clone(),
        license: repo.license.clone(),
        code_quality,
        security_status,
        activity,
        documentation_score: documentation_score.round() as u32,
        code_quality_score,
        security_score,
        overall_health_score,
    }
}
