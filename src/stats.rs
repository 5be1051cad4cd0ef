//! Contributor rankings and language breakdowns.

use serde::Serialize;
use std::collections::HashMap;

use crate::models::Commit;

/// A contributor ranked by commit count within a time range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RankedContributor {
    pub login: String,
    pub avatar_url: String,
    pub contributions: u64,
}

/// Groups commits by author login and ranks by count, descending.
///
/// Commits without a linked account (bots, deleted users) have no login to
/// group under and are excluded. Ties are broken by login so the ordering
/// is deterministic.
pub fn rank_contributors(commits: &[Commit]) -> Vec<RankedContributor> {
    let mut by_login: HashMap<&str, (u64, &str)> = HashMap::new();
    for commit in commits {
        if let Some(account) = &commit.author {
            let entry = by_login
                .entry(account.login.as_str())
                .or_insert((0, account.avatar_url.as_str()));
            entry.0 += 1;
        }
    }

    let mut ranked: Vec<RankedContributor> = by_login
        .into_iter()
        .map(|(login, (contributions, avatar_url))| RankedContributor {
            login: login.to_string(),
            avatar_url: avatar_url.to_string(),
            contributions,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.contributions
            .cmp(&a.contributions)
            .then_with(|| a.login.cmp(&b.login))
    });
    ranked
}

/// One language's share of the repository's bytes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LanguageShare {
    pub name: String,
    /// Percentage of total bytes, rounded to two decimals.
    pub percentage: f64,
}

/// Converts the byte-count-per-language map to sorted percentages.
pub fn language_breakdown(bytes_by_language: &HashMap<String, u64>) -> Vec<LanguageShare> {
    let total: u64 = bytes_by_language.values().sum();
    if total == 0 {
        return Vec::new();
    }

    let mut shares: Vec<LanguageShare> = bytes_by_language
        .iter()
        .map(|(name, bytes)| LanguageShare {
            name: name.clone(),
            percentage: round2(*bytes as f64 / total as f64 * 100.0),
        })
        .collect();
    shares.sort_by(|a, b| {
        b.percentage
            .total_cmp(&a.percentage)
            .then_with(|| a.name.cmp(&b.name))
    });
    shares
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, GitCommit, GitSignature};
    use chrono::{TimeZone, Utc};

    fn commit(author: Option<&str>) -> Commit {
        Commit {
            sha: "abc".to_string(),
            html_url: None,
            commit: GitCommit {
                message: "m".to_string(),
                author: Some(GitSignature {
                    name: Some("Someone".to_string()),
                    date: Some(Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap()),
                }),
            },
            author: author.map(|login| Account {
                login: login.to_string(),
                avatar_url: format!("https://avatars.example/{login}"),
            }),
        }
    }

    #[test]
    fn ranking_counts_and_sorts_descending() {
        let commits = vec![
            commit(Some("alice")),
            commit(Some("bob")),
            commit(Some("alice")),
            commit(Some("alice")),
        ];

        let ranked = rank_contributors(&commits);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].login, "alice");
        assert_eq!(ranked[0].contributions, 3);
        assert_eq!(ranked[0].avatar_url, "https://avatars.example/alice");
        assert_eq!(ranked[1].login, "bob");
        assert_eq!(ranked[1].contributions, 1);
    }

    #[test]
    fn commits_without_linked_account_are_excluded() {
        let commits = vec![commit(Some("alice")), commit(None), commit(None)];

        let ranked = rank_contributors(&commits);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].contributions, 1);
    }

    #[test]
    fn ties_rank_alphabetically() {
        let commits = vec![commit(Some("zoe")), commit(Some("amy"))];
        let ranked = rank_contributors(&commits);
        assert_eq!(ranked[0].login, "amy");
        assert_eq!(ranked[1].login, "zoe");
    }

    #[test]
    fn language_percentages_sum_to_one_hundred() {
        let bytes = HashMap::from([
            ("TypeScript".to_string(), 300u64),
            ("JavaScript".to_string(), 100u64),
        ]);

        let shares = language_breakdown(&bytes);

        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].name, "TypeScript");
        assert_eq!(shares[0].percentage, 75.00);
        assert_eq!(shares[1].name, "JavaScript");
        assert_eq!(shares[1].percentage, 25.00);
        assert_eq!(shares.iter().map(|s| s.percentage).sum::<f64>(), 100.00);
    }

    #[test]
    fn empty_language_map_yields_empty_breakdown() {
        assert!(language_breakdown(&HashMap::new()).is_empty());
    }

    #[test]
    fn percentages_round_to_two_decimals() {
        let bytes = HashMap::from([
            ("Rust".to_string(), 1u64),
            ("Shell".to_string(), 2u64),
        ]);

        let shares = language_breakdown(&bytes);

        assert_eq!(shares[0].name, "Shell");
        assert_eq!(shares[0].percentage, 66.67);
        assert_eq!(shares[1].percentage, 33.33);
    }
}
