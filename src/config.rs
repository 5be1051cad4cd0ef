//! Client configuration and repository coordinates.
//!
//! `ClientConfig` governs cache lifetime, pagination width and the upstream
//! base URL. It can be built by hand (tests point `base_url` at a fake
//! upstream) or loaded from the environment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::error::Error;

/// A unique identifier for a GitHub repository.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    /// The owner of the repository (e.g., "rust-lang").
    pub owner: String,
    /// The name of the repository (e.g., "rust").
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoId {
    type Err = Error;

    /// Parses a `full_name` of the form `owner/repo`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(2, '/');
        match (parts.next(), parts.next()) {
            (Some(owner), Some(repo)) if !owner.trim().is_empty() && !repo.trim().is_empty() => {
                Ok(Self::new(owner.trim(), repo.trim()))
            }
            _ => Err(Error::InvalidRepoName(s.to_string())),
        }
    }
}

/// Configuration for the GitHub client, loaded from the environment or
/// constructed directly.
#[derive(Clone, Debug, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the GitHub REST API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Time to live for cached responses in milliseconds.
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,

    /// Maximum number of cached responses to retain.
    #[serde(default = "default_cache_max_capacity")]
    pub cache_max_capacity: u64,

    /// Number of pages requested concurrently per pagination batch.
    #[serde(default = "default_page_batch_size")]
    pub page_batch_size: usize,

    /// Items requested per page; 100 is GitHub's maximum.
    #[serde(default = "default_per_page")]
    pub per_page: usize,

    /// Optional GitHub token. A token passed to the client constructor
    /// takes precedence over this value.
    pub github_token: Option<String>,
}

fn default_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_cache_ttl_ms() -> u64 {
    300_000
}

fn default_cache_max_capacity() -> u64 {
    1024
}

fn default_page_batch_size() -> usize {
    3
}

fn default_per_page() -> usize {
    100
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            cache_ttl_ms: default_cache_ttl_ms(),
            cache_max_capacity: default_cache_max_capacity(),
            page_batch_size: default_page_batch_size(),
            per_page: default_per_page(),
            github_token: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    pub fn cache_ttl(&self) -> StdDuration {
        StdDuration::from_millis(self.cache_ttl_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    fn parse_repo_id_from_full_name() {
        let id: RepoId = "rust-lang/rust".parse().expect("should parse");
        assert_eq!(id.owner, "rust-lang");
        assert_eq!(id.repo, "rust");
        assert_eq!(id.to_string(), "rust-lang/rust");
    }

    #[test]
    fn parse_repo_id_rejects_malformed_input() {
        assert!("rust-lang".parse::<RepoId>().is_err());
        assert!("/repo".parse::<RepoId>().is_err());
        assert!("owner/".parse::<RepoId>().is_err());
    }

    #[test]
    fn default_config_values() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://api.github.com");
        assert_eq!(config.cache_ttl_ms, 300_000);
        assert_eq!(config.page_batch_size, 3);
        assert_eq!(config.per_page, 100);
    }

    #[test]
    #[serial]
    fn config_from_env() {
        env::set_var("BASE_URL", "http://localhost:9999");
        env::set_var("CACHE_TTL_MS", "60000");
        env::set_var("CACHE_MAX_CAPACITY", "500");
        env::set_var("PAGE_BATCH_SIZE", "2");
        env::set_var("GITHUB_TOKEN", "test-token");

        let config = ClientConfig::from_env().expect("failed to load config");

        assert_eq!(config.base_url, "http://localhost:9999");
        assert_eq!(config.cache_ttl_ms, 60_000);
        assert_eq!(config.cache_max_capacity, 500);
        assert_eq!(config.page_batch_size, 2);
        assert_eq!(config.per_page, 100);
        assert_eq!(config.github_token.as_deref(), Some("test-token"));

        env::remove_var("BASE_URL");
        env::remove_var("CACHE_TTL_MS");
        env::remove_var("CACHE_MAX_CAPACITY");
        env::remove_var("PAGE_BATCH_SIZE");
        env::remove_var("GITHUB_TOKEN");
    }

    #[test]
    #[serial]
    fn config_from_empty_env_uses_defaults() {
        env::remove_var("BASE_URL");
        env::remove_var("CACHE_TTL_MS");

        let config = ClientConfig::from_env().expect("defaults should apply");
        assert_eq!(config.cache_ttl_ms, 300_000);
    }
}
