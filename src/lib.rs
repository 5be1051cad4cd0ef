//! repolens: the GitHub REST access layer behind a repository dashboard.
//!
//! The crate wraps the GitHub API in a rate-limit-aware engine: every
//! request goes through a TTL-bounded response cache, listing endpoints are
//! paginated in bounded concurrent batches sized by the selected time
//! range, and raw items are aggregated into zero-filled daily activity
//! series, contributor and language rankings, and a composite repository
//! health score. Consumers hold a bearer token and repository coordinates
//! and render whatever [`GitHubClient`] returns.

pub mod activity;
pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod health;
pub mod models;
pub mod range;
pub mod selection;
pub mod stats;

pub use client::{AnalyticsData, GitHubClient};
pub use config::{ClientConfig, RepoId};
pub use error::{Error, Result};
pub use export::AnalyticsExport;
pub use health::{ActivityRates, RepositoryHealth};
pub use range::TimeRange;
