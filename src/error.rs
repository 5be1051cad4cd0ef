//! Error taxonomy for the GitHub access layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Non-2xx response from the GitHub API. Not retried; status codes are
    /// not interpreted except where a call site explicitly tolerates a 404.
    #[error("GitHub API error: {status} {status_text}")]
    Upstream { status: u16, status_text: String },

    /// A time-range name outside the fixed profile table. This is a
    /// programmer error, not something a well-formed caller produces.
    #[error("invalid time range: {0}")]
    UnknownTimeRange(String),

    /// A bearer token containing characters that cannot appear in an HTTP
    /// header.
    #[error("token is not a valid header value")]
    InvalidToken,

    /// A `full_name` that does not split into `owner/repo`.
    #[error("malformed repository name: {0}")]
    InvalidRepoName(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The payload did not match the expected endpoint schema.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// Whether this is an upstream response with the given HTTP status.
    pub fn is_status(&self, status: u16) -> bool {
        matches!(self, Error::Upstream { status: s, .. } if *s == status)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
