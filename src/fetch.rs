//! Authenticated fetching and response caching.
//!
//! Every request the client makes funnels through [`CachedFetcher`]: a hit
//! within the TTL returns the stored payload with no network call, a miss
//! delegates to the inner [`Fetch`] implementation and stores the result.
//! The concrete implementation is [`RestFetcher`] over reqwest; tests swap
//! in an in-memory fake through the same trait.

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{Error, Result};

const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const ACCEPT_JSON: &str = "application/vnd.github+json";

/// A source of JSON payloads for GitHub endpoints.
///
/// `endpoint` is a path relative to the API base URL (e.g.
/// `/repos/rust-lang/rust/commits`); `params` are query parameters.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch_json(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value>;
}

/// Bearer-authenticated fetcher over the GitHub REST API.
///
/// Does not retry and does not interpret rate-limit headers; a non-2xx
/// status becomes [`Error::Upstream`] and bubbles to the caller.
pub struct RestFetcher {
    http: reqwest::Client,
    base_url: String,
}

impl RestFetcher {
    pub fn new(token: &str, base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth =
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| Error::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("repolens/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Fetch for RestFetcher {
    async fn fetch_json(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.http.get(&url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl<T: Fetch + ?Sized> Fetch for std::sync::Arc<T> {
    async fn fetch_json(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value> {
        (**self).fetch_json(endpoint, params).await
    }
}

/// TTL-bounded read-through cache in front of a [`Fetch`] implementation.
///
/// Keys are the endpoint path plus canonically ordered query parameters, so
/// logically identical requests share one entry regardless of parameter
/// order. Two concurrent misses on one key will both hit the network and
/// both store (last write wins); payloads for the same key within the TTL
/// are expected to be equivalent, so this costs a request, not correctness.
pub struct CachedFetcher<F> {
    inner: F,
    cache: Cache<String, Value>,
}

impl<F: Fetch> CachedFetcher<F> {
    pub fn new(inner: F, config: &ClientConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.cache_max_capacity)
            .time_to_live(config.cache_ttl())
            .build();
        Self { inner, cache }
    }

    /// Fetches and decodes an endpoint payload into its schema type.
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<T> {
        let raw = self.fetch_json(endpoint, params).await?;
        Ok(serde_json::from_value(raw)?)
    }
}

/// Canonical cache key: endpoint plus sorted query parameters.
fn cache_key(endpoint: &str, params: &[(String, String)]) -> String {
    let mut pairs: Vec<_> = params.iter().collect();
    pairs.sort();
    let query: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{}?{}", endpoint, query.join("&"))
}

#[async_trait]
impl<F: Fetch> Fetch for CachedFetcher<F> {
    async fn fetch_json(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value> {
        let key = cache_key(endpoint, params);

        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!(%key, "cache hit");
            return Ok(cached);
        }

        let payload = self.inner.fetch_json(endpoint, params).await?;
        self.cache.insert(key, payload.clone()).await;
        Ok(payload)
    }
}
