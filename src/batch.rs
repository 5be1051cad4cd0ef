//! Bounded concurrent pagination over listing endpoints.
//!
//! GitHub listing endpoints are expensive and rate limited, so each fetch
//! carries the budget of its time-range profile: at most `max_items` items
//! and `min(ceil(max_items / per_page), max_requests)` page requests. Pages
//! are requested in fixed-width concurrent windows through the cached
//! fetcher and flattened in page order.

use futures::future;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::fetch::Fetch;
use crate::range::TimeRange;

/// Fetches up to the profile's item budget from a paginated endpoint.
///
/// Stops after any batch containing an empty page, or once the running
/// total reaches `max_items`; the result is truncated to `max_items`.
pub async fn fetch_batch<T, F>(
    fetcher: &F,
    endpoint: &str,
    range: TimeRange,
    params: &[(String, String)],
    config: &ClientConfig,
) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    F: Fetch,
{
    let profile = range.profile();
    let per_page = config.per_page.max(1);
    let pages_for_items = profile.max_items.div_ceil(per_page);
    let max_pages = pages_for_items.min(profile.max_requests);
    let batch_width = config.page_batch_size.max(1);

    let mut items: Vec<T> = Vec::new();
    let mut batch_start = 1;

    while batch_start <= max_pages {
        let batch_end = (batch_start + batch_width - 1).min(max_pages);

        let requests = (batch_start..=batch_end).map(|page| {
            let mut page_params = params.to_vec();
            page_params.push(("per_page".to_string(), per_page.to_string()));
            page_params.push(("page".to_string(), page.to_string()));
            async move { fetcher.fetch_json(endpoint, &page_params).await }
        });

        let payloads = future::try_join_all(requests).await?;

        let mut saw_empty_page = false;
        for payload in payloads {
            let page_items: Vec<T> = serde_json::from_value(payload)?;
            if page_items.is_empty() {
                saw_empty_page = true;
            } else {
                items.extend(page_items);
            }
        }

        if saw_empty_page || items.len() >= profile.max_items {
            break;
        }

        batch_start = batch_end + 1;
    }

    items.truncate(profile.max_items);
    Ok(items)
}
