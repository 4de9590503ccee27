use crate::domain::external_apis::github::GitHubApiError;
use anyhow::{Context, Error};
use std::future::Future;

/// Page size requested from every paged endpoint (the API maximum).
pub const PER_PAGE: u8 = 100;

/// Requests pages 1, 2, 3, ... until one comes back empty and returns every item in page order.
///
/// A failed page aborts the listing instead of returning what was gathered so far.
pub async fn fetch_all_pages<T, F, Fut>(resource: &str, mut fetch_page: F) -> Result<Vec<T>, Error>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>, GitHubApiError>>,
{
    let mut items = Vec::new();
    let mut page = 1;

    loop {
        tracing::debug!("Fetching page {} of {}", page, resource);
        let batch = fetch_page(page)
            .await
            .with_context(|| format!("Failed to fetch page {page} of {resource}"))?;

        if batch.is_empty() {
            break;
        }

        items.extend(batch);
        page += 1;
    }

    tracing::debug!("Fetched {} {} over {} pages", items.len(), resource, page - 1);
    Ok(items)
}
