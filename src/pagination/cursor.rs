//! Cursor-following page stream
//!
//! The one place that walks a `next_page_url` chain for one-shot listings
//! (category selector, search index). Interactive, incremental paging goes
//! through [`PaginatedCollection`](super::PaginatedCollection) instead.

use super::types::{CursorPolicy, Page, PageSource};
use crate::error::{Error, Result};
use futures::{Stream, TryStreamExt};
use std::sync::Arc;

/// Upper bound on pages followed in one walk
pub const MAX_PAGES: usize = 10_000;

/// Stream every page starting at `first_url`.
///
/// Pages are requested lazily, one at a time. The stream ends after the
/// page whose `next_page_url` is null, or right after the first error.
pub fn pages<T>(
    source: Arc<dyn PageSource<T>>,
    first_url: impl Into<String>,
    policy: CursorPolicy,
) -> impl Stream<Item = Result<Page<T>>> + Send
where
    T: Send + 'static,
{
    let start = (Some(first_url.into()), 0usize);

    futures::stream::try_unfold(start, move |(next, fetched)| {
        let source = Arc::clone(&source);
        let policy = policy.clone();
        async move {
            let Some(url) = next else {
                return Ok(None);
            };
            if fetched >= MAX_PAGES {
                return Err(Error::halted(format!(
                    "gave up after {MAX_PAGES} pages at {url}"
                )));
            }

            let page = source.fetch_page(&url).await?;
            let next = policy.apply(page.next_page_url.clone())?;
            Ok(Some((page, (next, fetched + 1))))
        }
    })
}

/// Fetch every page and concatenate the items in server order.
///
/// All-or-error: if any page fails, the error is returned and the items
/// already received are dropped. Use a `PaginatedCollection` when partial
/// results must survive.
pub async fn collect_all<T>(
    source: Arc<dyn PageSource<T>>,
    first_url: impl Into<String>,
    policy: CursorPolicy,
) -> Result<Vec<T>>
where
    T: Send + 'static,
{
    pages(source, first_url, policy)
        .try_fold(Vec::new(), |mut acc, page| async move {
            acc.extend(page.items);
            Ok(acc)
        })
        .await
}
