//! Pagination types and traits
//!
//! Defines the page model, collection states and the `PageSource` seam
//! every paginated fetch goes through.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// Wire form of a paginated `content` object.
///
/// Only `data` and `next_page_url` drive paging; the rest is informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContent<T> {
    /// Items on this page
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    /// Absolute URL of the next page, null on the last page
    #[serde(default)]
    pub next_page_url: Option<String>,
    /// 1-based page number
    #[serde(default)]
    pub current_page: Option<u64>,
    /// Page size used by the server
    #[serde(default)]
    pub per_page: Option<u64>,
}

/// One page of items plus the cursor to the next one
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items in server order
    pub items: Vec<T>,
    /// Next page URL, `None` when this is the last page
    pub next_page_url: Option<String>,
    /// Page number reported by the server
    pub current_page: Option<u64>,
}

impl<T> Page<T> {
    /// Create a page
    pub fn new(items: Vec<T>, next_page_url: Option<String>) -> Self {
        Self {
            items,
            next_page_url,
            current_page: None,
        }
    }

    /// Create the last page of a collection
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }

    /// Check if another page follows
    pub fn has_next(&self) -> bool {
        self.next_page_url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

impl<T> From<PageContent<T>> for Page<T> {
    fn from(content: PageContent<T>) -> Self {
        Self {
            items: content.data,
            next_page_url: content.next_page_url,
            current_page: content.current_page,
        }
    }
}

/// Lifecycle state of a paginated collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionState {
    /// Ready to fetch the next page
    Idle,
    /// A page request is in flight
    Fetching,
    /// The last page has been fetched
    Exhausted,
    /// A page request failed; paging is halted
    Errored,
}

impl CollectionState {
    /// Check if further pages can be requested
    pub fn can_fetch(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Result of a single `fetch_next` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// One page was fetched and appended
    Fetched {
        /// Number of items appended
        items: usize,
        /// Whether that page was the last one
        exhausted: bool,
    },
    /// Another fetch is in flight; nothing was requested
    Busy,
    /// The cursor is null; nothing was requested
    Exhausted,
    /// A previous page failed; nothing was requested
    Halted,
    /// The collection was cancelled; nothing was committed
    Cancelled,
}

impl FetchOutcome {
    /// Check if a page was committed
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched { .. })
    }

    /// Check if this call did nothing
    pub fn is_noop(&self) -> bool {
        !self.is_fetched()
    }
}

/// How the next-page cursor from a response is turned into the next request URL
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CursorPolicy {
    /// Use the cursor exactly as the server sent it
    #[default]
    Verbatim,
    /// Keep the cursor's path and query, but send it to this base URL
    Rebase {
        /// Base URL the cursor is re-rooted on
        base_url: String,
    },
}

impl CursorPolicy {
    /// Create a rebasing policy
    pub fn rebase(base_url: impl Into<String>) -> Self {
        Self::Rebase {
            base_url: base_url.into(),
        }
    }

    /// Turn a response's `next_page_url` into the next cursor.
    ///
    /// Empty strings count as the end of the collection.
    pub fn apply(&self, next_page_url: Option<String>) -> Result<Option<String>> {
        let Some(next) = next_page_url.filter(|u| !u.is_empty()) else {
            return Ok(None);
        };

        match self {
            CursorPolicy::Verbatim => Ok(Some(next)),
            CursorPolicy::Rebase { base_url } => {
                // Relative cursors are already resolved against the client base URL
                if !(next.starts_with("http://") || next.starts_with("https://")) {
                    return Ok(Some(next));
                }
                let url = Url::parse(&next)?;
                let mut path_and_query = url.path().to_string();
                if let Some(query) = url.query() {
                    path_and_query.push('?');
                    path_and_query.push_str(query);
                }
                Ok(Some(format!(
                    "{}{}",
                    base_url.trim_end_matches('/'),
                    path_and_query
                )))
            }
        }
    }
}

/// Anything that can fetch one page given its URL
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    /// Fetch the page at `url`
    async fn fetch_page(&self, url: &str) -> Result<Page<T>>;
}
