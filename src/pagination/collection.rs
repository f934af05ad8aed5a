//! Paginated collection
//!
//! An in-memory, ordered collection filled one page at a time by following
//! the `next_page_url` cursor. Drives infinite scroll, "load more" and full
//! listings.

use super::types::{CollectionState, CursorPolicy, FetchOutcome, Page, PageSource};
use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Notify, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Mutable part of a collection
#[derive(Debug)]
struct Inner<T> {
    items: Vec<T>,
    cursor: Option<String>,
    state: CollectionState,
    last_error: Option<String>,
    pages_fetched: usize,
}

impl<T> Inner<T> {
    fn fresh(first_url: &str) -> Self {
        Self {
            items: Vec::new(),
            cursor: Some(first_url.to_string()),
            state: CollectionState::Idle,
            last_error: None,
            pages_fetched: 0,
        }
    }
}

/// Clears the in-flight flag when a fetch finishes or its future is dropped
struct InFlight<'a> {
    flag: &'a AtomicBool,
    settled: &'a Notify,
}

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool, settled: &'a Notify) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag, settled })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        self.settled.notify_waiters();
    }
}

/// Cursor-paginated collection.
///
/// - Items only ever grow, in server page order, until [`refresh`](Self::refresh).
/// - At most one page request is in flight; overlapping calls return
///   [`FetchOutcome::Busy`] without touching the network.
/// - A failed page keeps every item already fetched and halts paging until
///   [`resume`](Self::resume) or [`refresh`](Self::refresh).
/// - Cancelling the token drops an in-flight response uncommitted.
pub struct PaginatedCollection<T> {
    source: Arc<dyn PageSource<T>>,
    first_url: String,
    policy: CursorPolicy,
    inner: RwLock<Inner<T>>,
    in_flight: AtomicBool,
    settled: Notify,
    cancel: CancellationToken,
}

impl<T> PaginatedCollection<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an empty collection starting at `first_url`
    pub fn new(source: Arc<dyn PageSource<T>>, first_url: impl Into<String>) -> Self {
        let first_url = first_url.into();
        Self {
            source,
            inner: RwLock::new(Inner::fresh(&first_url)),
            first_url,
            policy: CursorPolicy::Verbatim,
            in_flight: AtomicBool::new(false),
            settled: Notify::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Set how next-page cursors are turned into request URLs
    #[must_use]
    pub fn with_cursor_policy(mut self, policy: CursorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Tie this collection to an owner's lifetime.
    ///
    /// Cancelling `parent` cancels this collection; cancelling the
    /// collection does not affect `parent`.
    #[must_use]
    pub fn with_cancellation(mut self, parent: &CancellationToken) -> Self {
        self.cancel = parent.child_token();
        self
    }

    /// URL of the first page
    pub fn first_url(&self) -> &str {
        &self.first_url
    }

    /// Current state
    pub async fn state(&self) -> CollectionState {
        if self.in_flight.load(Ordering::Acquire) {
            return CollectionState::Fetching;
        }
        self.inner.read().await.state
    }

    /// Check if a page request is in flight
    pub fn is_fetching(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Check if the last page has been fetched
    pub async fn is_exhausted(&self) -> bool {
        self.inner.read().await.state == CollectionState::Exhausted
    }

    /// Snapshot of the items fetched so far
    pub async fn items(&self) -> Vec<T> {
        self.inner.read().await.items.clone()
    }

    /// Number of items fetched so far
    pub async fn len(&self) -> usize {
        self.inner.read().await.items.len()
    }

    /// Check if no items have been fetched
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.items.is_empty()
    }

    /// URL the next `fetch_next` would request
    pub async fn next_page_url(&self) -> Option<String> {
        self.inner.read().await.cursor.clone()
    }

    /// Message of the error that halted paging
    pub async fn last_error(&self) -> Option<String> {
        self.inner.read().await.last_error.clone()
    }

    /// Number of pages committed since creation or the last refresh
    pub async fn pages_fetched(&self) -> usize {
        self.inner.read().await.pages_fetched
    }

    /// The collection's cancellation token
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancel the collection. In-flight and future fetches commit nothing.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Check if the collection was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fetch and append the next page.
    ///
    /// No request is made when a fetch is already in flight, the cursor is
    /// null, paging is halted or the collection is cancelled; the outcome
    /// says which. A failed request marks the collection errored, keeps the
    /// items fetched so far and returns the error.
    pub async fn fetch_next(&self) -> Result<FetchOutcome> {
        if self.cancel.is_cancelled() {
            return Ok(FetchOutcome::Cancelled);
        }

        let Some(_guard) = InFlight::acquire(&self.in_flight, &self.settled) else {
            debug!("Fetch already in flight for {}", self.first_url);
            return Ok(FetchOutcome::Busy);
        };

        let url = {
            let inner = self.inner.read().await;
            match (inner.state, &inner.cursor) {
                (CollectionState::Errored, _) => return Ok(FetchOutcome::Halted),
                (_, None) | (CollectionState::Exhausted, _) => {
                    return Ok(FetchOutcome::Exhausted)
                }
                (_, Some(url)) => url.clone(),
            }
        };

        let result = tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                debug!("Dropping in-flight page {url}: collection cancelled");
                return Ok(FetchOutcome::Cancelled);
            }
            result = self.source.fetch_page(&url) => result,
        };

        match result {
            Ok(page) => self.commit(page).await,
            Err(e) => {
                warn!("Page {url} failed, halting collection: {e}");
                let mut inner = self.inner.write().await;
                inner.state = CollectionState::Errored;
                inner.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Append a fetched page and advance the cursor
    async fn commit(&self, page: Page<T>) -> Result<FetchOutcome> {
        let next = match self.policy.apply(page.next_page_url) {
            Ok(next) => next,
            Err(e) => {
                let mut inner = self.inner.write().await;
                inner.state = CollectionState::Errored;
                inner.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        let mut inner = self.inner.write().await;
        let count = page.items.len();
        inner.items.extend(page.items);
        inner.pages_fetched += 1;
        let exhausted = next.is_none();
        inner.cursor = next;
        inner.state = if exhausted {
            CollectionState::Exhausted
        } else {
            CollectionState::Idle
        };

        debug!(
            "Committed page {} of {} ({} items, exhausted: {})",
            inner.pages_fetched, self.first_url, count, exhausted
        );
        Ok(FetchOutcome::Fetched {
            items: count,
            exhausted,
        })
    }

    /// Fetch pages until the cursor is null and return every item.
    ///
    /// Waits out a fetch started elsewhere instead of duplicating it.
    pub async fn fetch_all(&self) -> Result<Vec<T>> {
        loop {
            let settled = self.settled.notified();
            match self.fetch_next().await? {
                FetchOutcome::Fetched { .. } => {}
                FetchOutcome::Busy => settled.await,
                FetchOutcome::Exhausted => return Ok(self.items().await),
                FetchOutcome::Halted => {
                    let message = self
                        .last_error()
                        .await
                        .unwrap_or_else(|| "previous page failed".to_string());
                    return Err(Error::halted(message));
                }
                FetchOutcome::Cancelled => return Err(Error::Cancelled),
            }
        }
    }

    /// Clear the errored state so the failed page can be requested again.
    ///
    /// Returns false when the collection was not errored.
    pub async fn resume(&self) -> bool {
        let mut inner = self.inner.write().await;
        if inner.state != CollectionState::Errored {
            return false;
        }
        inner.state = if inner.cursor.is_some() {
            CollectionState::Idle
        } else {
            CollectionState::Exhausted
        };
        inner.last_error = None;
        true
    }

    /// Drop every item and start again from the first page.
    ///
    /// Returns false (and changes nothing) while a fetch is in flight.
    pub async fn refresh(&self) -> bool {
        let Some(_guard) = InFlight::acquire(&self.in_flight, &self.settled) else {
            return false;
        };
        let mut inner = self.inner.write().await;
        *inner = Inner::fresh(&self.first_url);
        true
    }
}

impl<T> std::fmt::Debug for PaginatedCollection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatedCollection")
            .field("first_url", &self.first_url)
            .field("policy", &self.policy)
            .field("in_flight", &self.in_flight.load(Ordering::Acquire))
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
