//! Infinite-scroll product feed
//!
//! Drives a [`PaginatedCollection`] from scroll positions: the first page
//! loads up front, later pages load when the viewport nears the bottom.

use crate::error::Result;
use crate::pagination::{FetchOutcome, PaginatedCollection};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Distance from the bottom, in pixels, at which the next page loads
pub const DEFAULT_THRESHOLD: f64 = 100.0;

/// Scroll geometry of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollPosition {
    /// Pixels scrolled from the top
    pub scroll_top: f64,
    /// Visible height
    pub client_height: f64,
    /// Total scrollable height
    pub scroll_height: f64,
}

impl ScrollPosition {
    /// Create a scroll position
    pub fn new(scroll_top: f64, client_height: f64, scroll_height: f64) -> Self {
        Self {
            scroll_top,
            client_height,
            scroll_height,
        }
    }

    /// Check if the bottom of the viewport is within `threshold` of the end
    pub fn near_bottom(&self, threshold: f64) -> bool {
        self.scroll_top + self.client_height >= self.scroll_height - threshold
    }
}

/// Feed that loads pages as the user scrolls
#[derive(Debug)]
pub struct InfiniteFeed<T> {
    collection: PaginatedCollection<T>,
    threshold: f64,
    load_more_count: AtomicUsize,
}

impl<T> InfiniteFeed<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wrap a collection with the default threshold
    pub fn new(collection: PaginatedCollection<T>) -> Self {
        Self {
            collection,
            threshold: DEFAULT_THRESHOLD,
            load_more_count: AtomicUsize::new(0),
        }
    }

    /// Set the bottom distance that triggers a load
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// The underlying collection
    pub fn collection(&self) -> &PaginatedCollection<T> {
        &self.collection
    }

    /// Items loaded so far
    pub async fn items(&self) -> Vec<T> {
        self.collection.items().await
    }

    /// Number of load-more triggers that appended a page
    pub fn load_more_count(&self) -> usize {
        self.load_more_count.load(Ordering::Acquire)
    }

    /// Load the first page. Not counted as a load-more.
    pub async fn load_initial(&self) -> Result<FetchOutcome> {
        self.collection.fetch_next().await
    }

    /// React to a scroll event.
    ///
    /// Returns `None` when the position is not near the bottom or a page is
    /// already loading.
    pub async fn on_scroll(&self, position: ScrollPosition) -> Result<Option<FetchOutcome>> {
        if !position.near_bottom(self.threshold) || self.collection.is_fetching() {
            return Ok(None);
        }
        self.load_more().await.map(Some)
    }

    /// Load the next page regardless of scroll position
    pub async fn load_more(&self) -> Result<FetchOutcome> {
        let outcome = self.collection.fetch_next().await?;
        if outcome.is_fetched() {
            let count = self.load_more_count.fetch_add(1, Ordering::AcqRel) + 1;
            debug!("Load-more #{count}: {outcome:?}");
        }
        Ok(outcome)
    }
}
