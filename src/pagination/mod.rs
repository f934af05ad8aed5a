//! Pagination module
//!
//! Cursor-style pagination: every page response carries the absolute URL
//! of the next page (`next_page_url`), null on the last page.
//!
//! # Overview
//!
//! - [`PaginatedCollection`] - incremental, in-memory collection with a
//!   single in-flight guard, error halting and cancellation
//! - [`pages`] / [`collect_all`] - one-shot cursor-following stream
//! - [`PageSource`] - the seam between paging logic and transport;
//!   [`HttpPageSource`] is the HTTP implementation

mod collection;
mod cursor;
mod source;
mod types;

pub use collection::PaginatedCollection;
pub use cursor::{collect_all, pages, MAX_PAGES};
pub use source::HttpPageSource;
pub use types::{
    CollectionState, CursorPolicy, FetchOutcome, Page, PageContent, PageSource,
};

#[cfg(test)]
pub(crate) mod tests;
