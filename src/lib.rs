// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # storefront-sync
//!
//! Async client for a paginated storefront backend: catalog browsing,
//! buyer wishlist and orders, and seller product/order management.
//!
//! ## Features
//!
//! - **Cursor Pagination**: `PaginatedCollection` follows `next_page_url`
//!   with a single in-flight guard, error halting and cancellation
//! - **Explicit Sessions**: bearer token, role and username held in a
//!   `Session`, persisted between CLI runs
//! - **Typed API**: one method per backend endpoint
//! - **Infinite Feed / Search / Category Explorer**: the storefront's
//!   browsing flows, without a UI
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use storefront_sync::{ClientConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ClientConfig::load(None)?.client()?;
//!
//!     // Page through the catalog
//!     let products = client.products();
//!     products.fetch_next().await?;
//!     println!("{} products so far", products.len().await);
//!
//!     // Or take everything at once
//!     let all = products.fetch_all().await?;
//!     println!("{} products", all.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │        CLI          Feed        Search        Explorer       │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//!                      StorefrontClient (api)
//!                                │
//! ┌────────────────┬─────────────┴────────────┬──────────────────┐
//! │   Pagination   │          HTTP            │      Auth        │
//! ├────────────────┼──────────────────────────┼──────────────────┤
//! │ Collection     │ JSON / multipart         │ Session          │
//! │ Cursor stream  │ Retry + backoff          │ SessionStore     │
//! │ Cursor policy  │ Rate limit               │ Bearer token     │
//! └────────────────┴──────────────────────────┴──────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Sessions and request authentication
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Cursor pagination
pub mod pagination;

/// Typed storefront endpoints
pub mod api;

/// Product name search
pub mod search;

/// Infinite-scroll feed
pub mod feed;

/// Category tree browsing
pub mod explorer;

/// Client configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use api::StorefrontClient;
pub use auth::{Session, SessionStore};
pub use config::ClientConfig;
pub use pagination::{FetchOutcome, PaginatedCollection};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
