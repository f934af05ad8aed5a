//! CLI module
//!
//! Command-line interface for the storefront backend.
//!
//! # Commands
//!
//! - `products`, `product`, `search`, `categories`, `browse` - catalog
//! - `register`, `login`, `logout`, `whoami` - account and session
//! - `wishlist`, `order` - buyer actions
//! - `seller` - product and order management for sellers

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, Paging, SellerAction, WishlistAction};
pub use runner::Runner;
