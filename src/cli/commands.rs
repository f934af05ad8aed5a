//! CLI commands and argument parsing

use crate::types::Role;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Storefront command-line client
#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides config and STOREFRONT_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Session file (overrides config and STOREFRONT_SESSION_FILE)
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List products
    Products {
        #[command(flatten)]
        paging: Paging,
    },

    /// Show one product
    Product {
        /// Product slug
        slug: String,
    },

    /// Suggest products whose name contains the query
    Search {
        /// Search text
        query: String,

        /// Print only the product the query resolves to
        #[arg(long)]
        first: bool,
    },

    /// List top-level categories
    Categories,

    /// Walk the category tree down to products
    Browse {
        /// Category slug
        category: Option<String>,
        /// Sub-category slug
        sub_category: Option<String>,
        /// Sub-sub-category slug
        sub_sub_category: Option<String>,
    },

    /// Create an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "user")]
        role: Role,
    },

    /// Log in and keep the session
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "user")]
        role: Role,
    },

    /// Log out and drop the session
    Logout,

    /// Show the current session
    Whoami,

    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },

    /// Order a product
    Order {
        /// Product slug
        slug: String,

        /// Units to order
        #[arg(short, long, default_value = "1")]
        quantity: u64,
    },

    /// Seller dashboard
    Seller {
        #[command(subcommand)]
        action: SellerAction,
    },
}

/// How much of a listing to fetch
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct Paging {
    /// Follow the cursor to the last page
    #[arg(long, conflicts_with = "pages")]
    pub all: bool,

    /// Number of pages to fetch
    #[arg(long, default_value = "1")]
    pub pages: usize,
}

/// Wishlist subcommands
#[derive(Subcommand, Debug)]
pub enum WishlistAction {
    /// List wishlisted products
    List,
    /// Add a product
    Add {
        /// Product slug
        slug: String,
    },
    /// Remove a product
    Remove {
        /// Product slug
        slug: String,
    },
}

/// Seller subcommands
#[derive(Subcommand, Debug)]
pub enum SellerAction {
    /// List own products
    Products {
        #[command(flatten)]
        paging: Paging,
    },

    /// Show one own product
    Product {
        /// Product slug
        slug: String,
    },

    /// Create a product
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        stock: u64,
        /// Sub-sub-category id
        #[arg(long)]
        category: u64,
        /// Image file
        #[arg(long)]
        image: PathBuf,
    },

    /// Update a product
    Update {
        /// Product slug
        slug: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        stock: u64,
        /// Sub-sub-category id
        #[arg(long)]
        category: u64,
    },

    /// Delete a product
    Delete {
        /// Product slug
        slug: String,
    },

    /// Replace a product's image
    ChangeImage {
        /// Product slug
        slug: String,
        /// Image file
        #[arg(long)]
        image: PathBuf,
    },

    /// List incoming orders
    Orders {
        /// Only orders with this status (pending, "on progress", finished, cancelled)
        #[arg(long)]
        status: Option<String>,

        #[command(flatten)]
        paging: Paging,
    },

    /// Set an order's status
    SetStatus {
        /// Order id
        id: u64,
        /// New status
        status: String,
    },

    /// List sub-sub-categories a product can be filed under
    Categories,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one value per line)
    Json,
    /// Human-readable output
    Pretty,
}
