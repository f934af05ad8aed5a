//! Product name search
//!
//! The storefront has no search endpoint: the navbar loads every product
//! once and filters names locally.

use crate::api::{Product, StorefrontClient};
use crate::error::Result;
use tracing::debug;

/// Most suggestions shown for one query
pub const MAX_SUGGESTIONS: usize = 5;

/// In-memory index over product names
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    products: Vec<Product>,
    lowered: Vec<String>,
}

impl SearchIndex {
    /// Build an index over the given products
    pub fn new(products: Vec<Product>) -> Self {
        let lowered = products.iter().map(|p| p.name.to_lowercase()).collect();
        Self { products, lowered }
    }

    /// Load every product and index it
    pub async fn load(client: &StorefrontClient) -> Result<Self> {
        let products = client.all_products().await?;
        debug!("Indexed {} products for search", products.len());
        Ok(Self::new(products))
    }

    /// Number of indexed products
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if nothing is indexed
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Products whose name contains `query`, ignoring case, in listing
    /// order and capped at [`MAX_SUGGESTIONS`]
    ///
    /// The query is matched as typed, surrounding whitespace included.
    pub fn suggest(&self, query: &str) -> Vec<&Product> {
        let needle = query.to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.lowered
            .iter()
            .zip(&self.products)
            .filter(|(name, _)| name.contains(&needle))
            .map(|(_, product)| product)
            .take(MAX_SUGGESTIONS)
            .collect()
    }

    /// The product a submitted query resolves to, after trimming it
    pub fn submit(&self, query: &str) -> Option<&Product> {
        self.suggest(query.trim()).into_iter().next()
    }
}
