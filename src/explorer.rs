//! Category explorer
//!
//! Walks the three-level category tree down to products:
//! category -> sub-category -> sub-sub-category -> products.

use crate::api::{Category, Product, StorefrontClient};
use crate::error::Result;
use serde::Serialize;

/// One level of the category tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "level", content = "items", rename_all = "snake_case")]
pub enum Listing {
    /// Top-level categories
    Categories(Vec<Category>),
    /// Children of a category
    SubCategories(Vec<Category>),
    /// Children of a sub-category
    SubSubCategories(Vec<Category>),
    /// Products of a sub-sub-category
    Products(Vec<Product>),
}

impl Listing {
    /// Number of entries at this level
    pub fn len(&self) -> usize {
        match self {
            Listing::Categories(c) | Listing::SubCategories(c) | Listing::SubSubCategories(c) => {
                c.len()
            }
            Listing::Products(p) => p.len(),
        }
    }

    /// Check if the level has no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Browses categories through a storefront client
#[derive(Debug, Clone)]
pub struct CategoryExplorer {
    client: StorefrontClient,
}

impl CategoryExplorer {
    /// Create an explorer
    pub fn new(client: StorefrontClient) -> Self {
        Self { client }
    }

    /// Top-level categories
    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.client.categories().await
    }

    /// Sub-categories of a category
    pub async fn sub_categories(&self, category: &str) -> Result<Vec<Category>> {
        Ok(self.client.category(category).await?.sub_categories)
    }

    /// Sub-sub-categories of a sub-category
    pub async fn sub_sub_categories(&self, sub_category: &str) -> Result<Vec<Category>> {
        Ok(self
            .client
            .sub_category(sub_category)
            .await?
            .sub_sub_categories)
    }

    /// Products filed under a sub-sub-category
    pub async fn products(&self, sub_sub_category: &str) -> Result<Vec<Product>> {
        Ok(self.client.sub_sub_category(sub_sub_category).await?.products())
    }

    /// List the deepest level named by the given path.
    ///
    /// `browse(None, ..)` lists categories, `browse(Some(c), None, ..)` its
    /// sub-categories, and so on. Only the last given slug is requested.
    pub async fn browse(
        &self,
        category: Option<&str>,
        sub_category: Option<&str>,
        sub_sub_category: Option<&str>,
    ) -> Result<Listing> {
        if let Some(slug) = sub_sub_category {
            return Ok(Listing::Products(self.products(slug).await?));
        }
        if let Some(slug) = sub_category {
            return Ok(Listing::SubSubCategories(self.sub_sub_categories(slug).await?));
        }
        if let Some(slug) = category {
            return Ok(Listing::SubCategories(self.sub_categories(slug).await?));
        }
        Ok(Listing::Categories(self.categories().await?))
    }
}
