//! Storefront API client
//!
//! One method per backend endpoint. Listings come back either as a
//! [`PaginatedCollection`] for incremental paging or as a fully collected
//! `Vec` via the cursor stream.

use super::models::{
    Category, CategoryDetail, Credentials, ImageUpload, LoginContent, NewOrder, NewProduct,
    Order, OrderStatus, Product, ProductUpdate, Registration, SubCategoryDetail,
    SubSubCategoryDetail, Wishlist,
};
use crate::auth::{Session, SessionStore};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::pagination::{
    collect_all, CursorPolicy, HttpPageSource, PageSource, PaginatedCollection,
};
use crate::types::{OptionStringExt, Role};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Typed client for the storefront backend
#[derive(Debug, Clone)]
pub struct StorefrontClient {
    http: HttpClient,
    session: SessionStore,
    cursor_policy: CursorPolicy,
}

impl StorefrontClient {
    /// Create a client with its own HTTP client
    pub fn new(config: HttpClientConfig, session: SessionStore) -> Result<Self> {
        let http = HttpClient::with_session(config, session.clone())?;
        Ok(Self::from_http(http, session))
    }

    /// Wrap an existing HTTP client, attaching the session store to it
    pub fn from_http(mut http: HttpClient, session: SessionStore) -> Self {
        http.set_session(session.clone());
        Self {
            http,
            session,
            cursor_policy: CursorPolicy::Verbatim,
        }
    }

    /// Set how `next_page_url` cursors are followed
    #[must_use]
    pub fn with_cursor_policy(mut self, policy: CursorPolicy) -> Self {
        self.cursor_policy = policy;
        self
    }

    /// The session store
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// The underlying HTTP client
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// The cursor policy applied to listings
    pub fn cursor_policy(&self) -> &CursorPolicy {
        &self.cursor_policy
    }

    fn page_source<T>(&self, authenticated: bool) -> Arc<dyn PageSource<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let source = HttpPageSource::new(self.http.clone());
        if authenticated {
            Arc::new(source.authenticated())
        } else {
            Arc::new(source)
        }
    }

    fn collection<T>(&self, first_url: String, authenticated: bool) -> PaginatedCollection<T>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        PaginatedCollection::new(self.page_source(authenticated), first_url)
            .with_cursor_policy(self.cursor_policy.clone())
    }

    async fn collect<T>(&self, first_url: String, authenticated: bool) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        collect_all(
            self.page_source(authenticated),
            first_url,
            self.cursor_policy.clone(),
        )
        .await
    }

    async fn content<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<T> {
        self.http.request_content(method, path, config).await
    }

    async fn message(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<Option<String>> {
        self.http.request_message(method, path, config).await
    }

    async fn require_seller(&self) -> Result<Session> {
        let session = self.session.require().await?;
        if !session.is_seller() {
            return Err(Error::auth(format!(
                "'{}' is logged in as {}, seller required",
                session.username, session.role
            )));
        }
        Ok(session)
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Public product listing, one page at a time
    pub fn products(&self) -> PaginatedCollection<Product> {
        self.collection("/api/products".to_string(), false)
    }

    /// Every product, following the cursor to the last page
    pub async fn all_products(&self) -> Result<Vec<Product>> {
        self.collect("/api/products".to_string(), false).await
    }

    /// Product detail
    pub async fn product(&self, slug: &str) -> Result<Product> {
        self.content(
            Method::GET,
            &format!("/api/products/{}", encode(slug)),
            RequestConfig::new(),
        )
        .await
        .map_err(|e| not_found_as(e, format!("product '{slug}'")))
    }

    /// Every top-level category
    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.collect("/api/categories".to_string(), false).await
    }

    /// A category with its sub-categories
    pub async fn category(&self, slug: &str) -> Result<CategoryDetail> {
        self.content(
            Method::GET,
            &format!("/api/categories/{}", encode(slug)),
            RequestConfig::new().query("with", "subCategories"),
        )
        .await
        .map_err(|e| not_found_as(e, format!("category '{slug}'")))
    }

    /// A sub-category with its sub-sub-categories
    pub async fn sub_category(&self, slug: &str) -> Result<SubCategoryDetail> {
        self.content(
            Method::GET,
            &format!("/api/sub-categories/{}", encode(slug)),
            RequestConfig::new().query("with", "subSubCategories"),
        )
        .await
        .map_err(|e| not_found_as(e, format!("sub-category '{slug}'")))
    }

    /// A sub-sub-category with its products
    pub async fn sub_sub_category(&self, slug: &str) -> Result<SubSubCategoryDetail> {
        self.content(
            Method::GET,
            &format!("/api/sub-sub-categories/{}", encode(slug)),
            RequestConfig::new(),
        )
        .await
        .map_err(|e| not_found_as(e, format!("sub-sub-category '{slug}'")))
    }

    /// Every sub-sub-category, for picking a product's category
    pub async fn all_sub_sub_categories(&self) -> Result<Vec<Category>> {
        self.collect("/api/sub-sub-categories".to_string(), false)
            .await
    }

    // ========================================================================
    // Account
    // ========================================================================

    /// Create an account. Returns the server's message.
    pub async fn register(&self, registration: &Registration) -> Result<Option<String>> {
        let body = serde_json::to_value(registration)?;
        let message = self
            .message(
                Method::POST,
                "/api/auth/register",
                RequestConfig::new().anonymous().json(body),
            )
            .await?;
        info!("Registered '{}' as {}", registration.username, registration.role);
        Ok(message)
    }

    /// Log in and store the resulting session
    pub async fn login(&self, username: &str, password: &str, role: Role) -> Result<Session> {
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
            role,
        };
        let body = serde_json::to_value(&credentials)?;

        let content: LoginContent = self
            .content(
                Method::POST,
                "/api/auth/login",
                RequestConfig::new().anonymous().json(body),
            )
            .await
            .map_err(|e| match e {
                Error::HttpStatus { status, body } if (400..500).contains(&status) => {
                    Error::auth(body)
                }
                other => other,
            })?;

        let token = content
            .token
            .none_if_empty()
            .ok_or_else(|| Error::auth("login response carried no token"))?;

        let session = Session::new(token, role, username);
        self.session.set(session.clone()).await?;
        info!("Logged in as '{}' ({})", username, role);
        Ok(session)
    }

    /// Log out and drop the stored session.
    ///
    /// A 401 from the server means the token is already dead, so the
    /// session is dropped in that case too.
    pub async fn logout(&self) -> Result<()> {
        let result = self
            .message(
                Method::GET,
                "/api/auth/logout",
                RequestConfig::new().authenticated(),
            )
            .await;

        match result {
            Ok(_) => {}
            Err(e) if e.status() == Some(401) => {
                warn!("Server rejected the session token, clearing it anyway");
            }
            Err(e) => return Err(e),
        }

        self.session.clear().await?;
        info!("Logged out");
        Ok(())
    }

    // ========================================================================
    // Buyer
    // ========================================================================

    /// Products on the user's wishlist
    pub async fn wishlist(&self) -> Result<Vec<Product>> {
        let wishlist: Wishlist = self
            .content(
                Method::GET,
                "/api/user/wishlists",
                RequestConfig::new().authenticated(),
            )
            .await?;
        Ok(wishlist.products)
    }

    /// Add a product to the wishlist
    pub async fn add_to_wishlist(&self, slug: &str) -> Result<Option<String>> {
        self.message(
            Method::POST,
            &format!("/api/user/wishlists/{}", encode(slug)),
            RequestConfig::new().authenticated().json(json!({})),
        )
        .await
    }

    /// Remove a product from the wishlist
    pub async fn remove_from_wishlist(&self, slug: &str) -> Result<Option<String>> {
        self.message(
            Method::DELETE,
            &format!("/api/user/wishlists/{}", encode(slug)),
            RequestConfig::new().authenticated(),
        )
        .await
    }

    /// Place an order. Returns whatever the server puts in `content`.
    pub async fn place_order(&self, order: &NewOrder) -> Result<Value> {
        let body = serde_json::to_value(order)?;
        let content: Option<Value> = self
            .content(
                Method::POST,
                "/api/user/orders",
                RequestConfig::new().authenticated().json(body),
            )
            .await?;
        info!("Ordered {} x '{}'", order.quantity, order.product_slug);
        Ok(content.unwrap_or(Value::Null))
    }

    // ========================================================================
    // Seller
    // ========================================================================

    /// The seller's own products, one page at a time
    pub fn seller_products(&self) -> PaginatedCollection<Product> {
        self.collection("/api/seller/products".to_string(), true)
    }

    /// One of the seller's products
    pub async fn seller_product(&self, slug: &str) -> Result<Product> {
        self.require_seller().await?;
        self.content(
            Method::GET,
            &format!("/api/seller/products/{}", encode(slug)),
            RequestConfig::new().authenticated(),
        )
        .await
        .map_err(|e| not_found_as(e, format!("product '{slug}'")))
    }

    /// Create a product (multipart, with image)
    pub async fn create_product(&self, product: &NewProduct) -> Result<Option<String>> {
        self.require_seller().await?;
        let message = self
            .message(
                Method::POST,
                "/api/seller/products",
                RequestConfig::new()
                    .authenticated()
                    .multipart(product.to_fields()),
            )
            .await?;
        info!("Created product '{}'", product.name);
        Ok(message)
    }

    /// Update a product's fields
    pub async fn update_product(
        &self,
        slug: &str,
        update: &ProductUpdate,
    ) -> Result<Option<String>> {
        self.require_seller().await?;
        let body = serde_json::to_value(update)?;
        self.message(
            Method::PUT,
            &format!("/api/seller/products/{}", encode(slug)),
            RequestConfig::new().authenticated().json(body),
        )
        .await
    }

    /// Delete a product
    pub async fn delete_product(&self, slug: &str) -> Result<Option<String>> {
        self.require_seller().await?;
        let message = self
            .message(
                Method::DELETE,
                &format!("/api/seller/products/{}", encode(slug)),
                RequestConfig::new().authenticated(),
            )
            .await?;
        info!("Deleted product '{slug}'");
        Ok(message)
    }

    /// Replace a product's image
    pub async fn change_product_image(
        &self,
        slug: &str,
        image: &ImageUpload,
    ) -> Result<Option<String>> {
        self.require_seller().await?;
        self.message(
            Method::POST,
            &format!("/api/seller/products/{}/change-image", encode(slug)),
            RequestConfig::new()
                .authenticated()
                .multipart(vec![image.to_field("imageFile")]),
        )
        .await
    }

    /// Orders for the seller's products, optionally filtered by status
    pub fn seller_orders(&self, status: Option<&OrderStatus>) -> PaginatedCollection<Order> {
        let url = match status {
            Some(status) => format!("/api/seller/orders?status={}", encode(status.as_str())),
            None => "/api/seller/orders".to_string(),
        };
        debug!("Seller orders listing at {url}");
        self.collection(url, true)
    }

    /// Move an order to a new status
    pub async fn update_order_status(
        &self,
        order_id: u64,
        status: &OrderStatus,
    ) -> Result<Option<String>> {
        self.require_seller().await?;
        let message = self
            .message(
                Method::PUT,
                &format!("/api/seller/orders/{order_id}"),
                RequestConfig::new()
                    .authenticated()
                    .json(json!({ "status": status.as_str() })),
            )
            .await?;
        info!("Order {order_id} set to '{status}'");
        Ok(message)
    }
}

/// Percent-encode one path segment or query value
fn encode(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn not_found_as(error: Error, what: String) -> Error {
    match error.status() {
        Some(404) => Error::not_found(what),
        _ => error,
    }
}
