//! HTTP page source
//!
//! Fetches `{ message, content: { data, next_page_url } }` pages through
//! the crate's `HttpClient`.

use super::types::{Page, PageContent, PageSource};
use crate::auth::AuthRequirement;
use crate::error::Result;
use crate::http::{HttpClient, RequestConfig};
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::marker::PhantomData;
use tracing::debug;

/// `PageSource` backed by the storefront HTTP API
pub struct HttpPageSource<T> {
    client: HttpClient,
    headers: HashMap<String, String>,
    auth: AuthRequirement,
    _item: PhantomData<fn() -> T>,
}

impl<T> HttpPageSource<T> {
    /// Create a page source using the given client
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            headers: HashMap::new(),
            auth: AuthRequirement::Optional,
            _item: PhantomData,
        }
    }

    /// Add a header sent with every page request
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add several headers sent with every page request
    #[must_use]
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Require a logged-in session for every page request
    #[must_use]
    pub fn authenticated(mut self) -> Self {
        self.auth = AuthRequirement::Required;
        self
    }
}

#[async_trait]
impl<T> PageSource<T> for HttpPageSource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(&self, url: &str) -> Result<Page<T>> {
        let mut config = RequestConfig::new().headers(&self.headers);
        config.auth = self.auth;

        let content: PageContent<T> = self
            .client
            .request_content(Method::GET, url, config)
            .await?;

        debug!(
            "Fetched page {} ({} items, more: {})",
            url,
            content.data.len(),
            content.next_page_url.is_some()
        );
        Ok(content.into())
    }
}
