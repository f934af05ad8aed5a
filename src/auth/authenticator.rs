//! Authenticator implementation
//!
//! Applies the session's bearer token to outgoing requests.

use super::store::SessionStore;
use crate::error::{Error, Result};
use reqwest::RequestBuilder;

/// Whether a request needs a logged-in session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthRequirement {
    /// Attach the token if there is one
    #[default]
    Optional,
    /// Fail with `NotLoggedIn` when there is no session
    Required,
    /// Never attach a token
    Anonymous,
}

/// Authenticator handles applying authentication to HTTP requests
#[derive(Debug, Clone)]
pub struct Authenticator {
    store: SessionStore,
}

impl Authenticator {
    /// Create an authenticator reading from the given session store
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// The session store backing this authenticator
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Apply authentication to a request builder
    pub async fn apply(
        &self,
        req: RequestBuilder,
        requirement: AuthRequirement,
    ) -> Result<RequestBuilder> {
        match requirement {
            AuthRequirement::Anonymous => Ok(req),
            AuthRequirement::Optional => match self.store.token().await {
                Some(token) => Ok(req.bearer_auth(token)),
                None => Ok(req),
            },
            AuthRequirement::Required => {
                let token = self.store.token().await.ok_or(Error::NotLoggedIn)?;
                Ok(req.bearer_auth(token))
            }
        }
    }
}
