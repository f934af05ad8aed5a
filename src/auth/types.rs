//! Session types
//!
//! The session is the explicit replacement for the role/username/token
//! values the storefront kept in browser cookies.

use crate::types::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifetime of a freshly issued session, in days
pub const SESSION_LIFETIME_DAYS: i64 = 7;

/// An authenticated storefront session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token issued at login
    pub token: String,
    /// Role the user logged in as
    pub role: Role,
    /// Username used at login
    pub username: String,
    /// When the session stops being valid client-side
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a session that expires after the default lifetime
    pub fn new(token: impl Into<String>, role: Role, username: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            role,
            username: username.into(),
            expires_at: Some(Utc::now() + chrono::Duration::days(SESSION_LIFETIME_DAYS)),
        }
    }

    /// Create a session with no client-side expiry
    pub fn without_expiry(token: impl Into<String>, role: Role, username: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            role,
            username: username.into(),
            expires_at: None,
        }
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at,
            None => false,
        }
    }

    /// Check if the session belongs to a seller
    pub fn is_seller(&self) -> bool {
        self.role == Role::Seller
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_session_new_not_expired() {
        let session = Session::new("tok", Role::User, "alice");
        assert!(!session.is_expired());
        assert!(session.expires_at.is_some());
        assert!(!session.is_seller());
    }

    #[test]
    fn test_session_expired() {
        let mut session = Session::new("tok", Role::Seller, "bob");
        session.expires_at = Some(Utc::now() - chrono::Duration::seconds(10));
        assert!(session.is_expired());
        assert!(session.is_seller());
    }

    #[test]
    fn test_session_without_expiry() {
        let session = Session::without_expiry("tok", Role::User, "carol");
        assert!(!session.is_expired());
    }

    #[test]
    fn test_session_deserialize_without_expiry_field() {
        let session: Session =
            serde_json::from_str(r#"{"token":"t","role":"seller","username":"dave"}"#).unwrap();
        assert_eq!(session.role, Role::Seller);
        assert!(session.expires_at.is_none());
    }
}
