//! Authentication module
//!
//! Replaces the cookie-held token/role/username with an explicit
//! [`Session`] passed to whoever needs it.
//!
//! The `Authenticator` applies the session's bearer token to requests and
//! the `SessionStore` keeps the session between CLI invocations.

mod authenticator;
mod store;
mod types;

pub use authenticator::{AuthRequirement, Authenticator};
pub use store::SessionStore;
pub use types::{Session, SESSION_LIFETIME_DAYS};
