//! Authentication module
//!
//! Supports: none, HTTP Basic, session cookie (CouchDB `_session` login)
//!
//! The `Authenticator` turns an `AuthConfig` into the `AuthMaterial`
//! (default headers and/or a cookie jar) the HTTP client is built with.

mod authenticator;
mod types;

pub use authenticator::{basic_auth_header, Authenticator};
pub use types::{AuthConfig, AuthMaterial};
