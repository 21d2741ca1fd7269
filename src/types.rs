//! Common types used throughout the crate
//!
//! Shared type definitions and aliases used across multiple modules.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

// ============================================================================
// Authentication Mode
// ============================================================================

/// How the backend authenticates against the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationMode {
    /// Anonymous access
    #[default]
    None,
    /// Basic auth credentials on every request
    HttpAuthentication,
    /// Session cookie obtained from a login request
    CookieAuthentication,
}

impl fmt::Display for AuthenticationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthenticationMode::None => "none",
            AuthenticationMode::HttpAuthentication => "http_authentication",
            AuthenticationMode::CookieAuthentication => "cookie_authentication",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Well-known names
// ============================================================================

/// Component whose settings hold the credentials
pub const AUTHENTICATION_HANDLER: &str = "authentication_handler";

/// Document id metadata field
pub const META_ID: &str = "_id";

/// Document revision metadata field
pub const META_REV: &str = "_rev";
