//! Auth configuration types
//!
//! These types represent the runtime auth configuration resolved from the
//! backend configuration's `authentication_handler` component settings.

use crate::config::BackendConfiguration;
use crate::error::{Error, Result};
use crate::types::{AuthenticationMode, AUTHENTICATION_HANDLER};
use reqwest::cookie::Jar;
use reqwest::header::HeaderMap;
use reqwest::Method;
use std::fmt;
use std::sync::Arc;

/// Authentication configuration
#[derive(Clone, Default)]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// HTTP Basic authentication
    Basic {
        /// Username
        username: String,
        /// Password
        password: String,
    },

    /// Session cookie obtained from a login endpoint
    Cookie {
        /// Login endpoint URL
        login_url: String,
        /// HTTP method for login (POST by default)
        login_method: Method,
        /// Username
        username: String,
        /// Password
        password: String,
    },
}

impl AuthConfig {
    /// Resolve the strategy selected by a backend configuration
    pub fn from_configuration(config: &BackendConfiguration) -> Result<Self> {
        let setting = |name: &str| {
            config
                .component_setting(AUTHENTICATION_HANDLER, name)
                .unwrap_or_default()
                .to_string()
        };

        match config.authentication {
            AuthenticationMode::None => Ok(Self::None),
            AuthenticationMode::HttpAuthentication => Ok(Self::Basic {
                username: setting("username"),
                password: setting("password"),
            }),
            AuthenticationMode::CookieAuthentication => {
                let login_path = setting("loginpath");
                if login_path.is_empty() {
                    return Err(Error::missing_field(format!(
                        "components.{AUTHENTICATION_HANDLER}.loginpath"
                    )));
                }

                let login_method = match config.component_setting(AUTHENTICATION_HANDLER, "loginmethod")
                {
                    Some(m) => Method::from_bytes(m.to_uppercase().as_bytes())
                        .map_err(|e| Error::config(format!("Invalid login method '{m}': {e}")))?,
                    None => Method::POST,
                };

                Ok(Self::Cookie {
                    login_url: format!("{}{}", config.base_url(), login_path),
                    login_method,
                    username: setting("username"),
                    password: setting("password"),
                })
            }
        }
    }

    /// Mode this strategy implements
    pub fn mode(&self) -> AuthenticationMode {
        match self {
            AuthConfig::None => AuthenticationMode::None,
            AuthConfig::Basic { .. } => AuthenticationMode::HttpAuthentication,
            AuthConfig::Cookie { .. } => AuthenticationMode::CookieAuthentication,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthConfig::None => f.write_str("None"),
            AuthConfig::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
            AuthConfig::Cookie {
                login_url,
                login_method,
                username,
                ..
            } => f
                .debug_struct("Cookie")
                .field("login_url", login_url)
                .field("login_method", login_method)
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

/// Transport-level auth state the HTTP client is built with
#[derive(Debug, Clone, Default)]
pub struct AuthMaterial {
    /// Headers sent with every request
    pub headers: HeaderMap,
    /// Session cookies captured during login
    pub cookies: Option<Arc<Jar>>,
}

impl AuthMaterial {
    /// True when nothing would be attached to requests
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.cookies.is_none()
    }
}
