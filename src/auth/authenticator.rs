//! Authenticator implementation
//!
//! Produces the auth material for the configured strategy. The cookie
//! strategy performs its login request here, once.

use super::types::{AuthConfig, AuthMaterial};
use crate::error::{Error, Result};
use base64::Engine as _;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Authenticator prepares transport auth for the HTTP client
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Build the auth material, logging in first for the cookie strategy
    pub async fn prepare(&self) -> Result<AuthMaterial> {
        match &self.config {
            AuthConfig::None => Ok(AuthMaterial::default()),

            AuthConfig::Basic { username, password } => {
                let mut headers = HeaderMap::new();
                headers.insert(AUTHORIZATION, basic_auth_header(username, password)?);
                Ok(AuthMaterial {
                    headers,
                    cookies: None,
                })
            }

            AuthConfig::Cookie {
                login_url,
                login_method,
                username,
                password,
            } => {
                let jar = self
                    .login(login_url, login_method.clone(), username, password)
                    .await?;
                Ok(AuthMaterial {
                    headers: HeaderMap::new(),
                    cookies: Some(jar),
                })
            }
        }
    }

    /// Log in and capture the session cookies
    async fn login(
        &self,
        login_url: &str,
        login_method: Method,
        username: &str,
        password: &str,
    ) -> Result<Arc<Jar>> {
        let url = Url::parse(login_url)?;
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        debug!("Logging in: {} {}", login_method, url);
        let response = client
            .request(login_method, url.clone())
            .json(&json!({ "name": username, "password": password }))
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth {
                message: format!("Login request failed with status {status}: {body}"),
            });
        }

        if jar.cookies(&url).is_none() {
            return Err(Error::auth("Login response did not set a session cookie"));
        }

        info!("Authenticated as '{}' via {}", username, url);
        Ok(jar)
    }

    /// Get the current auth config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

/// Build a sensitive `Authorization: Basic ...` header value
pub fn basic_auth_header(username: &str, password: &str) -> Result<HeaderValue> {
    let encoded =
        base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))
        .map_err(|e| Error::auth(format!("Invalid basic auth header: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}
