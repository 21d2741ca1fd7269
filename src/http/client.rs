//! Lazily built, memoized HTTP client

use crate::auth::{AuthMaterial, Authenticator};
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("couchdb-backend/", env!("CARGO_PKG_VERSION"));

/// Lifecycle state of a client session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// No client built yet
    Unconfigured,
    /// Client built or injected
    Ready,
}

/// One backend instance's HTTP client and the auth state it carries
pub struct ClientSession {
    content_type: String,
    authenticator: Authenticator,
    client: OnceCell<Client>,
}

impl ClientSession {
    /// Create an unconfigured session
    pub fn new(content_type: impl Into<String>, authenticator: Authenticator) -> Self {
        Self {
            content_type: content_type.into(),
            authenticator,
            client: OnceCell::new(),
        }
    }

    /// Change the `Content-Type` used when the client gets built
    ///
    /// Has no effect once the session is ready.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    /// Inject a pre-built client, bypassing header and auth setup
    pub fn set_client(&mut self, client: Client) {
        self.client = OnceCell::new_with(Some(client));
    }

    /// Current lifecycle state
    pub fn state(&self) -> ClientState {
        if self.client.initialized() {
            ClientState::Ready
        } else {
            ClientState::Unconfigured
        }
    }

    /// Get the client, building it on first use
    pub async fn client(&self) -> Result<&Client> {
        self.client.get_or_try_init(|| self.build()).await
    }

    async fn build(&self) -> Result<Client> {
        let mut headers = HeaderMap::new();
        let content_type = HeaderValue::from_str(&self.content_type)
            .map_err(|e| Error::config(format!("Invalid content type: {e}")))?;
        headers.insert(CONTENT_TYPE, content_type);

        // A failed login leaves the session anonymous; it is not retried.
        let material = match self.authenticator.prepare().await {
            Ok(material) => material,
            Err(e) => {
                warn!(
                    "Authentication ({}) failed, continuing unauthenticated: {}",
                    self.authenticator.config().mode(),
                    e
                );
                AuthMaterial::default()
            }
        };
        let anonymous = material.is_empty();
        headers.extend(material.headers);

        let mut builder = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT);
        if let Some(jar) = material.cookies {
            builder = builder.cookie_provider(jar);
        }

        debug!(
            "Built HTTP client (auth: {}, anonymous: {})",
            self.authenticator.config().mode(),
            anonymous
        );
        Ok(builder.build()?)
    }
}

impl std::fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSession")
            .field("content_type", &self.content_type)
            .field("authenticator", &self.authenticator)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
