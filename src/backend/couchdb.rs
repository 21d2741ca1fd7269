//! CouchDB REST backend
//!
//! Maps each backend operation onto one CouchDB HTTP exchange (two for
//! `delete`, which reads the current revision first) and interprets the
//! status code and body.

use super::types::{Backend, FindArgs, DEFAULT_PAGE_SIZE};
use crate::auth::{AuthConfig, Authenticator};
use crate::config::BackendConfiguration;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::format::Formatter;
use crate::http::{ClientSession, ClientState};
use crate::types::{JsonValue, META_ID, META_REV};
use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Backend talking to a CouchDB-compatible store
///
/// Each instance owns its HTTP client and auth state; instances are not
/// meant to be shared or cloned.
pub struct CouchdbBackend {
    configuration: BackendConfiguration,
    formatter: Arc<dyn Formatter>,
    session: ClientSession,
    page_size: usize,
}

impl CouchdbBackend {
    /// Create a backend from its configuration
    ///
    /// Nothing is sent until the first operation.
    pub fn new(configuration: BackendConfiguration) -> Result<Self> {
        let formatter = configuration.formatter.build();
        let authenticator = Authenticator::new(AuthConfig::from_configuration(&configuration)?);
        let session = ClientSession::new(formatter.content_type(), authenticator);

        Ok(Self {
            configuration,
            formatter,
            session,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Use a custom formatter
    #[must_use]
    pub fn with_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.session.set_content_type(formatter.content_type());
        self.formatter = formatter;
        self
    }

    /// Change the default `find` page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Inject a pre-built HTTP client
    pub fn set_client(&mut self, client: Client) -> &mut Self {
        self.session.set_client(client);
        self
    }

    /// Get the HTTP client, building it (and logging in) on first use
    pub async fn client(&self) -> Result<&Client> {
        self.session.client().await
    }

    /// Lifecycle state of the HTTP client
    pub fn client_state(&self) -> ClientState {
        self.session.state()
    }

    /// The configuration this backend was built with
    pub fn configuration(&self) -> &BackendConfiguration {
        &self.configuration
    }

    /// Full URI of a resource schema's collection
    pub fn resource_uri(&self, resource_schema: &str) -> Result<String> {
        let endpoint = self.configuration.resource_endpoint(resource_schema)?;
        Ok(format!("{}{}", self.configuration.base_url(), endpoint))
    }

    /// Decode a response body with the formatter
    pub async fn response_data(&self, response: Response) -> Result<JsonValue> {
        let body = response.text().await?;
        self.formatter.decode(&body)
    }

    /// Resource URI with extra path segments appended
    fn resource_url(&self, resource_schema: &str, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.resource_uri(resource_schema)?)?;
        url.path_segments_mut()
            .map_err(|()| Error::config("backend.base_url cannot be a base URL"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute(&self, method: Method, url: Url, body: Option<String>) -> Result<Response> {
        let client = self.client().await?;

        debug!("{} {}", method, url);
        let mut request = client.request(method, url);
        if let Some(body) = body {
            request = request.body(body);
        }

        Ok(request.send().await?)
    }
}

/// Pass the response through if its status is one of `expected`
async fn expect_status(response: Response, expected: &[StatusCode]) -> Result<Response> {
    let status = response.status();
    if expected.contains(&status) {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(Error::http_status(status.as_u16(), body))
}

/// Extract `{id, rev}` from a write response
fn id_and_rev(data: &JsonValue) -> Result<(String, String)> {
    let member = |name: &str| {
        data.get(name)
            .and_then(JsonValue::as_str)
            .map(String::from)
            .ok_or_else(|| Error::decode(format!("Response is missing '{name}'")))
    };
    Ok((member("id")?, member("rev")?))
}

#[async_trait]
impl Backend for CouchdbBackend {
    async fn try_find(&self, resource_schema: &str, args: &FindArgs) -> Result<Vec<String>> {
        self.configuration.validate_resource_schema(resource_schema)?;

        if let Some(id) = args.id.as_deref() {
            match self.try_read(resource_schema, id).await {
                Ok(_) => return Ok(vec![id.to_string()]),
                Err(e) => debug!("Lookup of '{}' failed, listing instead: {}", id, e),
            }
        }

        let limit = args.limit.unwrap_or(self.page_size);
        let mut url = self.resource_url(resource_schema, &["_all_docs"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());

        let response = self.execute(Method::GET, url, None).await?;
        let response = expect_status(response, &[StatusCode::OK]).await?;
        let data = self.response_data(response).await?;

        let rows = data
            .get("rows")
            .and_then(JsonValue::as_array)
            .ok_or_else(|| Error::decode("Response has no 'rows' array"))?;

        rows.iter()
            .map(|row| {
                row.get("id")
                    .and_then(JsonValue::as_str)
                    .map(String::from)
                    .ok_or_else(|| Error::decode("Row is missing 'id'"))
            })
            .collect()
    }

    async fn try_create(&self, resource_schema: &str, mut document: Document) -> Result<Document> {
        self.configuration.validate_resource_schema(resource_schema)?;

        let url = Url::parse(&self.resource_uri(resource_schema)?)?;
        document.delete_metadata(META_ID);
        let body = self.formatter.encode(&document)?;

        let response = self.execute(Method::POST, url, Some(body)).await?;
        let response = expect_status(response, &[StatusCode::CREATED]).await?;
        let (id, rev) = id_and_rev(&self.response_data(response).await?)?;

        let mut created = Document::from_fields(document.fields().clone());
        created.set_metadata(META_ID, id);
        created.set_metadata(META_REV, rev);
        Ok(created)
    }

    async fn try_read(&self, resource_schema: &str, id: &str) -> Result<Document> {
        self.configuration.validate_resource_schema(resource_schema)?;

        let url = self.resource_url(resource_schema, &[id])?;
        let response = self.execute(Method::GET, url, None).await?;
        let response = expect_status(response, &[StatusCode::OK]).await?;

        Document::from_value(self.response_data(response).await?)
    }

    async fn try_update(&self, resource_schema: &str, mut document: Document) -> Result<Document> {
        self.configuration.validate_resource_schema(resource_schema)?;

        let id = document
            .id()
            .ok_or_else(|| Error::missing_metadata(META_ID))?
            .to_string();
        let rev = document
            .rev()
            .ok_or_else(|| Error::missing_metadata(META_REV))?
            .to_string();

        let mut url = self.resource_url(resource_schema, &[id.as_str()])?;
        url.query_pairs_mut().append_pair("rev", &rev);
        let body = self.formatter.encode_for_update(&document)?;

        let response = self.execute(Method::PUT, url, Some(body)).await?;
        let response =
            expect_status(response, &[StatusCode::CREATED, StatusCode::ACCEPTED]).await?;
        let (_, new_rev) = id_and_rev(&self.response_data(response).await?)?;

        document.set_metadata(META_REV, new_rev);
        Ok(document)
    }

    async fn try_delete(&self, resource_schema: &str, id: &str) -> Result<()> {
        self.configuration.validate_resource_schema(resource_schema)?;

        let current = self.try_read(resource_schema, id).await?;
        let rev = current
            .rev()
            .ok_or_else(|| Error::missing_metadata(META_REV))?;

        let mut url = self.resource_url(resource_schema, &[id])?;
        url.query_pairs_mut().append_pair("rev", rev);

        let response = self.execute(Method::DELETE, url, None).await?;
        expect_status(response, &[StatusCode::OK]).await?;
        Ok(())
    }

    async fn is_alive(&self) -> bool {
        let url = match Url::parse(self.configuration.base_url()) {
            Ok(url) => url,
            Err(e) => {
                warn!("Invalid base URL: {}", e);
                return false;
            }
        };

        match self.execute(Method::GET, url, None).await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                warn!("Store is not reachable: {}", e);
                false
            }
        }
    }

    fn backend_content_id(&self, document: &Document) -> Option<String> {
        document.id().map(String::from)
    }
}

impl std::fmt::Debug for CouchdbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CouchdbBackend")
            .field("base_url", &self.configuration.base_url())
            .field("content_type", &self.formatter.content_type())
            .field("session", &self.session)
            .field("page_size", &self.page_size)
            .finish()
    }
}
