//! Backend contract types

use crate::document::Document;
use crate::error::Result;
use async_trait::async_trait;
use std::fmt::Display;
use tracing::warn;

/// Page size used by `find` when the caller gives no limit
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Arguments of a `find` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindArgs {
    /// Look up a single document by id first
    pub id: Option<String>,
    /// Maximum number of ids to list
    pub limit: Option<usize>,
}

impl FindArgs {
    /// Create empty arguments (list with the default page size)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the id to look up
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the listing limit
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Uniform document-store CRUD contract
///
/// The `try_*` methods report failures as typed errors. The plain methods
/// degrade every failure to a sentinel (empty list, `None`, `false`) and
/// log the cause, for callers that only check return values.
#[async_trait]
pub trait Backend: Send + Sync {
    /// List document ids, or check a single id for existence
    async fn try_find(&self, resource_schema: &str, args: &FindArgs) -> Result<Vec<String>>;

    /// Create a document; the store assigns its id
    async fn try_create(&self, resource_schema: &str, document: Document) -> Result<Document>;

    /// Read a document by id
    async fn try_read(&self, resource_schema: &str, id: &str) -> Result<Document>;

    /// Replace a document at its current revision
    async fn try_update(&self, resource_schema: &str, document: Document) -> Result<Document>;

    /// Delete a document at its current revision
    async fn try_delete(&self, resource_schema: &str, id: &str) -> Result<()>;

    /// Whether the store answers on its base URL
    async fn is_alive(&self) -> bool;

    /// Store-side identity of a document
    fn backend_content_id(&self, document: &Document) -> Option<String>;

    async fn find(&self, resource_schema: &str, args: &FindArgs) -> Vec<String> {
        degrade("find", self.try_find(resource_schema, args).await).unwrap_or_default()
    }

    async fn create(&self, resource_schema: &str, document: Document) -> Option<Document> {
        degrade("create", self.try_create(resource_schema, document).await)
    }

    async fn read(&self, resource_schema: &str, id: &str) -> Option<Document> {
        degrade("read", self.try_read(resource_schema, id).await)
    }

    async fn update(&self, resource_schema: &str, document: Document) -> Option<Document> {
        degrade("update", self.try_update(resource_schema, document).await)
    }

    async fn delete(&self, resource_schema: &str, id: &str) -> bool {
        degrade("delete", self.try_delete(resource_schema, id).await).is_some()
    }
}

fn degrade<T, E: Display>(operation: &str, result: std::result::Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Backend {} failed: {}", operation, e);
            None
        }
    }
}
