//! Formatter types and traits

use super::formatters::JsonFormatter;
use crate::document::Document;
use crate::error::Result;
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Built-in formatter selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatterKind {
    /// JSON format (default)
    #[default]
    Json,
}

impl FormatterKind {
    /// Instantiate the formatter
    pub fn build(self) -> Arc<dyn Formatter> {
        match self {
            FormatterKind::Json => Arc::new(JsonFormatter::new()),
        }
    }
}

/// Trait for encoding documents and decoding response bodies
pub trait Formatter: Send + Sync {
    /// Value sent in the `Content-Type` request header
    fn content_type(&self) -> &str;

    /// Encode the caller-visible part of a document into a request body
    fn encode(&self, document: &Document) -> Result<String>;

    /// Encode a document for a full-replacement update
    ///
    /// Must carry [`Document::update_members`], otherwise the store drops
    /// attachments and other store-managed members on write.
    fn encode_for_update(&self, document: &Document) -> Result<String>;

    /// Decode a response body into a structured value
    fn decode(&self, body: &str) -> Result<JsonValue>;
}
