//! Formatter implementations

use super::types::Formatter;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::types::JsonValue;

/// JSON formatter
///
/// Creates carry only the document fields. Updates also carry store-managed
/// metadata such as `_attachments`; `_id` and `_rev` travel in the URL
/// (`/{id}?rev=...`).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

impl Formatter for JsonFormatter {
    fn content_type(&self) -> &str {
        "application/json"
    }

    fn encode(&self, document: &Document) -> Result<String> {
        serde_json::to_string(document.fields())
            .map_err(|e| Error::encode(format!("Failed to serialize JSON: {e}")))
    }

    fn encode_for_update(&self, document: &Document) -> Result<String> {
        serde_json::to_string(&document.update_members())
            .map_err(|e| Error::encode(format!("Failed to serialize JSON: {e}")))
    }

    fn decode(&self, body: &str) -> Result<JsonValue> {
        serde_json::from_str(body)
            .map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))
    }
}
