//! Document model
//!
//! A document is a set of caller-visible fields plus a metadata namespace
//! for store-managed members (`_id`, `_rev`, `_attachments`, ...).
//! Members whose name starts with `_` are metadata.

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, META_ID, META_REV};

/// A document exchanged with the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: JsonObject,
    metadata: JsonObject,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from caller fields only
    ///
    /// Underscore-prefixed members are still routed to metadata.
    pub fn from_fields(fields: JsonObject) -> Self {
        let mut doc = Self::new();
        for (key, value) in fields {
            doc.insert(key, value);
        }
        doc
    }

    /// Build a document from a decoded response body
    pub fn from_value(value: JsonValue) -> Result<Self> {
        match value {
            JsonValue::Object(map) => Ok(Self::from_fields(map)),
            other => Err(Error::decode(format!(
                "Expected a JSON object for a document, got: {other}"
            ))),
        }
    }

    fn insert(&mut self, key: String, value: JsonValue) {
        if is_metadata_key(&key) {
            self.metadata.insert(key, value);
        } else {
            self.fields.insert(key, value);
        }
    }

    /// Set a field, builder style
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.set_field(name, value);
        self
    }

    /// Set a metadata member, builder style
    #[must_use]
    pub fn with_metadata(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.set_metadata(name, value);
        self
    }

    /// Get a field value
    pub fn field(&self, name: &str) -> Option<&JsonValue> {
        self.fields.get(name)
    }

    /// Set a field value
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Remove a field, returning its previous value
    pub fn remove_field(&mut self, name: &str) -> Option<JsonValue> {
        self.fields.remove(name)
    }

    /// All caller-visible fields
    pub fn fields(&self) -> &JsonObject {
        &self.fields
    }

    /// Get a metadata member
    pub fn metadata(&self, name: &str) -> Option<&JsonValue> {
        self.metadata.get(name)
    }

    /// Set a metadata member
    pub fn set_metadata(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) {
        self.metadata.insert(name.into(), value.into());
    }

    /// Remove a metadata member, returning its previous value
    pub fn delete_metadata(&mut self, name: &str) -> Option<JsonValue> {
        self.metadata.remove(name)
    }

    /// All metadata members
    pub fn metadata_map(&self) -> &JsonObject {
        &self.metadata
    }

    /// Store-assigned document id
    pub fn id(&self) -> Option<&str> {
        self.metadata.get(META_ID).and_then(JsonValue::as_str)
    }

    /// Current revision token
    pub fn rev(&self) -> Option<&str> {
        self.metadata.get(META_REV).and_then(JsonValue::as_str)
    }

    /// Members a full-replacement write must carry
    ///
    /// Fields plus every metadata member except `_id` and `_rev`, which
    /// travel in the URL. Keeps `_attachments` and friends alive across a
    /// read-modify-update cycle.
    pub fn update_members(&self) -> JsonObject {
        let mut members: JsonObject = self
            .metadata
            .iter()
            .filter(|(key, _)| key.as_str() != META_ID && key.as_str() != META_REV)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        members.extend(self.fields.clone());
        members
    }

    /// Merged view of metadata and fields, as the store would hold it
    pub fn to_value(&self) -> JsonValue {
        let mut merged = self.metadata.clone();
        merged.extend(self.fields.clone());
        JsonValue::Object(merged)
    }
}

fn is_metadata_key(key: &str) -> bool {
    key.starts_with('_')
}
