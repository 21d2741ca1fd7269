//! Configuration types
//!
//! Declarative backend configuration, deserialized from YAML or JSON or
//! assembled with the `with_*` builder methods.

use crate::error::{Error, Result};
use crate::format::FormatterKind;
use crate::types::{AuthenticationMode, StringMap};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Backend Configuration
// ============================================================================

/// Complete configuration of one backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BackendConfiguration {
    /// Configuration name
    #[serde(default = "default_name")]
    pub name: String,
    /// Plugin settings of the backend itself
    pub backend: BackendSettings,
    /// Authentication mode
    #[serde(default)]
    pub authentication: AuthenticationMode,
    /// Wire formatter
    #[serde(default)]
    pub formatter: FormatterKind,
    /// Per-component settings, keyed by component then setting name
    #[serde(default)]
    pub components: HashMap<String, StringMap>,
    /// Resource schemas keyed by machine name
    #[serde(default)]
    pub resources: HashMap<String, ResourceSchema>,
}

fn default_name() -> String {
    "couchdb".to_string()
}

/// Settings of the backend plugin
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Store root URL, e.g. `http://db.local:5984`
    pub base_url: String,
}

/// A named collection of documents and where it lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSchema {
    /// Endpoint appended to the base URL, e.g. `/widgets`
    pub endpoint: String,
}

impl ResourceSchema {
    /// Create a resource schema for an endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl BackendConfiguration {
    /// Create a configuration with no resources and no authentication
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            name: default_name(),
            backend: BackendSettings {
                base_url: base_url.into(),
            },
            authentication: AuthenticationMode::None,
            formatter: FormatterKind::default(),
            components: HashMap::new(),
            resources: HashMap::new(),
        }
    }

    /// Set the authentication mode
    #[must_use]
    pub fn with_authentication(mut self, mode: AuthenticationMode) -> Self {
        self.authentication = mode;
        self
    }

    /// Set the formatter
    #[must_use]
    pub fn with_formatter(mut self, formatter: FormatterKind) -> Self {
        self.formatter = formatter;
        self
    }

    /// Set a component setting
    #[must_use]
    pub fn with_component_setting(
        mut self,
        component: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.set_component_setting(component, name, value);
        self
    }

    /// Register a resource schema
    #[must_use]
    pub fn with_resource(mut self, schema: impl Into<String>, endpoint: impl Into<String>) -> Self {
        self.resources
            .insert(schema.into(), ResourceSchema::new(endpoint));
        self
    }

    /// Store root URL
    pub fn base_url(&self) -> &str {
        &self.backend.base_url
    }

    /// Get a component setting
    pub fn component_setting(&self, component: &str, name: &str) -> Option<&str> {
        self.components
            .get(component)?
            .get(name)
            .map(String::as_str)
    }

    /// Set a component setting
    pub fn set_component_setting(
        &mut self,
        component: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.components
            .entry(component.into())
            .or_default()
            .insert(name.into(), value.into());
    }

    /// Fail unless the resource schema is known
    pub fn validate_resource_schema(&self, schema: &str) -> Result<()> {
        self.resource_endpoint(schema).map(|_| ())
    }

    /// Endpoint of a resource schema
    pub fn resource_endpoint(&self, schema: &str) -> Result<&str> {
        self.resources
            .get(schema)
            .map(|r| r.endpoint.as_str())
            .ok_or_else(|| Error::unknown_schema(schema))
    }
}
