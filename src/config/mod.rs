//! Backend configuration module
//!
//! # Overview
//!
//! The config module provides:
//! - `BackendConfiguration` - base URL, auth mode, component settings, resources
//! - `ResourceSchema` - endpoint of a named document collection
//! - YAML/JSON loading with validation

mod loader;
mod types;

pub use loader::{load_configuration, load_configuration_from_str, validate_configuration};
pub use types::{BackendConfiguration, BackendSettings, ResourceSchema};
