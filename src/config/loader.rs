//! Configuration loader
//!
//! Parses and validates backend configuration files. Files ending in
//! `.json` are read as JSON, everything else as YAML.

use super::types::BackendConfiguration;
use crate::error::{Error, Result};
use crate::types::{AuthenticationMode, AUTHENTICATION_HANDLER};
use std::fs;
use std::path::Path;
use url::Url;

/// Load a backend configuration from a file
pub fn load_configuration(path: impl AsRef<Path>) -> Result<BackendConfiguration> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!(
                "Failed to read configuration file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let config: BackendConfiguration = if is_json {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };

    validate_configuration(&config)?;
    Ok(config)
}

/// Load a backend configuration from a YAML string
pub fn load_configuration_from_str(yaml: &str) -> Result<BackendConfiguration> {
    let config: BackendConfiguration = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse configuration YAML: {e}")))?;

    validate_configuration(&config)?;
    Ok(config)
}

/// Validate a backend configuration
pub fn validate_configuration(config: &BackendConfiguration) -> Result<()> {
    if config.base_url().is_empty() {
        return Err(Error::missing_field("backend.base_url"));
    }

    let url = Url::parse(config.base_url())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::config(format!(
            "Unsupported base_url scheme '{}'",
            url.scheme()
        )));
    }

    for (name, resource) in &config.resources {
        if name.is_empty() {
            return Err(Error::config("Resource schema name cannot be empty"));
        }
        if resource.endpoint.is_empty() {
            return Err(Error::config(format!(
                "Resource schema '{name}' endpoint cannot be empty"
            )));
        }
    }

    if config.authentication == AuthenticationMode::CookieAuthentication
        && config
            .component_setting(AUTHENTICATION_HANDLER, "loginpath")
            .map_or(true, str::is_empty)
    {
        return Err(Error::missing_field(format!(
            "components.{AUTHENTICATION_HANDLER}.loginpath"
        )));
    }

    Ok(())
}
