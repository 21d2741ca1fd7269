//! CLI runner - executes commands

use crate::backend::{Backend, CouchdbBackend, FindArgs};
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::load_configuration;
use crate::document::Document;
use crate::error::{Error, Result, ResultExt};
use serde_json::{json, Value};
use std::fs;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let backend = self.backend()?;

        match &self.cli.command {
            Commands::Ping => {
                let alive = backend.is_alive().await;
                self.print(&json!({ "alive": alive }))?;
                if alive {
                    Ok(())
                } else {
                    Err(Error::Other(format!(
                        "Store at {} is not reachable",
                        backend.configuration().base_url()
                    )))
                }
            }
            Commands::Find {
                resource,
                id,
                limit,
            } => {
                let args = FindArgs {
                    id: id.clone(),
                    limit: *limit,
                };
                let ids = backend.try_find(resource, &args).await?;
                self.print(&json!(ids))
            }
            Commands::Read { resource, id } => {
                let doc = backend.try_read(resource, id).await?;
                self.print(&doc.to_value())
            }
            Commands::Create { resource, data } => {
                let doc = backend.try_create(resource, parse_document(data)?).await?;
                self.print(&doc.to_value())
            }
            Commands::Update { resource, data } => {
                let doc = backend.try_update(resource, parse_document(data)?).await?;
                self.print(&doc.to_value())
            }
            Commands::Delete { resource, id } => {
                backend.try_delete(resource, id).await?;
                self.print(&json!({ "ok": true, "id": id }))
            }
        }
    }

    /// Build the backend from the configuration file
    fn backend(&self) -> Result<CouchdbBackend> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("Configuration file not specified (use -C flag)"))?;
        CouchdbBackend::new(load_configuration(path)?)
    }

    fn print(&self, value: &Value) -> Result<()> {
        let out = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{out}");
        Ok(())
    }
}

/// Parse `--data`: inline JSON, or `@path` to a JSON file
fn parse_document(data: &str) -> Result<Document> {
    let content = match data.strip_prefix('@') {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?
        }
        None => data.to_string(),
    };

    let value: Value = serde_json::from_str(&content).context("Invalid document JSON")?;
    Document::from_value(value)
}
