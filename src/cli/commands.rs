//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CouchDB backend CLI
#[derive(Parser, Debug)]
#[command(name = "couchdb-backend")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Backend configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the store answers on its base URL
    Ping,

    /// List document ids of a resource
    Find {
        /// Resource schema name
        resource: String,

        /// Check a single id for existence first
        #[arg(long)]
        id: Option<String>,

        /// Maximum number of ids
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Read a document
    Read {
        /// Resource schema name
        resource: String,

        /// Document id
        id: String,
    },

    /// Create a document
    Create {
        /// Resource schema name
        resource: String,

        /// Document JSON, or @path to a JSON file
        #[arg(long)]
        data: String,
    },

    /// Replace a document (the JSON must carry `_id` and `_rev`)
    Update {
        /// Resource schema name
        resource: String,

        /// Document JSON, or @path to a JSON file
        #[arg(long)]
        data: String,
    },

    /// Delete a document at its current revision
    Delete {
        /// Resource schema name
        resource: String,

        /// Document id
        id: String,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Indented JSON
    Pretty,
}
