// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::needless_pass_by_value)]

//! # couchdb-backend
//!
//! A document-store backend over the CouchDB REST API.
//!
//! ## Features
//!
//! - **Uniform CRUD contract**: find, create, read, update, delete, is_alive
//! - **Pluggable auth**: none, HTTP Basic, session cookie login
//! - **Pluggable wire format**: `Formatter` trait, JSON built in
//! - **Typed or sentinel failures**: `try_*` methods return `Result`, plain
//!   methods degrade to empty/`None`/`false`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use couchdb_backend::{load_configuration, Backend, CouchdbBackend, Document, FindArgs};
//!
//! #[tokio::main]
//! async fn main() -> couchdb_backend::Result<()> {
//!     let backend = CouchdbBackend::new(load_configuration("backend.yaml")?)?;
//!
//!     let created = backend
//!         .try_create("widgets", Document::new().with_field("name", "x"))
//!         .await?;
//!     let ids = backend.find("widgets", &FindArgs::new().with_limit(10)).await;
//!     backend.try_delete("widgets", created.id().unwrap_or_default()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              Backend (CouchdbBackend)                   │
//! │  find  create  read  update  delete  is_alive           │
//! └─────────────────────────────────────────────────────────┘
//!          │                  │                    │
//! ┌────────┴───────┐ ┌────────┴────────┐ ┌─────────┴───────┐
//! │  ClientSession │ │    Formatter    │ │  Configuration  │
//! │  (memoized)    │ │  encode/decode  │ │  base_url, auth │
//! └────────┬───────┘ └─────────────────┘ │  resources      │
//!          │                             └─────────────────┘
//! ┌────────┴───────┐
//! │ Authenticator  │  none | basic | cookie login
//! └────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Document model
pub mod document;

/// Backend configuration and loader
pub mod config;

/// Wire formatters
pub mod format;

/// Authentication strategies
pub mod auth;

/// Memoized HTTP client session
pub mod http;

/// CRUD contract and CouchDB implementation
pub mod backend;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use backend::{Backend, CouchdbBackend, FindArgs};
pub use config::{load_configuration, load_configuration_from_str, BackendConfiguration};
pub use document::Document;
pub use error::{Error, Result};
pub use format::{Formatter, JsonFormatter};
pub use types::AuthenticationMode;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
