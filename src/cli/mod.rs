//! CLI module
//!
//! Command-line interface for talking to a configured store.
//!
//! # Commands
//!
//! - `ping` - Check that the store answers
//! - `find` - List document ids of a resource
//! - `read` - Print a document
//! - `create` - Create a document
//! - `update` - Replace a document at its revision
//! - `delete` - Delete a document

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
