//! Wire format module
//!
//! Supports: JSON
//!
//! # Overview
//!
//! A formatter turns a [`Document`](crate::document::Document) into a request
//! body and a response body back into a structured value. The backend only
//! reaches into a few well-known members of the decoded value.

mod formatters;
mod types;

pub use formatters::JsonFormatter;
pub use types::{Formatter, FormatterKind};
