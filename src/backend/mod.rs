//! Backend module
//!
//! The uniform document-store contract (`Backend`) and its CouchDB
//! implementation.
//!
//! # Operations
//!
//! | Operation | Request                                   | Success |
//! |-----------|-------------------------------------------|---------|
//! | find      | `GET {resource}/_all_docs?limit=N`        | 200     |
//! | create    | `POST {resource}`                         | 201     |
//! | read      | `GET {resource}/{id}`                     | 200     |
//! | update    | `PUT {resource}/{id}?rev={rev}`           | 201/202 |
//! | delete    | `GET` then `DELETE {resource}/{id}?rev=…` | 200     |
//! | is_alive  | `GET {base_url}`                          | 200     |

mod couchdb;
mod types;

pub use couchdb::CouchdbBackend;
pub use types::{Backend, FindArgs, DEFAULT_PAGE_SIZE};

#[cfg(test)]
mod tests;
