//! HTTP client module
//!
//! Builds and memoizes the one HTTP client a backend instance talks to the
//! store with.
//!
//! # Lifecycle
//!
//! - **Unconfigured**: nothing built yet
//! - **Ready**: client built on first use (running the auth strategy) or
//!   injected with `set_client`
//!
//! There is no way back to Unconfigured; configuration changes after the
//! first request have no effect on an existing session.

mod client;

pub use client::{ClientSession, ClientState, USER_AGENT};
