//! # passage_core
//!
//! Session and credential lifecycle for Passage: token issuance, user
//! reconciliation, and credential storage behind an external identity provider.

pub mod auth;
pub mod migrate;
pub mod models;
pub mod provider;
pub mod session;
pub mod store;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
