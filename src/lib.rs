//! Linkshelf API Library
//!
//! Stateless bearer-token authentication for the Linkshelf HTTP API:
//! credential verification, access/refresh token issuance and validation,
//! and the middleware that gates every route.

pub mod api;
pub mod auth;
pub mod core;
pub mod db;

// Re-export commonly used types
pub use crate::core::Config;
pub use api::ApiServer;
pub use db::DatabaseManager;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
