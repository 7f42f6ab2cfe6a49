//! REST API module
//!
//! This module provides the HTTP server and endpoints including:
//! - API routing and request handling
//! - Request tracing middleware
//! - System and user handlers

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

pub use handlers::AppState;
pub use middleware::{trace_id_middleware, TraceId, TRACE_ID_HEADER};
pub use server::{build_router, ApiServer};
