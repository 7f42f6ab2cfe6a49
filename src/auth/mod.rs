//! Authentication module
//!
//! This module provides authentication functionality including:
//! - Password hashing and verification
//! - Access and refresh token issuance and validation
//! - The static route policy and the middleware enforcing it
//! - Login, registration and token refresh

pub mod error;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod policy;
pub mod store;

pub use error::AuthError;
pub use handlers::{login, refresh, register};
pub use jwt::{Claims, SigningDomain, TokenKind, TokenPair, TokenService};
pub use middleware::{authenticate, bearer_token, AuthUser};
pub use password::PasswordHasher;
pub use policy::{RoutePolicy, RouteRule, ROUTE_TABLE};
pub use store::{CredentialRecord, UserStore};
