//! API routes

use crate::api::handlers::{docs, get_me, health_check, openapi, ping, AppState};
use crate::auth::handlers::{login, refresh, register};
use crate::auth::middleware::authenticate;
use crate::core::error::ShelfError;
use axum::{
    http::Uri,
    middleware,
    routing::{get, post},
    Router,
};

/// Build the API routes.
///
/// Which of these need a token is decided by the route policy in the auth
/// middleware, which wraps every route and the fallback.
pub fn build_api_routes(state: AppState) -> Router {
    Router::new()
        // System
        .route("/health", get(health_check))
        .route("/docs", get(docs))
        .route("/openapi.json", get(openapi))
        .route("/ping", get(ping))
        // Auth flows
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/refresh", post(refresh))
        // Users
        .route("/users/me", get(get_me))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .with_state(state)
}

async fn not_found(uri: Uri) -> ShelfError {
    ShelfError::NotFound(uri.path().to_string())
}
