//! Shared helpers for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use linkshelf::api::{build_router, AppState};
use linkshelf::auth::{CredentialRecord, PasswordHasher, SigningDomain, TokenService, UserStore};
use linkshelf::core::config::ServerConfig;
use linkshelf::core::Result;
use linkshelf::db::{DatabaseManager, UserRepository};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt; // For oneshot method

pub const ACCESS_SECRET: &[u8] = b"integration-access-secret-0123456789";
pub const REFRESH_SECRET: &[u8] = b"integration-refresh-secret-0123456789";

pub fn token_service() -> TokenService {
    TokenService::new(
        SigningDomain::new(ACCESS_SECRET, Duration::minutes(15)),
        SigningDomain::new(REFRESH_SECRET, Duration::days(7)),
    )
}

fn server_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout: 10,
        lookup_timeout_ms: 2000,
    }
}

/// State backed by a fresh in-memory database
pub fn sqlite_state(tokens: TokenService) -> AppState {
    let db = Arc::new(DatabaseManager::new_in_memory().expect("in-memory db"));
    let store: Arc<dyn UserStore> = Arc::new(UserRepository::new(db.clone()));
    state_with_store(db, store, tokens, server_config().lookup_timeout())
}

pub fn state_with_store(
    db: Arc<DatabaseManager>,
    store: Arc<dyn UserStore>,
    tokens: TokenService,
    lookup_timeout: std::time::Duration,
) -> AppState {
    AppState::new(
        db,
        store,
        Arc::new(tokens),
        PasswordHasher::with_cost(4),
        lookup_timeout,
    )
}

pub fn app(state: AppState) -> Router {
    build_router(state, &server_config(), &["*".to_string()])
}

pub fn test_app() -> Router {
    app(sqlite_state(token_service()))
}

/// Store whose lookups never finish in time
pub struct SlowStore {
    pub delay: std::time::Duration,
}

#[async_trait]
impl UserStore for SlowStore {
    async fn find_by_email(&self, _email: &str) -> Result<Option<CredentialRecord>> {
        tokio::time::sleep(self.delay).await;
        Ok(None)
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<CredentialRecord>> {
        tokio::time::sleep(self.delay).await;
        Ok(None)
    }

    async fn create(&self, email: &str, password_hash: &str) -> Result<CredentialRecord> {
        tokio::time::sleep(self.delay).await;
        Ok(CredentialRecord {
            id: "slow".to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        })
    }
}

/// Send one request and return the status plus parsed JSON body (Null if empty)
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    send_request(app, request).await
}

pub async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

pub fn credentials(email: &str, password: &str) -> Value {
    serde_json::json!({ "email": email, "password": password })
}
