use super::AppState;
use crate::auth::middleware::AuthUser;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use serde_json::{json, Value};

/// Handler for GET /ping - Authenticated liveness probe
pub async fn ping(user: AuthUser) -> Json<Value> {
    tracing::info!(user_id = %user.user_id, "Ping");
    Json(json!({ "message": "pong" }))
}

/// Handler for GET /health - Service and database health
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (status, database) = match state.db.ping().await {
        Ok(()) => (StatusCode::OK, "up"),
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "down")
        }
    };

    let body = json!({
        "status": if status.is_success() { "ok" } else { "degraded" },
        "database": database,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().timestamp(),
    });

    (status, Json(body))
}

/// Handler for GET /docs - Interactive API reference
pub async fn docs() -> Html<&'static str> {
    Html(DOCS_PAGE)
}

const DOCS_PAGE: &str = r#"<!doctype html>
<html>
  <head>
    <title>Linkshelf API</title>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
  </head>
  <body>
    <script id="api-reference" data-url="/openapi.json"></script>
    <script src="https://cdn.jsdelivr.net/npm/@scalar/api-reference"></script>
  </body>
</html>
"#;

/// Handler for GET /openapi.json - OpenAPI document for the auth surface
pub async fn openapi() -> Json<Value> {
    let tokens = json!({
        "type": "object",
        "required": ["accessToken"],
        "properties": {
            "accessToken": { "type": "string" },
            "refreshToken": { "type": "string" }
        }
    });
    let credentials = json!({
        "type": "object",
        "required": ["email", "password"],
        "properties": {
            "email": { "type": "string", "format": "email" },
            "password": { "type": "string" }
        }
    });
    let bearer = json!([{ "bearerAuth": [] }]);

    Json(json!({
        "openapi": "3.0.3",
        "info": { "title": "Linkshelf API", "version": env!("CARGO_PKG_VERSION") },
        "components": {
            "securitySchemes": {
                "bearerAuth": { "type": "http", "scheme": "bearer", "bearerFormat": "JWT" }
            },
            "schemas": { "AuthTokens": tokens, "Credentials": credentials }
        },
        "paths": {
            "/auth/register": { "post": {
                "summary": "Create an account and return a token pair",
                "requestBody": { "content": { "application/json": {
                    "schema": { "$ref": "#/components/schemas/Credentials" } } } },
                "responses": {
                    "201": { "description": "Registered" },
                    "400": { "description": "Invalid input" },
                    "409": { "description": "Email already registered" }
                }
            }},
            "/auth/login": { "post": {
                "summary": "Exchange credentials for a token pair",
                "requestBody": { "content": { "application/json": {
                    "schema": { "$ref": "#/components/schemas/Credentials" } } } },
                "responses": {
                    "200": { "description": "Authenticated" },
                    "401": { "description": "Invalid email or password" }
                }
            }},
            "/auth/refresh": { "post": {
                "summary": "Exchange a refresh token for a new access token",
                "security": bearer,
                "responses": {
                    "200": { "description": "Refreshed" },
                    "400": { "description": "Missing or malformed Authorization header" },
                    "401": { "description": "Unauthorized" }
                }
            }},
            "/users/me": { "get": {
                "summary": "Current user",
                "security": bearer,
                "responses": { "200": { "description": "OK" }, "401": { "description": "Unauthorized" } }
            }},
            "/ping": { "get": {
                "summary": "Authenticated liveness probe",
                "security": bearer,
                "responses": { "200": { "description": "pong" }, "401": { "description": "Unauthorized" } }
            }},
            "/health": { "get": {
                "summary": "Service health",
                "responses": { "200": { "description": "Healthy" }, "503": { "description": "Degraded" } }
            }}
        }
    }))
}
