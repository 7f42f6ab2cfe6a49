//! Authentication API handlers

use crate::api::handlers::AppState;
use crate::auth::error::AuthError;
use crate::auth::jwt::TokenKind;
use crate::auth::middleware::bearer_token;
use crate::auth::models::{AuthTokens, LoginRequest, RegisterRequest};
use crate::auth::store::bounded;
use crate::core::error::{Result, ShelfError};
use axum::{extract::State, http::HeaderMap, http::StatusCode, response::IntoResponse, Json};

/// Handler for POST /auth/register - User registration
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let req = req.normalize()?;

    let password_hash = state.hasher.hash_blocking(req.password).await?;

    let user = bounded(
        state.lookup_timeout,
        "create_user",
        state.user_store.create(&req.email, &password_hash),
    )
    .await?;

    let tokens = state.tokens.issue_pair(&user.id)?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(AuthTokens::from(tokens))))
}

/// Handler for POST /auth/login - User login
///
/// An unknown email and a wrong password produce the same response and
/// cost the same bcrypt work.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthTokens>> {
    let req = req.normalize()?;

    let record = bounded(
        state.lookup_timeout,
        "find_user_by_email",
        state.user_store.find_by_email(&req.email),
    )
    .await?;

    let record = match record {
        Some(record) => record,
        None => {
            state.hasher.verify_dummy(req.password).await?;
            tracing::debug!(kind = AuthError::InvalidCredentials.kind(), "Login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let valid = state
        .hasher
        .verify_blocking(req.password, record.password_hash)
        .await?;
    if !valid {
        tracing::debug!(
            kind = AuthError::InvalidCredentials.kind(),
            user_id = %record.id,
            "Login rejected"
        );
        return Err(AuthError::InvalidCredentials.into());
    }

    let tokens = state.tokens.issue_pair(&record.id)?;

    tracing::info!(user_id = %record.id, "Login successful");

    Ok(Json(tokens.into()))
}

/// Handler for POST /auth/refresh - Exchange a refresh token
///
/// The refresh token travels in the `Authorization` header; the body is
/// ignored. Returns a new access token, plus a new refresh token when
/// rotation is enabled.
pub async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<AuthTokens>> {
    let token = bearer_token(&headers).map_err(reject)?;
    let claims = state
        .tokens
        .validate(token, TokenKind::Refresh)
        .map_err(reject)?;

    let record = bounded(
        state.lookup_timeout,
        "find_user_by_id",
        state.user_store.find_by_id(&claims.user_id),
    )
    .await?
    .ok_or_else(|| reject(AuthError::SubjectNotFound))?;

    let tokens = if state.tokens.rotates_refresh_tokens() {
        AuthTokens::from(state.tokens.issue_pair(&record.id)?)
    } else {
        AuthTokens::access_only(state.tokens.issue(&record.id, TokenKind::Access)?)
    };

    tracing::info!(user_id = %record.id, "Access token refreshed");

    Ok(Json(tokens))
}

fn reject(error: AuthError) -> ShelfError {
    tracing::debug!(kind = error.kind(), "Refresh rejected");
    error.into()
}
