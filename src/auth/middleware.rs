//! Authentication middleware

use crate::api::handlers::AppState;
use crate::auth::error::AuthError;
use crate::auth::jwt::{Claims, TokenKind, TokenService};
use crate::core::error::ShelfError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Scheme prefix of the `Authorization` header, matched exactly
pub const BEARER_PREFIX: &str = "Bearer ";

/// Verified identity of the caller, attached to the request by [`authenticate`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// A missing header, a non-ASCII value, or any other scheme is a
/// [`AuthError::MalformedAuthHeader`]. Nothing is decoded here.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .ok_or(AuthError::MalformedAuthHeader)
}

/// Check the bearer token of a request against the access domain
pub fn verify_access(tokens: &TokenService, headers: &HeaderMap) -> Result<Claims, AuthError> {
    let token = bearer_token(headers)?;
    tokens.validate(token, TokenKind::Access)
}

/// Authentication middleware
///
/// Wraps every route. Requests the route policy lists as public pass
/// straight through without touching any header. Everything else needs a
/// valid access token; every kind of failure gets the same 401.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let method = request.method().as_str();
    let path = request.uri().path();

    if !state.route_policy.requires_auth(method, path) {
        return next.run(request).await;
    }

    match verify_access(&state.tokens, request.headers()) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthUser {
                user_id: claims.user_id,
            });
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(
                kind = e.kind(),
                method = %request.method(),
                path = %request.uri().path(),
                "Rejected unauthenticated request"
            );
            ShelfError::Unauthorized.into_response()
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ShelfError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(ShelfError::Unauthorized)
    }
}
