//! Authentication failure kinds

use axum::http::StatusCode;

/// Every way an authentication step can fail.
///
/// These are ordinary return values: hostile or malformed input never panics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Wrong password or unknown email at login
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Missing `Authorization` header or wrong scheme prefix
    #[error("malformed authorization header")]
    MalformedAuthHeader,

    /// Token is not a three-part compact serialization we can parse
    #[error("malformed token")]
    TokenMalformed,

    /// MAC mismatch, including tokens asserting another algorithm
    #[error("token signature invalid")]
    TokenSignatureInvalid,

    /// Correctly signed but past its expiration instant
    #[error("token expired")]
    TokenExpired,

    /// Token verified but its subject no longer exists
    #[error("subject not found")]
    SubjectNotFound,

    /// Signing or serialization infrastructure failed
    #[error("token issuance failed: {0}")]
    IssuanceFailure(String),
}

impl AuthError {
    pub const UNAUTHORIZED_MESSAGE: &'static str = "Unauthorized";

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MalformedAuthHeader => StatusCode::BAD_REQUEST,
            AuthError::IssuanceFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::InvalidCredentials
            | AuthError::TokenMalformed
            | AuthError::TokenSignatureInvalid
            | AuthError::TokenExpired
            | AuthError::SubjectNotFound => StatusCode::UNAUTHORIZED,
        }
    }

    /// Error type reported to callers. All 401 kinds share one name.
    pub fn error_type(&self) -> &'static str {
        match self {
            AuthError::MalformedAuthHeader => "InvalidRequest",
            AuthError::IssuanceFailure(_) => "InternalError",
            _ => "AuthenticationError",
        }
    }

    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Invalid email or password",
            AuthError::MalformedAuthHeader => "Missing or malformed Authorization header",
            AuthError::IssuanceFailure(_) => "Failed to generate auth token",
            AuthError::TokenMalformed
            | AuthError::TokenSignatureInvalid
            | AuthError::TokenExpired
            | AuthError::SubjectNotFound => Self::UNAUTHORIZED_MESSAGE,
        }
    }

    /// Short kind name for server-side logs
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::MalformedAuthHeader => "malformed_auth_header",
            AuthError::TokenMalformed => "token_malformed",
            AuthError::TokenSignatureInvalid => "token_signature_invalid",
            AuthError::TokenExpired => "token_expired",
            AuthError::SubjectNotFound => "subject_not_found",
            AuthError::IssuanceFailure(_) => "issuance_failure",
        }
    }
}
