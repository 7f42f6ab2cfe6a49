//! Authentication request/response models

use crate::auth::password::{too_long_message, MAX_PASSWORD_BYTES};
use crate::core::error::{FieldErrors, ShelfError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Shortest password accepted at registration
pub const MIN_PASSWORD_LENGTH: usize = 6;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
    })
}

fn check_email(email: &str, errors: &mut FieldErrors) {
    if email.is_empty() {
        errors.insert("email".to_string(), "Email is required".to_string());
    } else if !email_pattern().is_match(email) {
        errors.insert("email".to_string(), "Email is not a valid address".to_string());
    }
}

fn into_result(errors: FieldErrors) -> Result<(), ShelfError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ShelfError::ValidationError(errors))
    }
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    /// Trim fields and check their shape
    pub fn normalize(mut self) -> Result<Self, ShelfError> {
        self.email = self.email.trim().to_string();
        self.password = self.password.trim().to_string();

        let mut errors = FieldErrors::new();
        check_email(&self.email, &mut errors);
        if self.password.is_empty() {
            errors.insert("password".to_string(), "Password is required".to_string());
        }

        into_result(errors).map(|_| self)
    }
}

/// Register request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterRequest {
    /// Trim fields and check their shape
    pub fn normalize(mut self) -> Result<Self, ShelfError> {
        self.email = self.email.trim().to_string();
        self.password = self.password.trim().to_string();

        let mut errors = FieldErrors::new();
        check_email(&self.email, &mut errors);
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.insert(
                "password".to_string(),
                format!(
                    "Password must be at least {} characters",
                    MIN_PASSWORD_LENGTH
                ),
            );
        } else if self.password.len() > MAX_PASSWORD_BYTES {
            errors.insert("password".to_string(), too_long_message());
        }

        into_result(errors).map(|_| self)
    }
}

/// Tokens returned by login, register and refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl From<crate::auth::jwt::TokenPair> for AuthTokens {
    fn from(pair: crate::auth::jwt::TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: Some(pair.refresh_token),
        }
    }
}

impl AuthTokens {
    pub fn access_only(access_token: String) -> Self {
        Self {
            access_token,
            refresh_token: None,
        }
    }
}

/// Public view of the authenticated user
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
}
