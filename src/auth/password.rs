//! Password hashing and verification using bcrypt

use crate::core::error::{FieldErrors, Result, ShelfError};
use std::sync::OnceLock;

/// Work factor used for every stored hash.
pub const BCRYPT_COST: u32 = 12;

/// bcrypt only reads this many bytes of input; longer passwords are refused
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Salted, adaptive one-way hashing of user passwords.
///
/// The cost is fixed when the hasher is built and never taken from requests.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: BCRYPT_COST }
    }
}

impl PasswordHasher {
    /// Build a hasher with an explicit cost. Used by tests to keep bcrypt fast.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password using bcrypt
    pub fn hash(&self, password: &str) -> Result<String> {
        if password.len() > MAX_PASSWORD_BYTES {
            let mut fields = FieldErrors::new();
            fields.insert("password".to_string(), too_long_message());
            return Err(ShelfError::ValidationError(fields));
        }

        bcrypt::hash(password, self.cost)
            .map_err(|e| ShelfError::TaskError(format!("Failed to hash password: {}", e)))
    }

    /// Verify a password against a stored hash.
    ///
    /// A structurally invalid hash counts as a mismatch, and so does a
    /// password bcrypt would truncate.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        if password.len() > MAX_PASSWORD_BYTES {
            return false;
        }

        match bcrypt::verify(password, hash) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash could not be parsed");
                false
            }
        }
    }

    /// [`hash`](Self::hash) on the blocking pool
    pub async fn hash_blocking(&self, password: String) -> Result<String> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ShelfError::TaskError(format!("Password hashing task failed: {}", e)))?
    }

    /// [`verify`](Self::verify) on the blocking pool
    pub async fn verify_blocking(&self, password: String, hash: String) -> Result<bool> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| ShelfError::TaskError(format!("Password verification task failed: {}", e)))
    }

    /// Burn one verification against a throwaway hash.
    ///
    /// Login calls this for unknown emails so that path costs the same as a
    /// wrong password.
    pub async fn verify_dummy(&self, password: String) -> Result<()> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || {
            if let Some(hash) = hasher.dummy_hash() {
                let _ = bcrypt::verify(&password, hash);
            }
        })
        .await
        .map_err(|e| ShelfError::TaskError(format!("Password verification task failed: {}", e)))
    }

    fn dummy_hash(&self) -> Option<&'static str> {
        static DUMMY: OnceLock<Option<String>> = OnceLock::new();
        DUMMY
            .get_or_init(|| bcrypt::hash("linkshelf-dummy-password", self.cost).ok())
            .as_deref()
    }
}

/// Field error text for passwords over [`MAX_PASSWORD_BYTES`]
pub fn too_long_message() -> String {
    format!("Password must be at most {} bytes", MAX_PASSWORD_BYTES)
}
