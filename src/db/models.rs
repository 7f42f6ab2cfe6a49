//! Database models
//!
//! Data structures representing database tables

use crate::auth::store::CredentialRecord;

/// User record in the database
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

impl From<User> for CredentialRecord {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            password_hash: user.password_hash,
        }
    }
}

/// Folder record in the database
#[derive(Debug, Clone)]
pub struct Folder {
    pub id: String,
    pub user_id: String,
    pub parent_id: Option<String>,
    pub name: String,
    pub created_at: String,
}

impl Folder {
    /// Name of the folder provisioned for every new user
    pub const ROOT_NAME: &'static str = "root";
}
