//! Repository implementations for the data access layer

use crate::auth::store::{CredentialRecord, UserStore};
use crate::core::error::{Result, ShelfError};
use crate::db::manager::DatabaseManager;
use crate::db::models::{Folder, User};
use async_trait::async_trait;
use rusqlite::{ErrorCode, OptionalExtension, Row};
use std::sync::Arc;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, password_hash, created_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
            && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Repository for users
pub struct UserRepository {
    db: Arc<DatabaseManager>,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Find a user by email
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.to_string();
        self.db
            .execute(move |conn| {
                Ok(conn
                    .query_row(
                        &format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS),
                        [&email],
                        user_from_row,
                    )
                    .optional()?)
            })
            .await
    }

    /// Find a user by ID
    pub async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let id = id.to_string();
        self.db
            .execute(move |conn| {
                Ok(conn
                    .query_row(
                        &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                        [&id],
                        user_from_row,
                    )
                    .optional()?)
            })
            .await
    }

    /// Insert a user together with their root folder.
    ///
    /// Both rows land in one transaction; a taken email becomes
    /// [`ShelfError::Conflict`].
    pub async fn create_with_root_folder(&self, email: &str, password_hash: &str) -> Result<User> {
        let email = email.to_string();
        let password_hash = password_hash.to_string();

        self.db
            .transaction(move |tx| {
                let user_id = Uuid::new_v4().to_string();

                tx.execute(
                    "INSERT INTO users (id, email, password_hash) VALUES (?, ?, ?)",
                    rusqlite::params![&user_id, &email, &password_hash],
                )
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        ShelfError::Conflict("Email is already registered".to_string())
                    } else {
                        ShelfError::DatabaseError(e)
                    }
                })?;

                tx.execute(
                    "INSERT INTO folders (id, user_id, parent_id, name) VALUES (?, ?, NULL, ?)",
                    rusqlite::params![Uuid::new_v4().to_string(), &user_id, Folder::ROOT_NAME],
                )?;

                Ok(tx.query_row(
                    &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                    [&user_id],
                    user_from_row,
                )?)
            })
            .await
    }

    /// Folders owned by a user
    pub async fn find_folders(&self, user_id: &str) -> Result<Vec<Folder>> {
        let user_id = user_id.to_string();
        self.db
            .execute(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, user_id, parent_id, name, created_at FROM folders \
                     WHERE user_id = ? ORDER BY created_at",
                )?;

                let folders = stmt
                    .query_map([&user_id], |row| {
                        Ok(Folder {
                            id: row.get(0)?,
                            user_id: row.get(1)?,
                            parent_id: row.get(2)?,
                            name: row.get(3)?,
                            created_at: row.get(4)?,
                        })
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                Ok(folders)
            })
            .await
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>> {
        Ok(self.find_user_by_email(email).await?.map(Into::into))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<CredentialRecord>> {
        Ok(self.find_user_by_id(id).await?.map(Into::into))
    }

    async fn create(&self, email: &str, password_hash: &str) -> Result<CredentialRecord> {
        let user = self.create_with_root_folder(email, password_hash).await?;
        tracing::debug!(user_id = %user.id, "Created user with root folder");
        Ok(user.into())
    }
}
