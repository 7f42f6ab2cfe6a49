//! User lookup contract consumed by the auth flows

use crate::core::error::{Result, ShelfError};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Stored credentials of one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub id: String,
    pub email: String,
    pub password_hash: String,
}

/// Where credential records live.
///
/// The auth flows only read records, except registration which creates one.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<CredentialRecord>>;

    /// Create a user. Fails with [`ShelfError::Conflict`] if the email is taken.
    async fn create(&self, email: &str, password_hash: &str) -> Result<CredentialRecord>;
}

/// Run one store call under the lookup deadline.
///
/// On expiry the call is dropped and a [`ShelfError::Timeout`] is returned.
pub async fn bounded<T, F>(limit: Duration, operation: &'static str, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                operation,
                timeout_ms = limit.as_millis() as u64,
                "User store call timed out"
            );
            Err(ShelfError::Timeout(format!("{} timed out", operation)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_passes_result_through() {
        let value = bounded(Duration::from_millis(100), "lookup", async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);

        let err = bounded::<(), _>(Duration::from_millis(100), "lookup", async {
            Err(ShelfError::NotFound("x".into()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ShelfError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let err = bounded(Duration::from_millis(50), "find_by_id", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ShelfError::Timeout(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::REQUEST_TIMEOUT);
    }
}
