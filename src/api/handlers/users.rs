use super::AppState;
use crate::auth::error::AuthError;
use crate::auth::middleware::AuthUser;
use crate::auth::models::UserInfo;
use crate::auth::store::bounded;
use crate::core::error::Result;
use axum::{extract::State, Json};

/// Handler for GET /users/me - Current user info
pub async fn get_me(State(state): State<AppState>, user: AuthUser) -> Result<Json<UserInfo>> {
    let record = bounded(
        state.lookup_timeout,
        "find_user_by_id",
        state.user_store.find_by_id(&user.user_id),
    )
    .await?
    .ok_or(AuthError::SubjectNotFound)?;

    Ok(Json(UserInfo {
        id: record.id,
        email: record.email,
    }))
}
