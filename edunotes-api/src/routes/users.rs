/// Current-user endpoints
///
/// - `GET /users/me` - Caller's profile, including score and rank
/// - `DELETE /users/me` - Delete the caller's account
///
/// Deleting an account cascades to memberships, authored notes, feedback,
/// notifications and invitations the user sent.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::ApiResponse,
};
use axum::{extract::State, Extension};
use edunotes_shared::{auth::middleware::Identity, models::user::User, reputation::USER_NOT_FOUND};

/// Get the caller's profile
pub async fn get_me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<ApiResponse<User>> {
    let user = User::find_by_id(&state.db, identity.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    Ok(ApiResponse::ok("User retrieved successfully", user))
}

/// Delete the caller's account
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<ApiResponse<()>> {
    if !User::delete(&state.db, identity.user_id).await? {
        return Err(ApiError::NotFound(USER_NOT_FOUND.to_string()));
    }

    tracing::info!(user_id = identity.user_id, "User deleted");
    Ok(ApiResponse::message("User deleted successfully"))
}
