/// Notification endpoints
///
/// - `GET /notifications/my` - Caller's notifications, newest first
/// - `PUT /notifications/:notification_id/read` - Mark one as read
/// - `DELETE /notifications/:notification_id` - Delete one
/// - `DELETE /notifications` - Delete all of the caller's notifications
///
/// Another user's notification is reported as not found.

use crate::{
    app::AppState,
    error::ApiResult,
    response::{ApiResponse, AppPath},
};
use axum::{extract::State, Extension};
use edunotes_shared::{auth::middleware::Identity, models::notification::Notification};

pub async fn list_my_notifications(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<ApiResponse<Vec<Notification>>> {
    let notifications = state.notifications.list(identity.user_id).await?;
    Ok(ApiResponse::ok("Notifications retrieved successfully", notifications))
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    AppPath(notification_id): AppPath<i64>,
) -> ApiResult<ApiResponse<Notification>> {
    let notification = state
        .notifications
        .mark_read(notification_id, identity.user_id)
        .await?;

    Ok(ApiResponse::ok("Notification marked as read successfully", notification))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    AppPath(notification_id): AppPath<i64>,
) -> ApiResult<ApiResponse<()>> {
    state
        .notifications
        .delete(notification_id, identity.user_id)
        .await?;

    Ok(ApiResponse::message("Notification deleted successfully"))
}

pub async fn delete_all_notifications(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<ApiResponse<()>> {
    state.notifications.delete_all(identity.user_id).await?;
    Ok(ApiResponse::message("All notifications deleted successfully"))
}
