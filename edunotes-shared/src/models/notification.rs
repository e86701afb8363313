/// Notification model
///
/// Every query takes the owning user's ID alongside the notification ID, so a
/// lookup of another user's notification behaves exactly like a lookup of a
/// missing one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

/// Read state of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Unread,
    Read,
}

/// Notification row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub notification_id: i64,

    /// Owner
    pub user_id: i64,

    pub message: String,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Inserts an unread notification
    pub async fn create(
        executor: impl PgExecutor<'_>,
        user_id: i64,
        message: &str,
    ) -> Result<Self, sqlx::Error> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, message)
            VALUES ($1, $2)
            RETURNING notification_id, user_id, message, status, created_at
            "#,
        )
        .bind(user_id)
        .bind(message)
        .fetch_one(executor)
        .await?;

        Ok(notification)
    }

    /// Finds a notification owned by `user_id`
    pub async fn find_owned(
        executor: impl PgExecutor<'_>,
        notification_id: i64,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            SELECT notification_id, user_id, message, status, created_at
            FROM notifications
            WHERE notification_id = $1 AND user_id = $2
            "#,
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(notification)
    }

    /// Marks an owned notification as read
    ///
    /// Marking an already-read notification succeeds and returns it unchanged.
    pub async fn mark_read(
        executor: impl PgExecutor<'_>,
        notification_id: i64,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET status = 'read'
            WHERE notification_id = $1 AND user_id = $2
            RETURNING notification_id, user_id, message, status, created_at
            "#,
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(notification)
    }

    /// Deletes an owned notification
    pub async fn delete_owned(
        executor: impl PgExecutor<'_>,
        notification_id: i64,
        user_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notifications WHERE notification_id = $1 AND user_id = $2")
            .bind(notification_id)
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes all of a user's notifications
    ///
    /// # Returns
    ///
    /// Number of rows deleted
    pub async fn delete_all_for_user(executor: impl PgExecutor<'_>, user_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notifications WHERE user_id = $1")
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Lists a user's notifications, newest first
    pub async fn list_for_user(executor: impl PgExecutor<'_>, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT notification_id, user_id, message, status, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC, notification_id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(notifications)
    }
}
