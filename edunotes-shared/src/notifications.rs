/// Notification dispatcher
///
/// Records user-visible messages triggered by membership events. A
/// notification is persisted before the triggering operation returns: callers
/// that already hold a transaction use [`NotificationDispatcher::notify_with`]
/// so the notification commits or rolls back with the event that caused it.
///
/// Reads and deletes are scoped to the owning user. Another user's
/// notification is reported as `NotFound`, as is an empty collection.
///
/// # Example
///
/// ```no_run
/// use edunotes_shared::notifications::NotificationDispatcher;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let dispatcher = NotificationDispatcher::new(pool);
///
/// let id = dispatcher.notify(7, "Welcome aboard").await?;
/// dispatcher.mark_read(id, 7).await?;
/// dispatcher.delete_all(7).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::{PgExecutor, PgPool};
use tracing::{debug, info};

use crate::error::{DomainError, DomainResult};
use crate::models::notification::Notification;

pub const NOTIFICATION_NOT_FOUND: &str = "Notification not found";
pub const NO_NOTIFICATIONS: &str = "No notifications found for this user";

/// Notification dispatcher service
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    db: PgPool,
}

impl NotificationDispatcher {
    /// Creates a new dispatcher
    pub fn new(db: PgPool) -> Self {
        NotificationDispatcher { db }
    }

    /// Message sent to a user removed from an organization
    pub fn removal_message(organization_name: &str) -> String {
        format!("You have been removed from organization {}.", organization_name)
    }

    /// Persists a notification and returns its ID
    pub async fn notify(&self, user_id: i64, message: &str) -> DomainResult<i64> {
        Self::notify_with(&self.db, user_id, message).await
    }

    /// Persists a notification on the caller's executor
    ///
    /// Pass `&mut *tx` to bind the notification to an enclosing transaction.
    pub async fn notify_with(
        executor: impl PgExecutor<'_>,
        user_id: i64,
        message: &str,
    ) -> DomainResult<i64> {
        let notification = Notification::create(executor, user_id, message).await?;

        debug!(
            notification_id = notification.notification_id,
            user_id,
            "Notification recorded"
        );

        Ok(notification.notification_id)
    }

    /// Lists the owner's notifications, newest first
    ///
    /// # Errors
    ///
    /// `DomainError::NotFound` when the owner has none
    pub async fn list(&self, owner_user_id: i64) -> DomainResult<Vec<Notification>> {
        let notifications = Notification::list_for_user(&self.db, owner_user_id).await?;

        if notifications.is_empty() {
            return Err(DomainError::not_found(NO_NOTIFICATIONS));
        }

        Ok(notifications)
    }

    /// Marks one of the owner's notifications as read
    pub async fn mark_read(&self, notification_id: i64, owner_user_id: i64) -> DomainResult<Notification> {
        Notification::mark_read(&self.db, notification_id, owner_user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(NOTIFICATION_NOT_FOUND))
    }

    /// Deletes one of the owner's notifications
    pub async fn delete(&self, notification_id: i64, owner_user_id: i64) -> DomainResult<()> {
        if !Notification::delete_owned(&self.db, notification_id, owner_user_id).await? {
            return Err(DomainError::not_found(NOTIFICATION_NOT_FOUND));
        }

        Ok(())
    }

    /// Deletes all of the owner's notifications
    ///
    /// # Returns
    ///
    /// Number of notifications deleted
    ///
    /// # Errors
    ///
    /// `DomainError::NotFound` when the owner has none
    pub async fn delete_all(&self, owner_user_id: i64) -> DomainResult<u64> {
        let deleted = Notification::delete_all_for_user(&self.db, owner_user_id).await?;

        if deleted == 0 {
            return Err(DomainError::not_found(NO_NOTIFICATIONS));
        }

        info!(user_id = owner_user_id, deleted, "Deleted all notifications");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_message() {
        assert_eq!(
            NotificationDispatcher::removal_message("Physics 101"),
            "You have been removed from organization Physics 101."
        );
    }
}
