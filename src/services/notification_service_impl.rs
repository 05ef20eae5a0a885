//! `SeaORM` implementation of the `NotificationService` trait.

use crate::db::{NewNotification, Store};
use crate::services::notification_service::{
    NotificationDto, NotificationError, NotificationService, ReadTarget,
};
use async_trait::async_trait;
use tracing::warn;

pub struct SeaOrmNotificationService {
    store: Store,
}

impl SeaOrmNotificationService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl NotificationService for SeaOrmNotificationService {
    async fn list(&self, user_id: i32) -> Result<Vec<NotificationDto>, NotificationError> {
        let rows = self.store.list_notifications(user_id).await?;
        Ok(rows.into_iter().map(NotificationDto::from).collect())
    }

    async fn mark_read(&self, user_id: i32, target: ReadTarget) -> Result<u64, NotificationError> {
        match target {
            ReadTarget::All => Ok(self.store.mark_all_notifications_read(user_id).await?),
            ReadTarget::One(id) => {
                if self.store.mark_notification_read(id, user_id).await? {
                    Ok(1)
                } else {
                    Err(NotificationError::NotFound)
                }
            }
        }
    }

    async fn delete(&self, user_id: i32, id: i32) -> Result<(), NotificationError> {
        if self.store.delete_notification(id, user_id).await? {
            Ok(())
        } else {
            Err(NotificationError::NotFound)
        }
    }

    async fn notify(&self, notification: NewNotification) {
        let user_id = notification.user_id;
        if let Err(e) = self.store.create_notification(notification).await {
            warn!(user_id, error = %e, "Failed to create notification");
        }
    }
}
