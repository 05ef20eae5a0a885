//! Per-user notifications raised by claim and item workflow changes.

use serde::Serialize;
use thiserror::Error;

use crate::db::NewNotification;
use crate::entities::notifications::{self, NotificationKind};

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for NotificationError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for NotificationError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDto {
    pub id: i32,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub is_read: bool,
    pub created_at: String,
}

impl From<notifications::Model> for NotificationDto {
    fn from(model: notifications::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            message: model.message,
            kind: model.kind,
            is_read: model.is_read,
            created_at: model.created_at,
        }
    }
}

/// Which notifications a read-marker applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadTarget {
    All,
    One(i32),
}

#[async_trait::async_trait]
pub trait NotificationService: Send + Sync {
    async fn list(&self, user_id: i32) -> Result<Vec<NotificationDto>, NotificationError>;

    /// Returns how many notifications changed.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::NotFound`] when a single target does not
    /// belong to the user.
    async fn mark_read(&self, user_id: i32, target: ReadTarget) -> Result<u64, NotificationError>;

    async fn delete(&self, user_id: i32, id: i32) -> Result<(), NotificationError>;

    /// Best-effort delivery: failures are logged, never returned, so a
    /// workflow change is not undone by a missing notification.
    async fn notify(&self, notification: NewNotification);
}

/// Convenience constructor used by the workflow services.
#[must_use]
pub fn notice(
    user_id: i32,
    kind: NotificationKind,
    title: &str,
    message: impl Into<String>,
) -> NewNotification {
    NewNotification {
        user_id,
        title: title.to_string(),
        message: message.into(),
        kind,
    }
}
