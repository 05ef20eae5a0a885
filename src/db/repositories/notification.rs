use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::db::now_timestamp;
use crate::entities::notifications::{self, NotificationKind};
use crate::entities::prelude::*;

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: i32,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
}

pub struct NotificationRepository {
    conn: DatabaseConnection,
}

impl NotificationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, notification: NewNotification) -> Result<notifications::Model> {
        let now = now_timestamp();
        let active_model = notifications::ActiveModel {
            user_id: Set(notification.user_id),
            title: Set(notification.title),
            message: Set(notification.message),
            kind: Set(notification.kind),
            is_read: Set(false),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active_model
            .insert(&self.conn)
            .await
            .context("Failed to insert notification")
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<notifications::Model>> {
        Notifications::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .order_by_desc(notifications::Column::CreatedAt)
            .order_by_desc(notifications::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list notifications")
    }

    /// Returns false when the notification does not belong to `user_id`.
    pub async fn mark_read(&self, id: i32, user_id: i32) -> Result<bool> {
        let result = Notifications::update_many()
            .col_expr(notifications::Column::IsRead, Expr::value(true))
            .col_expr(notifications::Column::UpdatedAt, Expr::value(now_timestamp()))
            .filter(notifications::Column::Id.eq(id))
            .filter(notifications::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to mark notification read")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn mark_all_read(&self, user_id: i32) -> Result<u64> {
        let result = Notifications::update_many()
            .col_expr(notifications::Column::IsRead, Expr::value(true))
            .col_expr(notifications::Column::UpdatedAt, Expr::value(now_timestamp()))
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .exec(&self.conn)
            .await
            .context("Failed to mark notifications read")?;

        Ok(result.rows_affected)
    }

    pub async fn delete(&self, id: i32, user_id: i32) -> Result<bool> {
        let result = Notifications::delete_many()
            .filter(notifications::Column::Id.eq(id))
            .filter(notifications::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete notification")?;

        Ok(result.rows_affected > 0)
    }
}
