use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use super::extract::{IdPath, IdSegment, NotificationResource, parse_id};
use super::{ApiError, ApiResponse, AppState};
use crate::db::User;
use crate::services::{NotificationDto, NotificationError, ReadTarget};

impl From<NotificationError> for ApiError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::NotFound => Self::NotFound(err.to_string()),
            NotificationError::Database(msg) => Self::DatabaseError(msg),
            NotificationError::Internal(msg) => Self::internal(msg),
        }
    }
}

fn read_target(raw: &str) -> Result<ReadTarget, ApiError> {
    if raw == "all" {
        Ok(ReadTarget::All)
    } else {
        parse_id::<NotificationResource>(raw).map(ReadTarget::One)
    }
}

/// GET /notifications
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<Vec<NotificationDto>>>, ApiError> {
    let notifications = state.notification_service().list(user.id).await?;
    Ok(Json(ApiResponse::list(notifications)))
}

/// PUT /notifications/{id}/read
///
/// `id` may be `all`, which marks every unread notification of the caller.
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    IdSegment { raw, .. }: IdSegment<NotificationResource>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let target = read_target(&raw)?;
    let updated = state
        .notification_service()
        .mark_read(user.id, target)
        .await?;

    let message = match target {
        ReadTarget::All => format!("Marked {updated} notifications as read"),
        ReadTarget::One(_) => "Notification marked as read".to_string(),
    };
    Ok(Json(ApiResponse::message(message)))
}

/// DELETE /notifications/{id}
pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    IdPath { id, .. }: IdPath<NotificationResource>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.notification_service().delete(user.id, id).await?;
    Ok(Json(ApiResponse::message("Notification removed")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_target_accepts_all_or_an_id() {
        assert_eq!(read_target("all").unwrap(), ReadTarget::All);
        assert_eq!(read_target("42").unwrap(), ReadTarget::One(42));
        assert!(read_target("latest").is_err());
    }
}
