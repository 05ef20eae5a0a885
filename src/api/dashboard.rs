//! Read-only dashboard statistics for administrators and members.

use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::db::User;
use crate::services::{AdminStats, DashboardError, MemberStats};

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

/// GET /admin/stats
pub async fn admin_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<AdminStats>>, ApiError> {
    let stats = state.dashboard_service().admin_stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// GET /users/dashboard-stats
pub async fn member_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<MemberStats>>, ApiError> {
    let stats = state.dashboard_service().member_stats(user.id).await?;
    Ok(Json(ApiResponse::success(stats)))
}
