use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::extract::{ApiJson, ClaimResource, IdPath};
use super::{ApiError, ApiResponse, AppState};
use crate::db::User;
use crate::services::{ClaimDto, ClaimError};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitClaimRequest {
    pub item_id: Option<i32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewClaimRequest {
    #[serde(default)]
    pub status: String,
    pub admin_comment: Option<String>,
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::ItemNotFound(_) | ClaimError::NotFound(_) => {
                Self::NotFound(err.to_string())
            }
            ClaimError::ItemUnavailable
            | ClaimError::Duplicate
            | ClaimError::InvalidStatus
            | ClaimError::AlreadyDecided(_)
            | ClaimError::CannotApprove => Self::validation(err.to_string()),
            ClaimError::Database(msg) => Self::DatabaseError(msg),
            ClaimError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// POST /claims
pub async fn submit_claim(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiJson(payload): ApiJson<SubmitClaimRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let item_id = payload
        .item_id
        .ok_or_else(|| ApiError::validation("Please provide an item ID"))?;

    let claim = state.claim_service().submit(user.id, item_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Claim submitted successfully", claim)),
    ))
}

/// GET /claims
pub async fn list_claims(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ClaimDto>>>, ApiError> {
    let claims = state.claim_service().list_all().await?;
    Ok(Json(ApiResponse::list(claims)))
}

/// GET /claims/user
pub async fn my_claims(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<Vec<ClaimDto>>>, ApiError> {
    let claims = state.claim_service().list_for_user(user.id).await?;
    Ok(Json(ApiResponse::list(claims)))
}

/// PUT /claims/{id}
pub async fn review_claim(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<User>,
    IdPath { id, .. }: IdPath<ClaimResource>,
    ApiJson(payload): ApiJson<ReviewClaimRequest>,
) -> Result<Json<ApiResponse<ClaimDto>>, ApiError> {
    let claim = state
        .claim_service()
        .review(id, &payload.status, payload.admin_comment)
        .await?;

    tracing::info!(
        claim_id = id,
        admin_id = admin.id,
        status = %payload.status,
        "Claim reviewed"
    );
    Ok(Json(ApiResponse::with_message(
        format!("Claim {}", claim.status.label()),
        claim,
    )))
}
