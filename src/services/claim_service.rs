//! Domain service for claim submission and administrative review.

use serde::Serialize;
use thiserror::Error;

use crate::constants::UPLOADS_ROUTE;
use crate::db::User;
use crate::entities::claims::{self, ClaimStatus};
use crate::entities::items::{self, ItemStatus};

#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Item not found")]
    ItemNotFound(i32),

    #[error("This item is already claimed or not available")]
    ItemUnavailable,

    #[error("You have already submitted a claim for this item")]
    Duplicate,

    #[error("Invalid status. Must be \"approved\", \"rejected\" or \"collected\"")]
    InvalidStatus,

    #[error("Claim not found")]
    NotFound(i32),

    #[error("Claim is already {}", .0.label())]
    AlreadyDecided(ClaimStatus),

    #[error("Cannot approve. Item is no longer available.")]
    CannotApprove,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ClaimError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ClaimError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimedItemInfo {
    pub id: i32,
    pub title: String,
    pub image: String,
    pub image_url: String,
    pub status: ItemStatus,
    pub found_location: String,
}

impl From<&items::Model> for ClaimedItemInfo {
    fn from(item: &items::Model) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            image: item.image.clone(),
            image_url: format!("{UPLOADS_ROUTE}/{}", item.image),
            status: item.status,
            found_location: item.found_location.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaimantInfo {
    pub id: i32,
    pub name: String,
    pub email: String,
}

impl From<&User> for ClaimantInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimDto {
    pub id: i32,
    pub item_id: i32,
    pub user_id: i32,
    pub status: ClaimStatus,
    pub admin_comment: Option<String>,
    pub claim_date: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<ClaimedItemInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<ClaimantInfo>,
}

impl ClaimDto {
    #[must_use]
    pub fn new(
        model: claims::Model,
        item: Option<ClaimedItemInfo>,
        user: Option<ClaimantInfo>,
    ) -> Self {
        Self {
            id: model.id,
            item_id: model.item_id,
            user_id: model.user_id,
            status: model.status,
            admin_comment: model.admin_comment,
            claim_date: model.claim_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
            item,
            user,
        }
    }
}

#[async_trait::async_trait]
pub trait ClaimService: Send + Sync {
    /// Files a pending claim on an available item.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimError::Duplicate`] when the user already claimed it.
    async fn submit(&self, user_id: i32, item_id: i32) -> Result<ClaimDto, ClaimError>;

    /// All claims, newest first, with item and claimant.
    async fn list_all(&self) -> Result<Vec<ClaimDto>, ClaimError>;

    /// The user's own claims, newest first, with item.
    async fn list_for_user(&self, user_id: i32) -> Result<Vec<ClaimDto>, ClaimError>;

    /// Applies an admin decision (`approved`, `rejected` or `collected`).
    ///
    /// Approval is atomic: the item becomes `claimed` and competing pending
    /// claims are rejected in the same transaction.
    async fn review(
        &self,
        claim_id: i32,
        status: &str,
        admin_comment: Option<String>,
    ) -> Result<ClaimDto, ClaimError>;
}
