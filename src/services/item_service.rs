//! Domain service for reporting, browsing and administering found items.

use serde::Serialize;
use thiserror::Error;

use crate::constants::UPLOADS_ROUTE;
use crate::db::User;
use crate::domain::item::{FilterError, ItemFilterParams};
use crate::entities::items::{self, ItemStatus};

#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Item not found")]
    NotFound(i32),

    #[error("Please upload an image")]
    MissingImage,

    #[error("Only image files (jpg, jpeg, png, gif, webp) are allowed")]
    NotAnImage,

    #[error("Please provide all required fields")]
    MissingFields,

    #[error("{0}")]
    Validation(String),

    #[error("Please provide a valid status (available or claimed)")]
    InvalidStatus,

    #[error("Item is already marked as collected")]
    AlreadyCollected,

    #[error("Collecting user not found")]
    UnknownCollector(i32),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ItemError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ItemError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<FilterError> for ItemError {
    fn from(err: FilterError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Poster details embedded in item responses.
#[derive(Debug, Clone, Serialize)]
pub struct PosterInfo {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl From<&User> for PosterInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub image: String,
    pub image_url: String,
    pub found_location: String,
    pub found_date: String,
    pub status: ItemStatus,
    pub is_archived: bool,
    pub collected_date: Option<String>,
    pub collected_by: Option<i32>,
    /// `None` only if the poster's account is gone.
    pub posted_by: Option<PosterInfo>,
    pub created_at: String,
    pub updated_at: String,
}

impl ItemDto {
    #[must_use]
    pub fn new(model: items::Model, poster: Option<PosterInfo>) -> Self {
        Self {
            id: model.id,
            image_url: format!("{UPLOADS_ROUTE}/{}", model.image),
            title: model.title,
            description: model.description,
            image: model.image,
            found_location: model.found_location,
            found_date: model.found_date,
            status: model.status,
            is_archived: model.is_archived,
            collected_date: model.collected_date,
            collected_by: model.collected_by,
            posted_by: poster,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// A file part as received, before any type checks.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Form fields of a report, as submitted. `image` is `None` when the form
/// had no file part.
#[derive(Debug, Clone, Default)]
pub struct ItemSubmission {
    pub title: Option<String>,
    pub description: Option<String>,
    pub found_location: Option<String>,
    pub found_date: Option<String>,
    pub image: Option<UploadedFile>,
}

#[async_trait::async_trait]
pub trait ItemService: Send + Sync {
    /// Validates the report, stores the image and inserts the item.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::MissingImage`] or [`ItemError::MissingFields`]
    /// before anything touches the disk.
    async fn create(&self, submission: ItemSubmission, poster_id: i32)
    -> Result<ItemDto, ItemError>;

    async fn list(&self, params: ItemFilterParams) -> Result<Vec<ItemDto>, ItemError>;

    async fn get(&self, id: i32) -> Result<ItemDto, ItemError>;

    async fn list_for_user(&self, user_id: i32) -> Result<Vec<ItemDto>, ItemError>;

    /// Partial edit. A new image replaces the old file once the row is saved.
    async fn update(&self, id: i32, submission: ItemSubmission) -> Result<ItemDto, ItemError>;

    /// Removes the item, its claims and its image file.
    async fn delete(&self, id: i32) -> Result<(), ItemError>;

    /// Admin override, limited to `available` and `claimed`.
    async fn set_status(&self, id: i32, status: &str) -> Result<ItemDto, ItemError>;

    /// Confirms pickup and archives the item.
    async fn mark_collected(
        &self,
        id: i32,
        collected_by: Option<i32>,
    ) -> Result<ItemDto, ItemError>;
}
