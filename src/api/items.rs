use axum::{
    Extension, Json,
    extract::{
        Multipart, Query, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::extract::{ApiJson, IdPath, ItemResource};
use super::{ApiError, ApiResponse, AppState, FlatResponse};
use crate::db::User;
use crate::domain::item::ItemFilterParams;
use crate::services::{ItemDto, ItemError, ItemSubmission, UploadedFile};

#[derive(Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    pub collected_by: Option<i32>,
}

#[derive(Serialize)]
pub struct ItemBody {
    pub item: ItemDto,
}

#[derive(Serialize)]
pub struct ItemList {
    pub items: Vec<ItemDto>,
}

type ItemResponse = Json<FlatResponse<ItemBody>>;
type ItemListResponse = Json<FlatResponse<ItemList>>;

fn item_response(message: &str, item: ItemDto) -> ItemResponse {
    Json(FlatResponse::with_message(message, ItemBody { item }))
}

fn list_response(items: Vec<ItemDto>) -> ItemListResponse {
    let count = items.len();
    Json(FlatResponse::new(ItemList { items }).with_count(count))
}

impl From<ItemError> for ApiError {
    fn from(err: ItemError) -> Self {
        match err {
            ItemError::NotFound(_) => Self::NotFound(err.to_string()),
            ItemError::MissingImage
            | ItemError::NotAnImage
            | ItemError::MissingFields
            | ItemError::Validation(_)
            | ItemError::InvalidStatus
            | ItemError::AlreadyCollected
            | ItemError::UnknownCollector(_) => Self::validation(err.to_string()),
            ItemError::Database(msg) => Self::DatabaseError(msg),
            ItemError::Internal(msg) => Self::internal(msg),
        }
    }
}

fn multipart_error(err: &MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge("File too large".to_string())
    } else {
        ApiError::validation(err.body_text())
    }
}

/// Reads the item form. Unknown fields are skipped; an `image` part with no
/// content counts as no image.
async fn read_submission(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ItemSubmission, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::validation(e.body_text()))?;
    let mut submission = ItemSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "image" {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(|e| multipart_error(&e))?;
            if !bytes.is_empty() {
                submission.image = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field.text().await.map_err(|e| multipart_error(&e))?;
        match name.as_str() {
            "title" => submission.title = Some(value),
            "description" => submission.description = Some(value),
            "foundLocation" => submission.found_location = Some(value),
            "foundDate" => submission.found_date = Some(value),
            _ => {}
        }
    }

    Ok(submission)
}

/// POST /items
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let submission = read_submission(multipart).await?;
    let item = state.item_service().create(submission, user.id).await?;

    Ok((
        StatusCode::CREATED,
        item_response("Item reported successfully", item),
    ))
}

/// GET /items
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ItemFilterParams>,
) -> Result<ItemListResponse, ApiError> {
    let items = state.item_service().list(params).await?;
    Ok(list_response(items))
}

/// GET /items/{id}
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    IdPath { id, .. }: IdPath<ItemResource>,
) -> Result<ItemResponse, ApiError> {
    let item = state.item_service().get(id).await?;
    Ok(Json(FlatResponse::new(ItemBody { item })))
}

/// GET /items/user
pub async fn my_items(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<ItemListResponse, ApiError> {
    let items = state.item_service().list_for_user(user.id).await?;
    Ok(list_response(items))
}

/// PUT /items/{id}
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    IdPath { id, .. }: IdPath<ItemResource>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ItemResponse, ApiError> {
    let submission = read_submission(multipart).await?;
    let item = state.item_service().update(id, submission).await?;
    Ok(item_response("Item updated", item))
}

/// DELETE /items/{id}
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    IdPath { id, .. }: IdPath<ItemResource>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.item_service().delete(id).await?;
    Ok(Json(ApiResponse::message("Item removed")))
}

/// PUT /items/{id}/status
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    IdPath { id, .. }: IdPath<ItemResource>,
    ApiJson(payload): ApiJson<StatusRequest>,
) -> Result<ItemResponse, ApiError> {
    let item = state.item_service().set_status(id, &payload.status).await?;
    Ok(item_response("Item status updated", item))
}

/// PUT /items/{id}/complete
///
/// The body is optional; without `collectedBy` the pickup is recorded
/// against no particular member.
pub async fn complete_item(
    State(state): State<Arc<AppState>>,
    IdPath { id, .. }: IdPath<ItemResource>,
    payload: Option<ApiJson<CompleteRequest>>,
) -> Result<ItemResponse, ApiError> {
    let collected_by = payload.and_then(|ApiJson(body)| body.collected_by);
    let item = state
        .item_service()
        .mark_collected(id, collected_by)
        .await?;
    Ok(item_response("Item marked as collected", item))
}
