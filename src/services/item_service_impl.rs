//! `SeaORM` implementation of the `ItemService` trait.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::constants::limits;
use crate::db::{ItemChanges, NewItem, Store};
use crate::domain::item::{ItemFilter, ItemFilterParams};
use crate::domain::normalize_date;
use crate::entities::items::{self, ItemStatus};
use crate::entities::notifications::NotificationKind;
use crate::services::item_service::{
    ItemDto, ItemError, ItemService, ItemSubmission, PosterInfo, UploadedFile,
};
use crate::services::notification_service::{NotificationService, notice};
use crate::services::uploads::{ImageStore, PendingImage};
use async_trait::async_trait;
use tracing::info;

pub struct SeaOrmItemService {
    store: Store,
    images: ImageStore,
    notifications: Arc<dyn NotificationService>,
}

impl SeaOrmItemService {
    #[must_use]
    pub fn new(
        store: Store,
        images: ImageStore,
        notifications: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            store,
            images,
            notifications,
        }
    }

    /// Attaches poster details, loading all posters in one query.
    async fn to_dtos(&self, models: Vec<items::Model>) -> Result<Vec<ItemDto>, ItemError> {
        let poster_ids: Vec<i32> = models
            .iter()
            .map(|m| m.posted_by)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let posters: HashMap<i32, PosterInfo> = self
            .store
            .get_users_by_ids(&poster_ids)
            .await?
            .iter()
            .map(|u| (u.id, PosterInfo::from(u)))
            .collect();

        Ok(models
            .into_iter()
            .map(|m| {
                let poster = posters.get(&m.posted_by).cloned();
                ItemDto::new(m, poster)
            })
            .collect())
    }

    async fn to_dto(&self, model: items::Model) -> Result<ItemDto, ItemError> {
        let mut dtos = self.to_dtos(vec![model]).await?;
        dtos.pop()
            .ok_or_else(|| ItemError::Internal("Item vanished while loading".to_string()))
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_title(title: &str) -> Result<(), ItemError> {
    if title.chars().count() > limits::TITLE_MAX_LEN {
        return Err(ItemError::Validation(format!(
            "Title cannot exceed {} characters",
            limits::TITLE_MAX_LEN
        )));
    }
    Ok(())
}

fn check_description(description: &str) -> Result<(), ItemError> {
    if description.chars().count() > limits::DESCRIPTION_MAX_LEN {
        return Err(ItemError::Validation(format!(
            "Description cannot exceed {} characters",
            limits::DESCRIPTION_MAX_LEN
        )));
    }
    Ok(())
}

fn parse_found_date(raw: &str) -> Result<String, ItemError> {
    normalize_date(raw)
        .ok_or_else(|| ItemError::Validation("Please provide a valid found date".to_string()))
}

fn accept_image(file: UploadedFile) -> Result<PendingImage, ItemError> {
    PendingImage::new(
        file.file_name.as_deref(),
        file.content_type.as_deref(),
        file.bytes,
    )
    .ok_or(ItemError::NotAnImage)
}

/// Fields given in an edit must not be blank.
fn edited(value: Option<String>, field: &str) -> Result<Option<String>, ItemError> {
    match value {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => {
            Err(ItemError::Validation(format!("{field} cannot be empty")))
        }
        Some(v) => Ok(Some(v.trim().to_string())),
    }
}

#[async_trait]
impl ItemService for SeaOrmItemService {
    async fn create(
        &self,
        submission: ItemSubmission,
        poster_id: i32,
    ) -> Result<ItemDto, ItemError> {
        let file = submission.image.ok_or(ItemError::MissingImage)?;

        let (Some(title), Some(description), Some(found_location), Some(found_date)) = (
            present(submission.title),
            present(submission.description),
            present(submission.found_location),
            present(submission.found_date),
        ) else {
            return Err(ItemError::MissingFields);
        };

        check_title(&title)?;
        check_description(&description)?;
        let found_date = parse_found_date(&found_date)?;
        let image = accept_image(file)?;

        let filename = self.images.save(image).await?;

        let created = self
            .store
            .create_item(NewItem {
                title,
                description,
                image: filename.clone(),
                found_location,
                found_date,
                posted_by: poster_id,
            })
            .await;

        match created {
            Ok(model) => self.to_dto(model).await,
            Err(e) => {
                self.images.discard(&filename).await;
                Err(e.into())
            }
        }
    }

    async fn list(&self, params: ItemFilterParams) -> Result<Vec<ItemDto>, ItemError> {
        let filter = ItemFilter::try_from(params)?;
        let models = self.store.list_items(&filter).await?;
        self.to_dtos(models).await
    }

    async fn get(&self, id: i32) -> Result<ItemDto, ItemError> {
        let model = self
            .store
            .get_item(id)
            .await?
            .ok_or(ItemError::NotFound(id))?;
        self.to_dto(model).await
    }

    async fn list_for_user(&self, user_id: i32) -> Result<Vec<ItemDto>, ItemError> {
        let models = self.store.list_items_by_poster(user_id).await?;
        self.to_dtos(models).await
    }

    async fn update(&self, id: i32, submission: ItemSubmission) -> Result<ItemDto, ItemError> {
        let existing = self
            .store
            .get_item(id)
            .await?
            .ok_or(ItemError::NotFound(id))?;

        let title = edited(submission.title, "Title")?;
        let description = edited(submission.description, "Description")?;
        let found_location = edited(submission.found_location, "Found location")?;
        let found_date = edited(submission.found_date, "Found date")?
            .map(|d| parse_found_date(&d))
            .transpose()?;

        if let Some(title) = &title {
            check_title(title)?;
        }
        if let Some(description) = &description {
            check_description(description)?;
        }

        let image = submission.image.map(accept_image).transpose()?;
        let new_filename = match image {
            Some(image) => Some(self.images.save(image).await?),
            None => None,
        };

        let changes = ItemChanges {
            title,
            description,
            image: new_filename.clone(),
            found_location,
            found_date,
        };

        let updated = match self.store.update_item(id, changes).await {
            Ok(Some(model)) => model,
            outcome => {
                if let Some(name) = &new_filename {
                    self.images.discard(name).await;
                }
                return match outcome {
                    Err(e) => Err(e.into()),
                    Ok(_) => Err(ItemError::NotFound(id)),
                };
            }
        };

        if new_filename.is_some() {
            self.images.discard(&existing.image).await;
        }

        info!(item_id = id, "Item updated");
        self.to_dto(updated).await
    }

    async fn delete(&self, id: i32) -> Result<(), ItemError> {
        let removed = self
            .store
            .delete_item(id)
            .await?
            .ok_or(ItemError::NotFound(id))?;

        self.images.discard(&removed.image).await;
        info!(item_id = id, image = %removed.image, "Item image removed");
        Ok(())
    }

    async fn set_status(&self, id: i32, status: &str) -> Result<ItemDto, ItemError> {
        let status = match status {
            "available" => ItemStatus::Available,
            "claimed" => ItemStatus::Claimed,
            _ => return Err(ItemError::InvalidStatus),
        };

        let existing = self
            .store
            .get_item(id)
            .await?
            .ok_or(ItemError::NotFound(id))?;

        if existing.status == ItemStatus::Collected {
            return Err(ItemError::AlreadyCollected);
        }

        let model = self
            .store
            .set_item_status(id, status)
            .await?
            .ok_or(ItemError::NotFound(id))?;

        info!(item_id = id, ?status, "Item status changed");
        self.to_dto(model).await
    }

    async fn mark_collected(
        &self,
        id: i32,
        collected_by: Option<i32>,
    ) -> Result<ItemDto, ItemError> {
        let existing = self
            .store
            .get_item(id)
            .await?
            .ok_or(ItemError::NotFound(id))?;

        if existing.status == ItemStatus::Collected {
            return Err(ItemError::AlreadyCollected);
        }

        if let Some(user_id) = collected_by
            && self.store.get_user(user_id).await?.is_none()
        {
            return Err(ItemError::UnknownCollector(user_id));
        }

        let model = self
            .store
            .mark_item_collected(id, collected_by)
            .await?
            .ok_or(ItemError::AlreadyCollected)?;

        if let Some(user_id) = collected_by {
            self.notifications
                .notify(notice(
                    user_id,
                    NotificationKind::Info,
                    "Item Collected",
                    format!(
                        "You have successfully collected \"{}\". Thank you!",
                        model.title
                    ),
                ))
                .await;
        }

        info!(item_id = id, ?collected_by, "Item collected and archived");
        self.to_dto(model).await
    }
}
