//! `SeaORM` implementation of the `ClaimService` trait.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::db::{Approval, ClaimInsert, Store};
use crate::domain::claim::ClaimDecision;
use crate::entities::claims;
use crate::entities::items::{self, ItemStatus};
use crate::entities::notifications::NotificationKind;
use crate::services::claim_service::{
    ClaimDto, ClaimError, ClaimService, ClaimantInfo, ClaimedItemInfo,
};
use crate::services::notification_service::{NotificationService, notice};
use async_trait::async_trait;
use tracing::info;

pub struct SeaOrmClaimService {
    store: Store,
    notifications: Arc<dyn NotificationService>,
}

impl SeaOrmClaimService {
    #[must_use]
    pub fn new(store: Store, notifications: Arc<dyn NotificationService>) -> Self {
        Self {
            store,
            notifications,
        }
    }

    async fn to_dtos(
        &self,
        models: Vec<claims::Model>,
        with_user: bool,
    ) -> Result<Vec<ClaimDto>, ClaimError> {
        let item_ids: Vec<i32> = distinct(models.iter().map(|c| c.item_id));
        let items: HashMap<i32, ClaimedItemInfo> = self
            .store
            .get_items_by_ids(&item_ids)
            .await?
            .iter()
            .map(|i| (i.id, ClaimedItemInfo::from(i)))
            .collect();

        let users: HashMap<i32, ClaimantInfo> = if with_user {
            let user_ids: Vec<i32> = distinct(models.iter().map(|c| c.user_id));
            self.store
                .get_users_by_ids(&user_ids)
                .await?
                .iter()
                .map(|u| (u.id, ClaimantInfo::from(u)))
                .collect()
        } else {
            HashMap::new()
        };

        Ok(models
            .into_iter()
            .map(|c| {
                let item = items.get(&c.item_id).cloned();
                let user = users.get(&c.user_id).cloned();
                ClaimDto::new(c, item, user)
            })
            .collect())
    }

    async fn to_dto(&self, model: claims::Model) -> Result<ClaimDto, ClaimError> {
        self.to_dtos(vec![model], true)
            .await?
            .pop()
            .ok_or_else(|| ClaimError::Internal("Claim vanished while loading".to_string()))
    }

    /// Status of a claim that lost a compare-and-set race.
    async fn current_status(&self, claim_id: i32) -> Result<ClaimError, ClaimError> {
        Ok(match self.store.get_claim(claim_id).await? {
            Some(claim) => ClaimError::AlreadyDecided(claim.status),
            None => ClaimError::NotFound(claim_id),
        })
    }

    async fn notify_approved(&self, claim: &claims::Model, item: &items::Model, rejected: &[i32]) {
        self.notifications
            .notify(notice(
                claim.user_id,
                NotificationKind::Success,
                "Claim Approved",
                format!(
                    "Your claim for \"{}\" has been approved. Please collect it from the front desk.",
                    item.title
                ),
            ))
            .await;

        for &user_id in rejected {
            self.notifications
                .notify(notice(
                    user_id,
                    NotificationKind::Warning,
                    "Claim Rejected",
                    format!(
                        "Your claim for \"{}\" was rejected because the item was claimed by another member.",
                        item.title
                    ),
                ))
                .await;
        }
    }

    async fn item_title(&self, item_id: i32) -> String {
        match self.store.get_item(item_id).await {
            Ok(Some(item)) => item.title,
            _ => "your item".to_string(),
        }
    }
}

fn distinct(ids: impl Iterator<Item = i32>) -> Vec<i32> {
    ids.collect::<HashSet<_>>().into_iter().collect()
}

fn clean_comment(comment: Option<String>) -> Option<String> {
    comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

#[async_trait]
impl ClaimService for SeaOrmClaimService {
    async fn submit(&self, user_id: i32, item_id: i32) -> Result<ClaimDto, ClaimError> {
        let item = self
            .store
            .get_item(item_id)
            .await?
            .ok_or(ClaimError::ItemNotFound(item_id))?;

        if item.status != ItemStatus::Available || item.is_archived {
            return Err(ClaimError::ItemUnavailable);
        }

        if self.store.claim_exists(item_id, user_id).await? {
            return Err(ClaimError::Duplicate);
        }

        match self.store.create_claim(item_id, user_id).await? {
            ClaimInsert::Created(claim) => self.to_dto(claim).await,
            ClaimInsert::Duplicate => Err(ClaimError::Duplicate),
        }
    }

    async fn list_all(&self) -> Result<Vec<ClaimDto>, ClaimError> {
        let claims = self.store.list_claims().await?;
        self.to_dtos(claims, true).await
    }

    async fn list_for_user(&self, user_id: i32) -> Result<Vec<ClaimDto>, ClaimError> {
        let claims = self.store.list_claims_for_user(user_id).await?;
        self.to_dtos(claims, false).await
    }

    async fn review(
        &self,
        claim_id: i32,
        status: &str,
        admin_comment: Option<String>,
    ) -> Result<ClaimDto, ClaimError> {
        let decision: ClaimDecision = status.parse().map_err(|()| ClaimError::InvalidStatus)?;

        let claim = self
            .store
            .get_claim(claim_id)
            .await?
            .ok_or(ClaimError::NotFound(claim_id))?;

        if !decision.allowed_from(claim.status) {
            return Err(ClaimError::AlreadyDecided(claim.status));
        }

        let comment = clean_comment(admin_comment);

        let updated = match decision {
            ClaimDecision::Approve => match self.store.approve_claim(claim_id, comment).await? {
                Approval::Approved {
                    claim,
                    item,
                    rejected_user_ids,
                } => {
                    self.notify_approved(&claim, &item, &rejected_user_ids).await;
                    claim
                }
                Approval::ClaimNotPending => return Err(self.current_status(claim_id).await?),
                Approval::ItemUnavailable => return Err(ClaimError::CannotApprove),
            },
            ClaimDecision::Reject => {
                let Some(updated) = self
                    .store
                    .transition_claim(
                        claim_id,
                        decision.required_current(),
                        decision.target(),
                        comment.clone(),
                        true,
                    )
                    .await?
                else {
                    return Err(self.current_status(claim_id).await?);
                };

                let title = self.item_title(updated.item_id).await;
                let message = match &comment {
                    Some(reason) => {
                        format!("Your claim for \"{title}\" has been rejected. Reason: {reason}")
                    }
                    None => format!("Your claim for \"{title}\" has been rejected."),
                };
                self.notifications
                    .notify(notice(
                        updated.user_id,
                        NotificationKind::Warning,
                        "Claim Rejected",
                        message,
                    ))
                    .await;
                updated
            }
            ClaimDecision::Collect => {
                let Some(updated) = self
                    .store
                    .transition_claim(
                        claim_id,
                        decision.required_current(),
                        decision.target(),
                        comment,
                        false,
                    )
                    .await?
                else {
                    return Err(self.current_status(claim_id).await?);
                };

                let title = self.item_title(updated.item_id).await;
                self.notifications
                    .notify(notice(
                        updated.user_id,
                        NotificationKind::Info,
                        "Claim Completed",
                        format!("Your claim for \"{title}\" is marked as collected."),
                    ))
                    .await;
                updated
            }
        };

        info!(claim_id, status, "Claim reviewed");
        self.to_dto(updated).await
    }
}
