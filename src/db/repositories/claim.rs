use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::{debug, info};

use crate::constants::AUTO_REJECT_COMMENT;
use crate::db::now_timestamp;
use crate::entities::claims::{self, ClaimStatus};
use crate::entities::items::{self, ItemStatus};
use crate::entities::prelude::*;

#[derive(Debug)]
pub enum ClaimInsert {
    Created(claims::Model),
    /// The `(item_id, user_id)` unique index rejected the row.
    Duplicate,
}

/// Result of the transactional approval.
#[derive(Debug)]
pub enum Approval {
    Approved {
        claim: claims::Model,
        item: items::Model,
        /// Claimants whose pending claims were rejected in the same transaction.
        rejected_user_ids: Vec<i32>,
    },
    /// The claim left `pending` before the transaction started.
    ClaimNotPending,
    ItemUnavailable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimCounts {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub collected: u64,
}

pub struct ClaimRepository {
    conn: DatabaseConnection,
}

impl ClaimRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, item_id: i32, user_id: i32) -> Result<ClaimInsert> {
        let now = now_timestamp();
        let active_model = claims::ActiveModel {
            item_id: Set(item_id),
            user_id: Set(user_id),
            claim_date: Set(now.clone()),
            status: Set(ClaimStatus::Pending),
            admin_comment: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        match active_model.insert(&self.conn).await {
            Ok(model) => {
                info!(claim_id = model.id, item_id, user_id, "Claim submitted");
                Ok(ClaimInsert::Created(model))
            }
            Err(e) if is_unique_violation(&e) => Ok(ClaimInsert::Duplicate),
            Err(e) => Err(e).context("Failed to insert claim"),
        }
    }

    pub async fn get(&self, id: i32) -> Result<Option<claims::Model>> {
        Claims::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query claim")
    }

    pub async fn exists_for(&self, item_id: i32, user_id: i32) -> Result<bool> {
        let count = Claims::find()
            .filter(claims::Column::ItemId.eq(item_id))
            .filter(claims::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to check existing claim")?;

        Ok(count > 0)
    }

    pub async fn list_all(&self) -> Result<Vec<claims::Model>> {
        Claims::find()
            .order_by_desc(claims::Column::CreatedAt)
            .order_by_desc(claims::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list claims")
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<claims::Model>> {
        Claims::find()
            .filter(claims::Column::UserId.eq(user_id))
            .order_by_desc(claims::Column::CreatedAt)
            .order_by_desc(claims::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list claims for user")
    }

    pub async fn recent(&self, limit: u64) -> Result<Vec<claims::Model>> {
        Claims::find()
            .order_by_desc(claims::Column::CreatedAt)
            .order_by_desc(claims::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to query recent claims")
    }

    /// Approves a pending claim, claims its item and rejects every other
    /// pending claim on the same item, all in one transaction.
    ///
    /// Both status changes are compare-and-set updates, so two admins
    /// approving competing claims cannot both succeed: the second sees zero
    /// affected rows and the whole transaction is rolled back.
    pub async fn approve(&self, claim_id: i32, comment: Option<String>) -> Result<Approval> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to begin approval")?;
        let now = now_timestamp();

        // Write first so SQLite takes the write lock up front
        let claim_update = Claims::update_many()
            .col_expr(
                claims::Column::Status,
                Expr::value(ClaimStatus::Approved.to_value()),
            )
            .col_expr(claims::Column::AdminComment, Expr::value(comment))
            .col_expr(claims::Column::UpdatedAt, Expr::value(now.clone()))
            .filter(claims::Column::Id.eq(claim_id))
            .filter(claims::Column::Status.eq(ClaimStatus::Pending))
            .exec(&txn)
            .await
            .context("Failed to approve claim")?;

        if claim_update.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(Approval::ClaimNotPending);
        }

        let claim = Claims::find_by_id(claim_id)
            .one(&txn)
            .await?
            .context("Approved claim vanished inside transaction")?;

        let item_update = Items::update_many()
            .col_expr(
                items::Column::Status,
                Expr::value(ItemStatus::Claimed.to_value()),
            )
            .col_expr(items::Column::UpdatedAt, Expr::value(now.clone()))
            .filter(items::Column::Id.eq(claim.item_id))
            .filter(items::Column::Status.eq(ItemStatus::Available))
            .filter(items::Column::IsArchived.eq(false))
            .exec(&txn)
            .await
            .context("Failed to claim item")?;

        if item_update.rows_affected == 0 {
            txn.rollback().await?;
            debug!(claim_id, "Approval rolled back, item no longer available");
            return Ok(Approval::ItemUnavailable);
        }

        let siblings = Claims::find()
            .filter(claims::Column::ItemId.eq(claim.item_id))
            .filter(claims::Column::Id.ne(claim_id))
            .filter(claims::Column::Status.eq(ClaimStatus::Pending))
            .all(&txn)
            .await
            .context("Failed to query competing claims")?;

        if !siblings.is_empty() {
            Claims::update_many()
                .col_expr(
                    claims::Column::Status,
                    Expr::value(ClaimStatus::Rejected.to_value()),
                )
                .col_expr(
                    claims::Column::AdminComment,
                    Expr::value(AUTO_REJECT_COMMENT),
                )
                .col_expr(claims::Column::UpdatedAt, Expr::value(now))
                .filter(claims::Column::Id.is_in(siblings.iter().map(|c| c.id)))
                .exec(&txn)
                .await
                .context("Failed to reject competing claims")?;
        }

        let item = Items::find_by_id(claim.item_id)
            .one(&txn)
            .await?
            .context("Claimed item vanished inside transaction")?;

        txn.commit().await.context("Failed to commit approval")?;

        info!(
            claim_id,
            item_id = item.id,
            rejected = siblings.len(),
            "Claim approved"
        );

        Ok(Approval::Approved {
            claim,
            item,
            rejected_user_ids: siblings.into_iter().map(|c| c.user_id).collect(),
        })
    }

    /// Moves a claim from `from` to `to`. `comment` replaces the stored one
    /// only when `overwrite_comment` is set or a comment is given.
    /// Returns `None` when the claim was no longer in `from`.
    pub async fn transition(
        &self,
        claim_id: i32,
        from: ClaimStatus,
        to: ClaimStatus,
        comment: Option<String>,
        overwrite_comment: bool,
    ) -> Result<Option<claims::Model>> {
        let mut update = Claims::update_many()
            .col_expr(claims::Column::Status, Expr::value(to.to_value()))
            .col_expr(claims::Column::UpdatedAt, Expr::value(now_timestamp()));

        if overwrite_comment || comment.is_some() {
            update = update.col_expr(claims::Column::AdminComment, Expr::value(comment));
        }

        let result = update
            .filter(claims::Column::Id.eq(claim_id))
            .filter(claims::Column::Status.eq(from))
            .exec(&self.conn)
            .await
            .context("Failed to update claim status")?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.get(claim_id).await
    }

    pub async fn counts(&self) -> Result<ClaimCounts> {
        Ok(ClaimCounts {
            total: Claims::find().count(&self.conn).await?,
            pending: self.count_with_status(ClaimStatus::Pending).await?,
            approved: self.count_with_status(ClaimStatus::Approved).await?,
            rejected: self.count_with_status(ClaimStatus::Rejected).await?,
            collected: self.count_with_status(ClaimStatus::Collected).await?,
        })
    }

    async fn count_with_status(&self, status: ClaimStatus) -> Result<u64> {
        Claims::find()
            .filter(claims::Column::Status.eq(status))
            .count(&self.conn)
            .await
            .context("Failed to count claims")
    }

    pub async fn count_for_user(&self, user_id: i32, status: Option<ClaimStatus>) -> Result<u64> {
        let mut query = Claims::find().filter(claims::Column::UserId.eq(user_id));
        if let Some(status) = status {
            query = query.filter(claims::Column::Status.eq(status));
        }

        query
            .count(&self.conn)
            .await
            .context("Failed to count claims for user")
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
