use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use tracing::info;

use crate::db::now_timestamp;
use crate::domain::SortOrder;
use crate::domain::item::{ItemFilter, SortField, StatusFilter};
use crate::entities::items::{self, ItemStatus};
use crate::entities::{claims, prelude::*};

#[derive(Debug, Clone)]
pub struct NewItem {
    pub title: String,
    pub description: String,
    pub image: String,
    pub found_location: String,
    pub found_date: String,
    pub posted_by: i32,
}

/// Partial edit; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ItemChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub found_location: Option<String>,
    pub found_date: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemCounts {
    pub total: u64,
    pub available: u64,
    pub claimed: u64,
    pub collected: u64,
}

/// Repository for found-item records
pub struct ItemRepository {
    conn: DatabaseConnection,
}

impl ItemRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, item: NewItem) -> Result<items::Model> {
        let now = now_timestamp();
        let active_model = items::ActiveModel {
            title: Set(item.title),
            description: Set(item.description),
            image: Set(item.image),
            found_location: Set(item.found_location),
            found_date: Set(item.found_date),
            posted_by: Set(item.posted_by),
            status: Set(ItemStatus::Available),
            is_archived: Set(false),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.conn)
            .await
            .context("Failed to insert item")?;

        info!(item_id = model.id, "Item reported: {}", model.title);
        Ok(model)
    }

    pub async fn get(&self, id: i32) -> Result<Option<items::Model>> {
        Items::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query item")
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<items::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Items::find()
            .filter(items::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("Failed to query items by IDs")
    }

    /// Board listing: every filter and the ordering are pushed into SQL.
    pub async fn list(&self, filter: &ItemFilter) -> Result<Vec<items::Model>> {
        let mut query = Self::apply_status(Items::find(), filter.status);

        if let Some(search) = &filter.search {
            // LIKE is case-insensitive for ASCII in SQLite
            let pattern = contains_pattern(search);
            let matches =
                |column: items::Column| column.like(LikeExpr::new(pattern.clone()).escape('\\'));
            query = query.filter(
                Condition::any()
                    .add(matches(items::Column::Title))
                    .add(matches(items::Column::Description))
                    .add(matches(items::Column::FoundLocation)),
            );
        }

        if let Some(location) = &filter.location {
            query = query.filter(items::Column::FoundLocation.eq(location.as_str()));
        }

        if let Some(date) = &filter.found_on {
            query = query.filter(items::Column::FoundDate.eq(date.as_str()));
        }

        if let Some(from) = &filter.found_from {
            query = query.filter(items::Column::FoundDate.gte(from.as_str()));
        }

        if let Some(to) = &filter.found_to {
            query = query.filter(items::Column::FoundDate.lte(to.as_str()));
        }

        let (field, order) = filter.sort.key();
        query = match (field, order) {
            (SortField::FoundDate, SortOrder::Descending) => query
                .order_by_desc(items::Column::FoundDate)
                .order_by_desc(items::Column::CreatedAt)
                .order_by_desc(items::Column::Id),
            (SortField::FoundDate, SortOrder::Ascending) => query
                .order_by_asc(items::Column::FoundDate)
                .order_by_asc(items::Column::CreatedAt)
                .order_by_asc(items::Column::Id),
            (SortField::Title, SortOrder::Ascending) => query
                .order_by_asc(items::Column::Title)
                .order_by_asc(items::Column::Id),
            (SortField::Title, SortOrder::Descending) => query
                .order_by_desc(items::Column::Title)
                .order_by_desc(items::Column::Id),
        };

        query.all(&self.conn).await.context("Failed to list items")
    }

    fn apply_status(query: Select<Items>, status: StatusFilter) -> Select<Items> {
        match status {
            StatusFilter::Open => query
                .filter(items::Column::Status.eq(ItemStatus::Available))
                .filter(items::Column::IsArchived.eq(false)),
            StatusFilter::Collected => query.filter(items::Column::Status.eq(ItemStatus::Collected)),
            StatusFilter::Only(status) => query.filter(items::Column::Status.eq(status)),
            StatusFilter::All => query.filter(items::Column::IsArchived.eq(false)),
        }
    }

    pub async fn list_by_poster(&self, user_id: i32) -> Result<Vec<items::Model>> {
        Items::find()
            .filter(items::Column::PostedBy.eq(user_id))
            .order_by_desc(items::Column::CreatedAt)
            .order_by_desc(items::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list items for user")
    }

    pub async fn recent(&self, limit: u64) -> Result<Vec<items::Model>> {
        Items::find()
            .order_by_desc(items::Column::CreatedAt)
            .order_by_desc(items::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to query recent items")
    }

    pub async fn recent_by_poster(&self, user_id: i32, limit: u64) -> Result<Vec<items::Model>> {
        Items::find()
            .filter(items::Column::PostedBy.eq(user_id))
            .order_by_desc(items::Column::CreatedAt)
            .order_by_desc(items::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to query recent reports")
    }

    /// Newest open items reported by someone other than `user_id`.
    pub async fn recent_available_from_others(
        &self,
        user_id: i32,
        limit: u64,
    ) -> Result<Vec<items::Model>> {
        Items::find()
            .filter(items::Column::Status.eq(ItemStatus::Available))
            .filter(items::Column::IsArchived.eq(false))
            .filter(items::Column::PostedBy.ne(user_id))
            .order_by_desc(items::Column::CreatedAt)
            .order_by_desc(items::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to query recently found items")
    }

    pub async fn update(&self, id: i32, changes: ItemChanges) -> Result<Option<items::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: items::ActiveModel = existing.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(image) = changes.image {
            active.image = Set(image);
        }
        if let Some(location) = changes.found_location {
            active.found_location = Set(location);
        }
        if let Some(date) = changes.found_date {
            active.found_date = Set(date);
        }
        active.updated_at = Set(now_timestamp());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update item")?;
        Ok(Some(model))
    }

    pub async fn set_status(&self, id: i32, status: ItemStatus) -> Result<Option<items::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: items::ActiveModel = existing.into();
        active.status = Set(status);
        active.updated_at = Set(now_timestamp());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update item status")?;
        Ok(Some(model))
    }

    /// Archives the item as picked up. Returns `None` when the item does not
    /// exist or was already collected.
    pub async fn mark_collected(
        &self,
        id: i32,
        collected_by: Option<i32>,
    ) -> Result<Option<items::Model>> {
        let now = now_timestamp();

        let result = Items::update_many()
            .col_expr(
                items::Column::Status,
                Expr::value(ItemStatus::Collected.to_value()),
            )
            .col_expr(items::Column::IsArchived, Expr::value(true))
            .col_expr(items::Column::CollectedDate, Expr::value(now.clone()))
            .col_expr(items::Column::CollectedBy, Expr::value(collected_by))
            .col_expr(items::Column::UpdatedAt, Expr::value(now))
            .filter(items::Column::Id.eq(id))
            .filter(items::Column::Status.ne(ItemStatus::Collected))
            .exec(&self.conn)
            .await
            .context("Failed to mark item collected")?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.get(id).await
    }

    /// Deletes the item and its claims. Returns the removed row.
    pub async fn delete(&self, id: i32) -> Result<Option<items::Model>> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to begin item delete")?;

        let Some(item) = Items::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };

        Claims::delete_many()
            .filter(claims::Column::ItemId.eq(id))
            .exec(&txn)
            .await
            .context("Failed to delete claims for item")?;

        Items::delete_by_id(id)
            .exec(&txn)
            .await
            .context("Failed to delete item")?;

        txn.commit().await.context("Failed to commit item delete")?;

        info!(item_id = id, "Item deleted: {}", item.title);
        Ok(Some(item))
    }

    pub async fn counts(&self) -> Result<ItemCounts> {
        let total = Items::find().count(&self.conn).await?;
        let available = self.count_with_status(ItemStatus::Available).await?;
        let claimed = self.count_with_status(ItemStatus::Claimed).await?;
        let collected = self.count_with_status(ItemStatus::Collected).await?;

        Ok(ItemCounts {
            total,
            available,
            claimed,
            collected,
        })
    }

    async fn count_with_status(&self, status: ItemStatus) -> Result<u64> {
        Items::find()
            .filter(items::Column::Status.eq(status))
            .count(&self.conn)
            .await
            .context("Failed to count items")
    }

    pub async fn count_by_poster(&self, user_id: i32) -> Result<u64> {
        Items::find()
            .filter(items::Column::PostedBy.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count reports")
    }
}

/// `%term%` with the LIKE wildcards inside `term` escaped by `\`.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn search_wildcards_are_literal() {
        assert_eq!(contains_pattern("towel"), "%towel%");
        assert_eq!(contains_pattern("50%"), r"%50\%%");
        assert_eq!(contains_pattern("jump_rope"), r"%jump\_rope%");
        assert_eq!(contains_pattern(r"C:\gym"), r"%C:\\gym%");
    }
}
