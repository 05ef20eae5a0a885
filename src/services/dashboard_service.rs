//! Read-only dashboard aggregates for administrators and members.
//!
//! Counts come straight from the store; recent-activity lists are populated
//! with batch lookups rather than one query per row.

use serde::Serialize;
use thiserror::Error;

use crate::db::{ClaimCounts, ItemCounts};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for DashboardError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for DashboardError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ItemTotals {
    pub total: u64,
    pub available: u64,
    pub claimed: u64,
    pub collected: u64,
}

impl From<ItemCounts> for ItemTotals {
    fn from(c: ItemCounts) -> Self {
        Self {
            total: c.total,
            available: c.available,
            claimed: c.claimed,
            collected: c.collected,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ClaimTotals {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub collected: u64,
}

impl From<ClaimCounts> for ClaimTotals {
    fn from(c: ClaimCounts) -> Self {
        Self {
            total: c.total,
            pending: c.pending,
            approved: c.approved,
            rejected: c.rejected,
            collected: c.collected,
        }
    }
}

/// Compact item row for activity feeds.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub id: i32,
    pub title: String,
    pub image_url: String,
    pub status: crate::entities::items::ItemStatus,
    pub found_location: String,
    pub found_date: String,
    pub created_at: String,
    pub posted_by_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSummary {
    pub id: i32,
    pub status: crate::entities::claims::ClaimStatus,
    pub created_at: String,
    pub item_title: Option<String>,
    pub item_image_url: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentActivity {
    pub items: Vec<ItemSummary>,
    pub claims: Vec<ClaimSummary>,
}

/// Admin dashboard payload.
///
/// # Examples
///
/// ```
/// use lostfound::services::dashboard_service::{ItemTotals, ClaimTotals};
///
/// let items = ItemTotals { total: 4, available: 2, claimed: 1, collected: 1 };
/// let claims = ClaimTotals { total: 3, pending: 1, approved: 1, rejected: 1, collected: 0 };
///
/// assert_eq!(items.available + items.claimed + items.collected, items.total);
/// assert_eq!(claims.total, 3);
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub items: ItemTotals,
    pub claims: ClaimTotals,
    pub recent_activity: RecentActivity,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MemberTotals {
    pub items_reported: u64,
    pub claims_made: u64,
    pub claims_approved: u64,
}

/// Member dashboard payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStats {
    pub stats: MemberTotals,
    pub my_recent_reports: Vec<ItemSummary>,
    pub recently_found: Vec<ItemSummary>,
}

#[async_trait::async_trait]
pub trait DashboardService: Send + Sync {
    async fn admin_stats(&self) -> Result<AdminStats, DashboardError>;

    async fn member_stats(&self, user_id: i32) -> Result<MemberStats, DashboardError>;
}
